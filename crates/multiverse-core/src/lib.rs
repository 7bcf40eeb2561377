// multiverse-core: catalog state machine and async controller.
//
// The heart of the crate is [`list::ListState`], a pure state machine
// that owns the visible catalog state and decides which fetches to
// issue. [`controller::CatalogController`] drives it with tokio,
// executing fetches against `multiverse-api` and publishing snapshots
// through a watch channel for the view layer.

pub mod controller;
pub mod error;
pub mod list;
pub mod model;

pub use controller::{CatalogController, ListSnapshot};
pub use error::CoreError;
pub use list::{FetchIntent, FetchOutcome, FetchRequest, ListEvent, ListState, QueryMode};
pub use model::{Character, CharacterStatus};
