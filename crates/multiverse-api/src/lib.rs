// multiverse-api: Async Rust client for the Rick and Morty REST API.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::CatalogClient;
pub use error::Error;
pub use transport::TransportConfig;
