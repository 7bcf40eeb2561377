//! Screen components.

mod detail;
mod list;

pub use detail::DetailScreen;
pub use list::ListScreen;

use crate::component::Component;
use crate::screen::ScreenId;

/// Instantiate every screen, keyed by [`ScreenId`].
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::List, Box::new(ListScreen::new())),
        (ScreenId::Detail, Box::new(DetailScreen::new())),
    ]
}
