//! All possible UI actions. Actions are the sole mechanism for state mutation.

use multiverse_core::{Character, ListSnapshot};

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Data events (from the catalog controller) ──────────────────
    ListUpdated(ListSnapshot),

    // ── List events (forwarded to the controller) ──────────────────
    /// Search text changed; empty text returns to the paginated list.
    Search(String),
    /// The selection hit the end of the loaded list.
    EndReached,
    /// Re-issue the last failed fetch.
    Retry,

    // ── Search overlay ─────────────────────────────────────────────
    OpenSearch,
    CloseSearch,

    // ── Detail view ────────────────────────────────────────────────
    OpenDetail(u64),
    CloseDetail,
    DetailLoaded(Box<Character>),
    DetailFailed(u64, String),

    // ── Help ───────────────────────────────────────────────────────
    ToggleHelp,
}
