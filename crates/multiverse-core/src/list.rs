// ── List state machine ───────────────────────────────────────────
//
// Pure state machine backing the paginated catalog view. It owns the
// visible item list and reconciles three competing triggers: initial
// load, infinite scroll, and search-by-id. All transitions are
// synchronous functions `(state, event) -> Option<FetchIntent>`; the
// async side (the controller) executes intents and feeds outcomes back
// through [`ListState::complete`].
//
// Staleness is handled with an epoch counter: every issued fetch bumps
// the epoch and carries it in its intent, and a completing fetch only
// mutates state if its epoch is still current. A slow page response
// arriving after the user has switched to search is discarded without
// touching state.

use crate::error::CoreError;
use crate::model::Character;

// ── Query mode ───────────────────────────────────────────────────

/// The controller's current intent. Exactly one mode is active at a
/// time; switching discards pagination progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    Paginated,
    Search(String),
}

// ── Fetch plumbing ───────────────────────────────────────────────

/// A network read the state machine wants executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    /// Read one collection page. `replace` distinguishes an initial
    /// load or mode switch (overwrite items) from infinite scroll
    /// (append to items).
    Page { number: u32, replace: bool },
    /// Read a single entity by raw id text.
    Entity { id_text: String },
}

/// Token tying an in-flight fetch to the state that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchIntent {
    pub epoch: u64,
    pub request: FetchRequest,
}

/// Result of executing a [`FetchRequest`].
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Page {
        items: Vec<Character>,
        has_next: bool,
    },
    Entity(Character),
    Failed(CoreError),
}

// ── Events ───────────────────────────────────────────────────────

/// Input events forwarded from the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// Reset to the initial state and fetch page 1.
    Initialize,
    /// The search text changed. Empty text returns to paginated mode.
    SearchTextChanged(String),
    /// The view scrolled to the end of the list.
    EndReached,
    /// Re-issue the most recent fetch after a failure.
    Retry,
}

// ── State ────────────────────────────────────────────────────────

/// Catalog list state. See the module docs for the transition rules.
#[derive(Debug, Clone)]
pub struct ListState {
    items: Vec<Character>,
    mode: QueryMode,
    current_page: u32,
    has_more: bool,
    is_loading: bool,
    last_error: Option<CoreError>,
    /// Monotonic counter tagging the authoritative in-flight fetch.
    /// Never rewound, not even by [`ListEvent::Initialize`].
    epoch: u64,
    last_request: Option<FetchRequest>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            mode: QueryMode::Paginated,
            current_page: 1,
            has_more: true,
            is_loading: false,
            last_error: None,
            epoch: 0,
            last_request: None,
        }
    }
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn items(&self) -> &[Character] {
        &self.items
    }

    pub fn mode(&self) -> &QueryMode {
        &self.mode
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&CoreError> {
        self.last_error.as_ref()
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Apply a view event. Returns the fetch to issue, if any.
    pub fn handle(&mut self, event: ListEvent) -> Option<FetchIntent> {
        match event {
            ListEvent::Initialize => {
                self.reset_visible(QueryMode::Paginated);
                Some(self.issue(FetchRequest::Page {
                    number: 1,
                    replace: true,
                }))
            }

            ListEvent::SearchTextChanged(text) => {
                let text = text.trim().to_owned();
                if text.is_empty() {
                    self.reset_visible(QueryMode::Paginated);
                    Some(self.issue(FetchRequest::Page {
                        number: 1,
                        replace: true,
                    }))
                } else {
                    self.reset_visible(QueryMode::Search(text.clone()));
                    Some(self.issue(FetchRequest::Entity { id_text: text }))
                }
            }

            ListEvent::EndReached => {
                if self.is_loading || !self.has_more || matches!(self.mode, QueryMode::Search(_)) {
                    return None;
                }
                Some(self.issue(FetchRequest::Page {
                    number: self.current_page + 1,
                    replace: false,
                }))
            }

            ListEvent::Retry => {
                if self.is_loading {
                    return None;
                }
                let request = self.last_request.clone()?;
                Some(self.issue(request))
            }
        }
    }

    /// Apply a completed fetch. Returns `false` (leaving state
    /// untouched) when the intent's epoch has been superseded.
    pub fn complete(&mut self, intent: &FetchIntent, outcome: FetchOutcome) -> bool {
        if intent.epoch != self.epoch {
            return false;
        }
        self.is_loading = false;

        match (&intent.request, outcome) {
            (FetchRequest::Page { number, replace }, FetchOutcome::Page { items, has_next }) => {
                if *replace {
                    self.items.clear();
                }
                for item in items {
                    self.push_unique(item);
                }
                self.current_page = *number;
                self.has_more = has_next;
            }

            (FetchRequest::Entity { .. }, FetchOutcome::Entity(entity)) => {
                self.items = vec![entity];
                self.has_more = false;
            }

            (request, FetchOutcome::Failed(error)) => {
                if matches!(request, FetchRequest::Page { replace: true, .. }) {
                    self.items.clear();
                }
                self.last_error = Some(error);
            }

            // Request/outcome shape mismatch. The backend answered
            // with something other than what was asked for.
            (_, _) => {
                self.last_error = Some(CoreError::MalformedResponse(
                    "response shape does not match request".into(),
                ));
            }
        }

        true
    }

    // ── Internals ────────────────────────────────────────────────

    /// Reset the visible fields for a mode switch. The epoch is left
    /// alone so in-flight results from before the reset stay stale.
    fn reset_visible(&mut self, mode: QueryMode) {
        self.items.clear();
        self.mode = mode;
        self.current_page = 1;
        self.has_more = true;
        self.last_error = None;
    }

    /// Record a fetch as the authoritative in-flight request.
    fn issue(&mut self, request: FetchRequest) -> FetchIntent {
        self.epoch += 1;
        self.is_loading = true;
        self.last_error = None;
        self.last_request = Some(request.clone());
        FetchIntent {
            epoch: self.epoch,
            request,
        }
    }

    fn push_unique(&mut self, item: Character) {
        if !self.items.iter().any(|existing| existing.id == item.id) {
            self.items.push(item);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::CharacterStatus;
    use pretty_assertions::assert_eq;

    fn character(id: u64) -> Character {
        Character {
            id,
            name: format!("Character {id}"),
            status: CharacterStatus::Alive,
            species: "Human".into(),
            kind: String::new(),
            gender: "Male".into(),
            origin: "Earth".into(),
            location: "Earth".into(),
            image: format!("https://example.test/{id}.jpeg"),
            episode_count: 0,
        }
    }

    fn page(ids: &[u64], has_next: bool) -> FetchOutcome {
        FetchOutcome::Page {
            items: ids.iter().copied().map(character).collect(),
            has_next,
        }
    }

    fn loaded_two_pages() -> ListState {
        let mut state = ListState::new();
        let intent = state.handle(ListEvent::Initialize).unwrap();
        assert!(state.complete(&intent, page(&[1, 2], true)));
        let intent = state.handle(ListEvent::EndReached).unwrap();
        assert!(state.complete(&intent, page(&[3, 4], true)));
        state
    }

    #[test]
    fn initialize_fetches_first_page_in_replace_mode() {
        let mut state = ListState::new();
        let intent = state.handle(ListEvent::Initialize).unwrap();

        assert_eq!(
            intent.request,
            FetchRequest::Page {
                number: 1,
                replace: true
            }
        );
        assert!(state.is_loading());
        assert!(state.items().is_empty());
    }

    #[test]
    fn appended_pages_advance_current_page() {
        let state = loaded_two_pages();

        assert_eq!(state.current_page(), 2);
        assert_eq!(
            state.items().iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert!(state.has_more());
        assert!(!state.is_loading());
    }

    #[test]
    fn append_drops_items_already_present() {
        let mut state = loaded_two_pages();

        // Backend repeats item 4 on page 3.
        let intent = state.handle(ListEvent::EndReached).unwrap();
        assert!(state.complete(&intent, page(&[4, 5], true)));

        assert_eq!(
            state.items().iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn end_reached_is_gated_while_loading() {
        let mut state = ListState::new();
        let intent = state.handle(ListEvent::Initialize).unwrap();
        state.complete(&intent, page(&[1], true));

        let first = state.handle(ListEvent::EndReached);
        assert!(first.is_some());

        // Second scroll event while the page-2 fetch is in flight.
        let second = state.handle(ListEvent::EndReached);
        assert!(second.is_none());
    }

    #[test]
    fn end_reached_stops_at_the_last_page() {
        let mut state = ListState::new();
        let intent = state.handle(ListEvent::Initialize).unwrap();
        state.complete(&intent, page(&[1], true));

        for ids in [&[2u64][..], &[3], &[4]] {
            let has_next = ids[0] != 4;
            let intent = state.handle(ListEvent::EndReached).unwrap();
            assert!(state.complete(&intent, page(ids, has_next)));
        }

        assert!(!state.has_more());
        assert!(state.handle(ListEvent::EndReached).is_none());
    }

    #[test]
    fn end_reached_is_a_no_op_in_search_mode() {
        let mut state = ListState::new();
        let intent = state.handle(ListEvent::SearchTextChanged("1".into())).unwrap();
        state.complete(&intent, FetchOutcome::Entity(character(1)));

        assert!(state.handle(ListEvent::EndReached).is_none());
    }

    #[test]
    fn search_yields_single_item_regardless_of_prior_state() {
        let mut state = loaded_two_pages();

        let intent = state.handle(ListEvent::SearchTextChanged("7".into())).unwrap();
        assert_eq!(
            intent.request,
            FetchRequest::Entity {
                id_text: "7".into()
            }
        );
        assert!(state.items().is_empty());

        assert!(state.complete(&intent, FetchOutcome::Entity(character(7))));
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].id, 7);
        assert!(!state.has_more());
    }

    #[test]
    fn clearing_search_text_returns_to_paginated_page_one() {
        let mut state = ListState::new();
        let intent = state.handle(ListEvent::SearchTextChanged("abc".into())).unwrap();
        state.complete(
            &intent,
            FetchOutcome::Failed(CoreError::NotFound),
        );

        let intent = state.handle(ListEvent::SearchTextChanged(String::new())).unwrap();
        assert_eq!(
            intent.request,
            FetchRequest::Page {
                number: 1,
                replace: true
            }
        );
        assert_eq!(state.mode(), &QueryMode::Paginated);
        assert!(state.items().is_empty());
        assert_eq!(state.current_page(), 1);
        assert!(state.last_error().is_none());
    }

    #[test]
    fn whitespace_only_search_text_counts_as_empty() {
        let mut state = ListState::new();
        let intent = state.handle(ListEvent::SearchTextChanged("   ".into())).unwrap();
        assert_eq!(state.mode(), &QueryMode::Paginated);
        assert!(matches!(intent.request, FetchRequest::Page { .. }));
    }

    #[test]
    fn stale_page_response_is_discarded_after_mode_switch() {
        let mut state = loaded_two_pages();

        // Page 3 goes out...
        let slow = state.handle(ListEvent::EndReached).unwrap();

        // ...but the user types a search before it lands.
        let search = state.handle(ListEvent::SearchTextChanged("5".into())).unwrap();
        assert!(state.complete(&search, FetchOutcome::Entity(character(5))));

        // The slow page-3 response must not mutate anything.
        let before = state.clone();
        assert!(!state.complete(&slow, page(&[5, 6], true)));
        assert_eq!(state.items(), before.items());
        assert_eq!(state.mode(), before.mode());
        assert!(!state.is_loading());
    }

    #[test]
    fn each_keystroke_supersedes_the_previous_search() {
        let mut state = ListState::new();
        let first = state.handle(ListEvent::SearchTextChanged("1".into())).unwrap();
        let second = state.handle(ListEvent::SearchTextChanged("12".into())).unwrap();

        // Out-of-order arrival: the newer request wins.
        assert!(state.complete(&second, FetchOutcome::Entity(character(12))));
        assert!(!state.complete(&first, FetchOutcome::Entity(character(1))));

        assert_eq!(state.items()[0].id, 12);
    }

    #[test]
    fn append_failure_preserves_progress() {
        let mut state = loaded_two_pages();
        assert_eq!(state.items().len(), 4);

        let intent = state.handle(ListEvent::EndReached).unwrap();
        assert!(state.complete(
            &intent,
            FetchOutcome::Failed(CoreError::NetworkFailure("timeout".into())),
        ));

        assert_eq!(state.items().len(), 4);
        assert_eq!(state.current_page(), 2);
        assert!(!state.is_loading());
        assert!(matches!(
            state.last_error(),
            Some(CoreError::NetworkFailure(_))
        ));

        // The same next page is re-requested afterwards.
        let retry = state.handle(ListEvent::EndReached).unwrap();
        assert_eq!(
            retry.request,
            FetchRequest::Page {
                number: 3,
                replace: false
            }
        );
    }

    #[test]
    fn replace_failure_empties_the_list() {
        let mut state = loaded_two_pages();

        let intent = state.handle(ListEvent::Initialize).unwrap();
        assert!(state.complete(
            &intent,
            FetchOutcome::Failed(CoreError::Service {
                status: 500,
                message: "boom".into()
            }),
        ));

        assert!(state.items().is_empty());
        assert!(state.last_error().is_some());
    }

    #[test]
    fn retry_reissues_the_last_request_without_touching_items() {
        let mut state = loaded_two_pages();
        let intent = state.handle(ListEvent::EndReached).unwrap();
        state.complete(
            &intent,
            FetchOutcome::Failed(CoreError::NetworkFailure("timeout".into())),
        );

        let retry = state.handle(ListEvent::Retry).unwrap();
        assert_eq!(retry.request, intent.request);
        assert!(retry.epoch > intent.epoch);
        assert_eq!(state.items().len(), 4);
        assert!(state.last_error().is_none());
    }

    #[test]
    fn retry_is_a_no_op_while_loading_or_before_any_fetch() {
        let mut state = ListState::new();
        assert!(state.handle(ListEvent::Retry).is_none());

        state.handle(ListEvent::Initialize).unwrap();
        assert!(state.handle(ListEvent::Retry).is_none());
    }

    #[test]
    fn initialize_does_not_rewind_the_epoch() {
        let mut state = ListState::new();
        let slow = state.handle(ListEvent::Initialize).unwrap();
        let fresh = state.handle(ListEvent::Initialize).unwrap();

        assert!(fresh.epoch > slow.epoch);
        assert!(!state.complete(&slow, page(&[1], true)));
        assert!(state.complete(&fresh, page(&[2], true)));
        assert_eq!(state.items()[0].id, 2);
    }

    #[test]
    fn mismatched_outcome_shape_is_a_malformed_response() {
        let mut state = ListState::new();
        let intent = state.handle(ListEvent::SearchTextChanged("1".into())).unwrap();

        assert!(state.complete(&intent, page(&[1, 2], true)));
        assert!(matches!(
            state.last_error(),
            Some(CoreError::MalformedResponse(_))
        ));
        assert!(state.items().is_empty());
        assert!(!state.is_loading());
    }
}
