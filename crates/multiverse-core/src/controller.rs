// ── Catalog controller ───────────────────────────────────────────
//
// Async driver for [`ListState`]. View events come in through cheap
// synchronous methods, fetches run on spawned tokio tasks, and every
// state change is published as a [`ListSnapshot`] through a watch
// channel. The view layer only ever sees snapshots.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use multiverse_api::CatalogClient;

use crate::error::CoreError;
use crate::list::{FetchIntent, FetchOutcome, FetchRequest, ListEvent, ListState, QueryMode};
use crate::model::Character;

// ── Snapshot ─────────────────────────────────────────────────────

/// Read-only projection of the list state for rendering.
///
/// Items are shared behind an `Arc` so publishing a snapshot does not
/// clone the whole list.
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub items: Arc<Vec<Character>>,
    pub mode: QueryMode,
    pub current_page: u32,
    pub has_more: bool,
    pub is_loading: bool,
    pub last_error: Option<CoreError>,
}

impl ListSnapshot {
    /// First load: nothing to show yet, fetch outstanding.
    pub fn is_initial_loading(&self) -> bool {
        self.is_loading && self.items.is_empty()
    }

    /// Infinite scroll: items visible, next page outstanding.
    pub fn is_loading_more(&self) -> bool {
        self.is_loading && !self.items.is_empty()
    }

    /// Settled with nothing to show and no error to report.
    pub fn is_empty_result(&self) -> bool {
        !self.is_loading && self.items.is_empty() && self.last_error.is_none()
    }
}

impl From<&ListState> for ListSnapshot {
    fn from(state: &ListState) -> Self {
        Self {
            items: Arc::new(state.items().to_vec()),
            mode: state.mode().clone(),
            current_page: state.current_page(),
            has_more: state.has_more(),
            is_loading: state.is_loading(),
            last_error: state.last_error().cloned(),
        }
    }
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the list state,
/// executes fetches against the catalog API, and publishes snapshots.
#[derive(Clone)]
pub struct CatalogController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    client: CatalogClient,
    state: Mutex<ListState>,
    snapshot_tx: watch::Sender<ListSnapshot>,
    cancel: CancellationToken,
}

impl ControllerInner {
    fn lock_state(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ListState) {
        let _ = self.snapshot_tx.send(ListSnapshot::from(state));
    }
}

impl CatalogController {
    /// Wrap a catalog client. Does not fetch anything — call
    /// [`initialize()`](Self::initialize) to load the first page.
    pub fn new(client: CatalogClient) -> Self {
        let state = ListState::new();
        let (snapshot_tx, _) = watch::channel(ListSnapshot::from(&state));

        Self {
            inner: Arc::new(ControllerInner {
                client,
                state: Mutex::new(state),
                snapshot_tx,
                cancel: CancellationToken::new(),
            }),
        }
    }

    // ── View events ──────────────────────────────────────────────

    /// Reset to the initial state and fetch page 1.
    pub fn initialize(&self) {
        self.dispatch(ListEvent::Initialize);
    }

    /// Forward a search text change. Empty text returns to the
    /// paginated list.
    pub fn search_text_changed(&self, text: impl Into<String>) {
        self.dispatch(ListEvent::SearchTextChanged(text.into()));
    }

    /// The view scrolled to the end of the list.
    pub fn end_reached(&self) {
        self.dispatch(ListEvent::EndReached);
    }

    /// Re-issue the most recent fetch after a failure.
    pub fn retry(&self) {
        self.dispatch(ListEvent::Retry);
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to list snapshots.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> ListSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    // ── Detail lookup ────────────────────────────────────────────

    /// Read a single character for the detail view. Bypasses the list
    /// state machine; no pagination concerns apply.
    pub async fn character(&self, id: u64) -> Result<Character, CoreError> {
        let character = self.inner.client.get_character(id).await?;
        Ok(Character::from(character))
    }

    // ── Shutdown ─────────────────────────────────────────────────

    /// Cancel in-flight fetch tasks. Idempotent.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    // ── Internals ────────────────────────────────────────────────

    fn dispatch(&self, event: ListEvent) {
        let intent = {
            let mut state = self.inner.lock_state();
            let intent = state.handle(event);
            self.inner.publish(&state);
            intent
        };

        if let Some(intent) = intent {
            self.spawn_fetch(intent);
        }
    }

    /// Execute a fetch on a background task and feed the outcome back
    /// into the state machine. Stale outcomes (superseded epoch) are
    /// dropped without publishing.
    fn spawn_fetch(&self, intent: FetchIntent) {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = inner.cancel.cancelled() => {}
                outcome = execute(&inner.client, &intent.request) => {
                    let mut state = inner.lock_state();
                    if state.complete(&intent, outcome) {
                        inner.publish(&state);
                    } else {
                        debug!(epoch = intent.epoch, "discarding stale fetch result");
                    }
                }
            }
        });
    }
}

/// Run one fetch against the catalog API.
async fn execute(client: &CatalogClient, request: &FetchRequest) -> FetchOutcome {
    match request {
        FetchRequest::Page { number, .. } => match client.list_characters(*number).await {
            Ok(page) => FetchOutcome::Page {
                has_next: page.info.has_next(),
                items: page.results.into_iter().map(Character::from).collect(),
            },
            Err(e) => FetchOutcome::Failed(CoreError::from(e)),
        },

        FetchRequest::Entity { id_text } => match client.lookup_character(id_text).await {
            Ok(entity) => FetchOutcome::Entity(Character::from(entity)),
            Err(e) => FetchOutcome::Failed(CoreError::from(e)),
        },
    }
}
