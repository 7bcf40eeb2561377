//! Data bridge — connects [`CatalogController`] snapshots to TUI actions.
//!
//! Runs as a background task: triggers the initial load, then forwards
//! every published list snapshot as an [`Action`] through the TUI's
//! action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use multiverse_core::CatalogController;

use crate::action::Action;

/// Forward [`CatalogController`] snapshots into the TUI action loop.
///
/// Issues the initial page-1 fetch, pushes the current snapshot so the
/// list screen has state immediately, then loops forwarding every change
/// until cancelled.
pub async fn run_data_bridge(
    controller: CatalogController,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    controller.initialize();

    let mut snapshots = controller.subscribe();
    let _ = action_tx.send(Action::ListUpdated(snapshots.borrow_and_update().clone()));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                if action_tx.send(Action::ListUpdated(snap)).is_err() {
                    break;
                }
            }
        }
    }

    controller.shutdown();
    debug!("data bridge shut down");
}
