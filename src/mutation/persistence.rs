//! Background persistence of applied mutations.
//!
//! Store calls run on the tokio blocking pool. Each finished job posts a
//! [`PersistenceReport`] on a channel that the dispatcher drains on its own
//! thread, so reconciliation never races pointer handling.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use super::coordinator::PendingMutation;
use crate::commands::HistoryId;
use crate::models::item::{ItemId, PositionPatch};
use crate::services::record_store::{PersistenceError, RecordStore};

/// One store call.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPatch {
    pub item_id: ItemId,
    pub patch: PositionPatch,
}

impl ItemPatch {
    pub fn new(item_id: ItemId, patch: PositionPatch) -> Self {
        Self { item_id, patch }
    }
}

/// What triggered a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOrigin {
    Gesture,
    /// Reverting the history entry
    Undo(HistoryId),
    /// Re-applying the history entry
    Redo(HistoryId),
}

/// A finished store job.
#[derive(Debug)]
pub struct PersistenceReport {
    pub pending: PendingMutation,
    pub origin: MutationOrigin,
    pub result: Result<(), PersistenceError>,
}

/// Send `patches` to the store in order, stopping at the first failure.
///
/// `restore[i]` puts back what `patches[i]` overwrote. When a patch fails
/// after earlier ones landed, those are reverted newest first so the store
/// is not left with half of a renumbered bucket. The original error is
/// returned either way.
pub fn persist_patches(
    store: &dyn RecordStore,
    patches: &[ItemPatch],
    restore: &[ItemPatch],
) -> Result<(), PersistenceError> {
    for (index, ItemPatch { item_id, patch }) in patches.iter().enumerate() {
        if let Err(e) = store.update_position(*item_id, patch) {
            if index > 0 {
                log::error!(
                    "Saving item {} failed after {} of {} patch(es) landed: {}; reverting them",
                    item_id,
                    index,
                    patches.len(),
                    e
                );
                revert_landed(store, restore.get(..index).unwrap_or(restore));
            }
            return Err(e);
        }
    }
    Ok(())
}

fn revert_landed(store: &dyn RecordStore, landed: &[ItemPatch]) {
    for ItemPatch { item_id, patch } in landed.iter().rev() {
        if let Err(e) = store.update_position(*item_id, patch) {
            log::error!(
                "Could not revert item {} after a failed save: {}; stored order may be inconsistent",
                item_id,
                e
            );
        }
    }
}

/// [`persist_patches`] on the blocking pool.
pub async fn persist(
    store: Arc<dyn RecordStore>,
    patches: Vec<ItemPatch>,
    restore: Vec<ItemPatch>,
) -> Result<(), PersistenceError> {
    tokio::task::spawn_blocking(move || persist_patches(store.as_ref(), &patches, &restore))
        .await
        .map_err(|e| PersistenceError::Unavailable(format!("persistence task failed: {}", e)))?
}

/// Runs store jobs and collects their reports.
pub struct PersistenceQueue {
    store: Arc<dyn RecordStore>,
    tx: UnboundedSender<PersistenceReport>,
    rx: UnboundedReceiver<PersistenceReport>,
    in_flight: usize,
}

impl PersistenceQueue {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// Jobs submitted but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Persist `pending` in the background.
    ///
    /// Outside a tokio runtime the store is called inline and the report is
    /// queued immediately.
    pub fn submit(&mut self, pending: PendingMutation, origin: MutationOrigin) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        self.in_flight += 1;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let result = persist(
                        store,
                        pending.patches().to_vec(),
                        pending.restore_patches().to_vec(),
                    )
                    .await;
                    if tx.send(PersistenceReport { pending, origin, result }).is_err() {
                        log::warn!("Persistence queue closed before a result was delivered");
                    }
                });
            }
            Err(_) => {
                log::debug!("No async runtime; saving item {} inline", pending.item_id());
                let result =
                    persist_patches(store.as_ref(), pending.patches(), pending.restore_patches());
                if tx.send(PersistenceReport { pending, origin, result }).is_err() {
                    log::warn!("Persistence queue closed before a result was delivered");
                }
            }
        }
    }

    /// Next finished report, without waiting.
    pub fn try_next(&mut self) -> Option<PersistenceReport> {
        match self.rx.try_recv() {
            Ok(report) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(report)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::error!("Persistence channel disconnected unexpectedly");
                None
            }
        }
    }

    /// Wait for the next report. `None` once nothing is in flight.
    pub async fn next(&mut self) -> Option<PersistenceReport> {
        if self.in_flight == 0 {
            return None;
        }
        let report = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(report)
    }
}
