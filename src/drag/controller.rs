//! The pointer-event dispatcher.
//!
//! Owns the single active [`DragSession`], the optimistic coordinator and the
//! persistence queue. All methods run on the dispatcher thread; persistence
//! results come back through [`DragController::poll_persistence`].

use std::sync::Arc;

use egui::Pos2;

use super::column_layout::ColumnLayout;
use super::error::DragError;
use super::positioner::OrderedListPositioner;
use super::preview::{LabelClock, PreviewState};
use super::session::{BucketTarget, Candidate, DragSession, DropTarget, GestureMode, OriginVisual};
use super::time_grid::TimeGrid;
use crate::commands::{MoveItemCommand, UndoManager};
use crate::models::item::{ItemId, ItemPlacement, ScheduledItem};
use crate::models::settings::GridSettings;
use crate::mutation::{
    CandidateUpdate, ItemCollection, MutationOrigin, OptimisticMutationCoordinator,
    PersistenceQueue, PersistenceReport, Reconciliation,
};
use crate::services::record_store::{PersistenceError, RecordStore};

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    /// Whether the collection changed and a store call was issued
    pub applied: bool,
    /// The item as it is now displayed
    pub final_item: Option<ScheduledItem>,
}

pub struct DragController {
    session: Option<DragSession>,
    coordinator: OptimisticMutationCoordinator,
    persistence: PersistenceQueue,
    history: UndoManager,
    settings: GridSettings,
    grid: TimeGrid,
    positioner: OrderedListPositioner,
    clock: LabelClock,
}

impl DragController {
    pub fn new(
        collection: ItemCollection,
        store: Arc<dyn RecordStore>,
        settings: GridSettings,
    ) -> Self {
        Self {
            session: None,
            coordinator: OptimisticMutationCoordinator::new(collection),
            persistence: PersistenceQueue::new(store),
            history: UndoManager::new(),
            grid: TimeGrid::from_settings(&settings),
            positioner: OrderedListPositioner::new(settings.renormalize_threshold),
            clock: LabelClock::from_settings(&settings),
            settings,
        }
    }

    pub fn collection(&self) -> &ItemCollection {
        self.coordinator.collection()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    /// Swap grid settings. A session already in progress keeps the grid it
    /// started with.
    pub fn apply_settings(&mut self, settings: GridSettings) {
        self.grid = TimeGrid::from_settings(&settings);
        self.positioner = OrderedListPositioner::new(settings.renormalize_threshold);
        self.clock = LabelClock::from_settings(&settings);
        self.settings = settings;
    }

    /// Reload one bucket from the record store.
    pub async fn load_bucket(&mut self, bucket: &str) -> Result<usize, PersistenceError> {
        let store = self.persistence.store();
        let key = bucket.to_string();
        let items = tokio::task::spawn_blocking(move || store.list_siblings(&key))
            .await
            .map_err(|e| PersistenceError::Unavailable(format!("load task failed: {}", e)))??;

        let count = items.len();
        self.coordinator.load_bucket(bucket, items);
        log::debug!("Loaded {} item(s) into bucket '{}'", count, bucket);
        Ok(count)
    }

    /// Pointer-down on an item.
    ///
    /// Any unfinished session is cancelled first.
    pub fn on_gesture_start(
        &mut self,
        item_id: ItemId,
        mode: GestureMode,
        pointer: Pos2,
        origin: OriginVisual,
        layout: ColumnLayout,
    ) -> Result<PreviewState, DragError> {
        if let Some(previous) = self.session.take() {
            if previous.item_id() == item_id {
                log::warn!("Restarting drag of item {}; previous gesture dropped", item_id);
            } else {
                log::warn!(
                    "Cancelling drag of item {} to start dragging item {}",
                    previous.item_id(),
                    item_id
                );
            }
        }

        let item = self
            .coordinator
            .collection()
            .get(item_id)
            .ok_or(DragError::UnknownItem(item_id))?;
        let session = DragSession::begin(item, mode, pointer, origin, layout, self.grid)?;
        let preview = session.preview_state(self.clock);

        log::debug!("Started {:?} of item {}", mode, item_id);
        self.session = Some(session);
        Ok(preview)
    }

    /// Pointer moved. Returns the fresh preview, or `None` with no session.
    pub fn on_gesture_move(&mut self, pointer: Pos2) -> Option<PreviewState> {
        let session = self.session.as_mut()?;
        session.update(pointer);
        Some(session.preview_state(self.clock))
    }

    /// An ordered item is over `target`.
    pub fn on_hover(&mut self, target: BucketTarget) -> Option<PreviewState> {
        let session = self.session.as_mut()?;
        session.hover(target);
        Some(session.preview_state(self.clock))
    }

    /// The pointer left every bucket.
    pub fn on_hover_leave(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.clear_hover();
        }
    }

    /// Current preview, if a session is active.
    pub fn preview(&self) -> Option<PreviewState> {
        self.session
            .as_ref()
            .map(|session| session.preview_state(self.clock))
    }

    /// Pointer released over `drop_target`.
    ///
    /// Commits the last preview. An invalid target cancels the session and
    /// reports `applied: false`.
    pub fn on_gesture_end(&mut self, drop_target: DropTarget) -> Result<CommitOutcome, DragError> {
        let mut session = self.session.take().ok_or(DragError::NoActiveSession)?;
        let item_id = session.item_id();

        let Some(candidate) = session.begin_commit(&drop_target) else {
            log::debug!("Drag of item {} cancelled: invalid drop target", item_id);
            return Ok(self.outcome(item_id, false));
        };

        let Some(update) = self.candidate_update(item_id, &candidate) else {
            return Ok(self.outcome(item_id, false));
        };
        self.submit(update, MutationOrigin::Gesture)
    }

    /// Abandon the active session. Returns false when there was none.
    pub fn cancel(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                log::debug!("Drag of item {} cancelled", session.item_id());
                true
            }
            None => false,
        }
    }

    /// Revert the last confirmed move.
    pub fn undo(&mut self) -> Result<Option<CommitOutcome>, DragError> {
        let Some((entry, update)) = self.history.undo() else {
            return Ok(None);
        };
        match self.submit(update, MutationOrigin::Undo(entry)) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                self.history.requeue_undo(entry);
                Err(e)
            }
        }
    }

    /// Re-apply the last undone move.
    pub fn redo(&mut self) -> Result<Option<CommitOutcome>, DragError> {
        let Some((entry, update)) = self.history.redo() else {
            return Ok(None);
        };
        match self.submit(update, MutationOrigin::Redo(entry)) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                self.history.requeue_redo(entry);
                Err(e)
            }
        }
    }

    /// Store calls still outstanding.
    pub fn pending_saves(&self) -> usize {
        self.persistence.in_flight()
    }

    /// Reconcile every finished store call without blocking.
    pub fn poll_persistence(&mut self) -> Vec<Reconciliation> {
        let mut reconciled = Vec::new();
        while let Some(report) = self.persistence.try_next() {
            reconciled.push(self.reconcile(report));
        }
        reconciled
    }

    /// Wait for the next store call to finish and reconcile it.
    pub async fn next_persistence_report(&mut self) -> Option<Reconciliation> {
        let report = self.persistence.next().await?;
        Some(self.reconcile(report))
    }

    fn submit(
        &mut self,
        update: CandidateUpdate,
        origin: MutationOrigin,
    ) -> Result<CommitOutcome, DragError> {
        let item_id = update.item_id;
        match self.coordinator.apply(update)? {
            Some(pending) => {
                self.persistence.submit(pending, origin);
                Ok(self.outcome(item_id, true))
            }
            None => Ok(self.outcome(item_id, false)),
        }
    }

    fn reconcile(&mut self, report: PersistenceReport) -> Reconciliation {
        let PersistenceReport {
            pending,
            origin,
            result,
        } = report;

        let command = match (origin, &result) {
            (MutationOrigin::Gesture, Ok(())) => MoveItemCommand::from_pending(&pending),
            _ => None,
        };

        let reconciliation = self.coordinator.reconcile(pending, result);
        match (&reconciliation, origin) {
            (Reconciliation::Confirmed { .. }, MutationOrigin::Gesture) => {
                if let Some(command) = command {
                    self.history.push(Box::new(command));
                }
            }
            (Reconciliation::RolledBack(_), MutationOrigin::Undo(entry)) => {
                self.history.requeue_undo(entry);
            }
            (Reconciliation::RolledBack(_), MutationOrigin::Redo(entry)) => {
                self.history.requeue_redo(entry);
            }
            _ => {}
        }
        reconciliation
    }

    fn candidate_update(&self, item_id: ItemId, candidate: &Candidate) -> Option<CandidateUpdate> {
        match candidate {
            Candidate::Timed { start, end, .. } => Some(CandidateUpdate::new(
                item_id,
                ItemPlacement::Timed {
                    start: *start,
                    end: *end,
                },
            )),
            Candidate::Ordered { target: Some(target) } => {
                Some(self.ordered_update(item_id, target))
            }
            Candidate::Ordered { target: None } => None,
        }
    }

    fn ordered_update(&self, item_id: ItemId, target: &BucketTarget) -> CandidateUpdate {
        let collection = self.coordinator.collection();
        let siblings = collection.siblings(&target.bucket, Some(item_id));
        let index = target.index.min(siblings.len());

        // Dropping back onto its own slot keeps the current key
        if let Some(ItemPlacement::Ordered { bucket, order_key }) = collection.placement(item_id) {
            let rank = siblings
                .iter()
                .filter(|sibling| sibling.order_key < *order_key)
                .count();
            if *bucket == target.bucket && rank == index {
                return CandidateUpdate::new(
                    item_id,
                    ItemPlacement::Ordered {
                        bucket: bucket.clone(),
                        order_key: *order_key,
                    },
                );
            }
        }

        let placement = self.positioner.place(&siblings, index);
        CandidateUpdate::new(
            item_id,
            ItemPlacement::Ordered {
                bucket: target.bucket.clone(),
                order_key: placement.order_key,
            },
        )
        .with_rekeyed(placement.rekeyed)
    }

    fn outcome(&self, item_id: ItemId, applied: bool) -> CommitOutcome {
        CommitOutcome {
            applied,
            final_item: self.coordinator.collection().get(item_id).cloned(),
        }
    }
}
