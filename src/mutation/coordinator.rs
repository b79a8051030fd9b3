//! Optimistic apply/reconcile of drag results.
//!
//! `apply` snapshots the collection, mutates it in place and hands back a
//! [`PendingMutation`] carrying that snapshot. Whoever persists the patches
//! later passes the pending value and the store's verdict to `reconcile`,
//! which either keeps the local state or restores the snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use super::collection::ItemCollection;
use super::persistence::{persist, ItemPatch};
use crate::drag::error::DragError;
use crate::drag::positioner::SiblingKey;
use crate::models::item::{ItemId, ItemPlacement, PositionPatch, ScheduledItem};
use crate::services::record_store::{PersistenceError, RecordStore};

/// Order keys closer than this count as unchanged.
pub const NO_OP_KEY_TOLERANCE: f64 = 1e-9;

/// Monotonic id of one applied mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationTicket(u64);

/// New position for an item, plus any siblings renumbered to make room.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateUpdate {
    pub item_id: ItemId,
    pub placement: ItemPlacement,
    pub rekeyed: Vec<SiblingKey>,
}

impl CandidateUpdate {
    pub fn new(item_id: ItemId, placement: ItemPlacement) -> Self {
        Self {
            item_id,
            placement,
            rekeyed: Vec::new(),
        }
    }

    pub fn with_rekeyed(mut self, rekeyed: Vec<SiblingKey>) -> Self {
        self.rekeyed = rekeyed;
        self
    }
}

/// A locally applied mutation waiting for the record store.
#[derive(Debug, Clone)]
pub struct PendingMutation {
    ticket: MutationTicket,
    update: CandidateUpdate,
    patches: Vec<ItemPatch>,
    restore: Vec<ItemPatch>,
    snapshot: ItemCollection,
}

impl PendingMutation {
    pub fn ticket(&self) -> MutationTicket {
        self.ticket
    }

    pub fn item_id(&self) -> ItemId {
        self.update.item_id
    }

    pub fn update(&self) -> &CandidateUpdate {
        &self.update
    }

    /// Store calls to make, primary item first.
    pub fn patches(&self) -> &[ItemPatch] {
        &self.patches
    }

    /// One patch per entry of `patches`, putting back the snapshot position.
    pub fn restore_patches(&self) -> &[ItemPatch] {
        &self.restore
    }

    /// The collection as it was before this mutation.
    pub fn snapshot(&self) -> &ItemCollection {
        &self.snapshot
    }
}

/// User-visible report of a rolled back change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFailure {
    pub item_id: ItemId,
    pub message: String,
}

/// What `reconcile` did with a store result.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// The store accepted the change; local state already matches.
    Confirmed {
        item_id: ItemId,
        ticket: MutationTicket,
    },
    /// The store refused the change and the snapshot was restored.
    RolledBack(MutationFailure),
    /// A newer mutation of the same item exists; the result was dropped.
    Superseded {
        item_id: ItemId,
        ticket: MutationTicket,
    },
}

#[derive(Debug, Default)]
pub struct OptimisticMutationCoordinator {
    collection: ItemCollection,
    next_ticket: u64,
    latest: HashMap<ItemId, MutationTicket>,
}

impl OptimisticMutationCoordinator {
    pub fn new(collection: ItemCollection) -> Self {
        Self {
            collection,
            next_ticket: 0,
            latest: HashMap::new(),
        }
    }

    pub fn collection(&self) -> &ItemCollection {
        &self.collection
    }

    /// Swap in freshly loaded items for one bucket.
    pub fn load_bucket(&mut self, bucket: &str, items: Vec<ScheduledItem>) {
        self.collection.replace_bucket(bucket, items);
    }

    /// Number of items with a mutation still waiting for the store.
    pub fn in_flight(&self) -> usize {
        self.latest.len()
    }

    /// Apply `update` to the in-memory collection.
    ///
    /// Returns `Ok(None)` when nothing would change, in which case no store
    /// call is needed. Nothing is mutated on error.
    pub fn apply(&mut self, update: CandidateUpdate) -> Result<Option<PendingMutation>, DragError> {
        let item = self
            .collection
            .get(update.item_id)
            .ok_or(DragError::UnknownItem(update.item_id))?;

        if item.kind() != update.placement.kind() {
            return Err(DragError::KindMismatch(update.item_id));
        }

        let mut sibling_patches = Vec::new();
        for sibling in &update.rekeyed {
            let current = self
                .collection
                .get(sibling.id)
                .and_then(|s| s.order_key())
                .ok_or(DragError::UnknownItem(sibling.id))?;
            if (current - sibling.order_key).abs() > NO_OP_KEY_TOLERANCE {
                sibling_patches.push(ItemPatch::new(
                    sibling.id,
                    PositionPatch {
                        order_key: Some(sibling.order_key),
                        ..PositionPatch::default()
                    },
                ));
            }
        }

        if sibling_patches.is_empty()
            && item.placement.same_position(&update.placement, NO_OP_KEY_TOLERANCE)
        {
            log::debug!("Item {} did not move; skipping persistence", update.item_id);
            return Ok(None);
        }

        let snapshot = self.collection.clone();

        // Full placement so a later patch never depends on an earlier one landing
        let mut patches = vec![ItemPatch::new(
            update.item_id,
            full_patch(&update.placement),
        )];
        patches.extend(sibling_patches);

        let restore = patches
            .iter()
            .filter_map(|patch| {
                snapshot
                    .placement(patch.item_id)
                    .map(|placement| ItemPatch::new(patch.item_id, full_patch(placement)))
            })
            .collect();

        for patch in &patches {
            self.collection.apply_patch(patch.item_id, &patch.patch);
        }

        self.next_ticket += 1;
        let ticket = MutationTicket(self.next_ticket);
        self.latest.insert(update.item_id, ticket);

        log::info!(
            "Moved item {} to {:?} ({} sibling(s) renumbered)",
            update.item_id,
            update.placement,
            patches.len() - 1
        );

        Ok(Some(PendingMutation {
            ticket,
            update,
            patches,
            restore,
            snapshot,
        }))
    }

    /// Settle `pending` with the record store's verdict.
    pub fn reconcile(
        &mut self,
        pending: PendingMutation,
        result: Result<(), PersistenceError>,
    ) -> Reconciliation {
        let item_id = pending.item_id();
        let ticket = pending.ticket;

        if self.latest.get(&item_id) != Some(&ticket) {
            log::warn!(
                "Discarding store result for item {}: a newer change superseded it",
                item_id
            );
            return Reconciliation::Superseded { item_id, ticket };
        }
        self.latest.remove(&item_id);

        match result {
            Ok(()) => Reconciliation::Confirmed { item_id, ticket },
            Err(e) => {
                log::error!("Failed to save move of item {}: {}; rolling back", item_id, e);
                self.collection = pending.snapshot;
                Reconciliation::RolledBack(MutationFailure {
                    item_id,
                    message: format!("Could not save the new position: {}", e),
                })
            }
        }
    }

    /// Apply, persist on the blocking pool, then reconcile.
    ///
    /// `Ok(None)` means the update was a no-op and the store was not called.
    pub async fn commit(
        &mut self,
        update: CandidateUpdate,
        store: Arc<dyn RecordStore>,
    ) -> Result<Option<Reconciliation>, DragError> {
        let Some(pending) = self.apply(update)? else {
            return Ok(None);
        };

        let result = persist(store, pending.patches.clone(), pending.restore.clone()).await;
        Ok(Some(self.reconcile(pending, result)))
    }
}

fn full_patch(placement: &ItemPlacement) -> PositionPatch {
    match placement {
        ItemPlacement::Timed { start, end } => PositionPatch::timed(*start, *end),
        ItemPlacement::Ordered { bucket, order_key } => PositionPatch::ordered(bucket.clone(), *order_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::record_store::MockRecordStore;
    use chrono::{DateTime, Duration, Local, TimeZone};
    use pretty_assertions::assert_eq;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 15, hour, minute, 0).unwrap()
    }

    fn task(id: ItemId, bucket: &str, key: f64) -> ScheduledItem {
        ScheduledItem::ordered(format!("Task {}", id), bucket, key)
            .unwrap()
            .with_id(id)
    }

    fn collection() -> ItemCollection {
        ItemCollection::new(vec![
            task(1, "todo", 1.0),
            task(2, "todo", 2.0),
            task(3, "todo", 3.0),
            ScheduledItem::timed("Client call", at(9, 0), at(10, 0))
                .unwrap()
                .with_id(10),
        ])
    }

    fn reorder(id: ItemId, key: f64) -> CandidateUpdate {
        CandidateUpdate::new(
            id,
            ItemPlacement::Ordered {
                bucket: "todo".to_string(),
                order_key: key,
            },
        )
    }

    #[test]
    fn test_apply_mutates_immediately() {
        let mut coordinator = OptimisticMutationCoordinator::new(collection());

        let pending = coordinator.apply(reorder(2, 2.5)).unwrap().unwrap();
        assert_eq!(coordinator.collection().get(2).unwrap().order_key(), Some(2.5));
        assert_eq!(pending.snapshot(), &collection());
        assert_eq!(pending.patches(), &[ItemPatch::new(2, PositionPatch::ordered("todo", 2.5))]);
        assert_eq!(coordinator.in_flight(), 1);
    }

    #[test]
    fn test_no_op_skips_persistence() {
        let mut coordinator = OptimisticMutationCoordinator::new(collection());

        assert!(coordinator.apply(reorder(2, 2.0 + 1e-12)).unwrap().is_none());
        let unchanged = CandidateUpdate::new(
            10,
            ItemPlacement::Timed {
                start: at(9, 0),
                end: at(10, 0),
            },
        );
        assert!(coordinator.apply(unchanged).unwrap().is_none());
        assert_eq!(coordinator.collection(), &collection());
        assert_eq!(coordinator.in_flight(), 0);
    }

    #[test]
    fn test_failed_reorder_restores_key() {
        let mut coordinator = OptimisticMutationCoordinator::new(collection());

        let pending = coordinator.apply(reorder(2, 2.5)).unwrap().unwrap();
        let outcome = coordinator.reconcile(
            pending,
            Err(PersistenceError::Unavailable("offline".to_string())),
        );

        assert!(matches!(
            outcome,
            Reconciliation::RolledBack(MutationFailure { item_id: 2, .. })
        ));
        let restored = coordinator.collection().get(2).unwrap();
        assert_eq!(restored.order_key(), Some(2.0));
        assert_eq!(restored.bucket(), Some("todo"));
        assert_eq!(coordinator.collection(), &collection());
    }

    #[test]
    fn test_success_keeps_local_state() {
        let mut coordinator = OptimisticMutationCoordinator::new(collection());

        let pending = coordinator.apply(reorder(2, 2.5)).unwrap().unwrap();
        let ticket = pending.ticket();
        let outcome = coordinator.reconcile(pending, Ok(()));

        assert_eq!(outcome, Reconciliation::Confirmed { item_id: 2, ticket });
        assert_eq!(coordinator.collection().get(2).unwrap().order_key(), Some(2.5));
        assert_eq!(coordinator.in_flight(), 0);
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let mut coordinator = OptimisticMutationCoordinator::new(collection());

        let first = coordinator.apply(reorder(2, 2.5)).unwrap().unwrap();
        let second = coordinator.apply(reorder(2, 0.5)).unwrap().unwrap();

        let outcome = coordinator.reconcile(first, Err(PersistenceError::Rejected("conflict".to_string())));
        assert!(matches!(outcome, Reconciliation::Superseded { item_id: 2, .. }));
        assert_eq!(coordinator.collection().get(2).unwrap().order_key(), Some(0.5));

        let outcome = coordinator.reconcile(second, Ok(()));
        assert!(matches!(outcome, Reconciliation::Confirmed { item_id: 2, .. }));
    }

    #[test]
    fn test_rekeyed_siblings_travel_with_the_move() {
        let mut coordinator = OptimisticMutationCoordinator::new(collection());
        let update = reorder(3, 1.0).with_rekeyed(vec![
            SiblingKey::new(1, 0.0),
            SiblingKey::new(2, 2.0),
        ]);

        let pending = coordinator.apply(update).unwrap().unwrap();
        // Sibling 2 already sits at 2.0 and needs no call
        assert_eq!(
            pending.patches().iter().map(|p| p.item_id).collect::<Vec<_>>(),
            vec![3, 1]
        );
        assert_eq!(coordinator.collection().get(1).unwrap().order_key(), Some(0.0));
        assert_eq!(
            pending.restore_patches(),
            &[
                ItemPatch::new(3, PositionPatch::ordered("todo", 3.0)),
                ItemPatch::new(1, PositionPatch::ordered("todo", 1.0)),
            ]
        );

        coordinator.reconcile(pending, Err(PersistenceError::NotFound(3)));
        assert_eq!(coordinator.collection(), &collection());
    }

    #[test]
    fn test_unknown_and_mismatched_items() {
        let mut coordinator = OptimisticMutationCoordinator::new(collection());

        assert_eq!(
            coordinator.apply(reorder(99, 1.0)).unwrap_err(),
            DragError::UnknownItem(99)
        );
        assert_eq!(
            coordinator.apply(reorder(10, 1.0)).unwrap_err(),
            DragError::KindMismatch(10)
        );
        assert_eq!(
            coordinator
                .apply(reorder(1, 5.0).with_rekeyed(vec![SiblingKey::new(42, 0.0)]))
                .unwrap_err(),
            DragError::UnknownItem(42)
        );
        assert_eq!(coordinator.collection(), &collection());
    }

    #[tokio::test]
    async fn test_commit_persists_through_store() {
        let mut store = MockRecordStore::new();
        store
            .expect_update_position()
            .withf(|id, patch| *id == 10 && patch.start == Some(at(9, 30)))
            .times(1)
            .returning(|id, _| {
                Ok(ScheduledItem::timed("Client call", at(9, 30), at(10, 30))
                    .unwrap()
                    .with_id(id))
            });

        let mut coordinator = OptimisticMutationCoordinator::new(collection());
        let update = CandidateUpdate::new(
            10,
            ItemPlacement::Timed {
                start: at(9, 30),
                end: at(10, 30),
            },
        );

        let outcome = coordinator.commit(update, Arc::new(store)).await.unwrap();
        assert!(matches!(outcome, Some(Reconciliation::Confirmed { item_id: 10, .. })));
        assert_eq!(
            coordinator.collection().get(10).unwrap().duration(),
            Some(Duration::hours(1))
        );
    }

    #[tokio::test]
    async fn test_commit_no_op_never_calls_store() {
        let mut store = MockRecordStore::new();
        store.expect_update_position().times(0);

        let mut coordinator = OptimisticMutationCoordinator::new(collection());
        let outcome = coordinator.commit(reorder(1, 1.0), Arc::new(store)).await.unwrap();
        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn test_commit_failure_rolls_back() {
        let mut store = MockRecordStore::new();
        store
            .expect_update_position()
            .returning(|_, _| Err(PersistenceError::Unavailable("offline".to_string())));

        let mut coordinator = OptimisticMutationCoordinator::new(collection());
        let outcome = coordinator.commit(reorder(2, 2.5), Arc::new(store)).await.unwrap();

        match outcome {
            Some(Reconciliation::RolledBack(failure)) => {
                assert_eq!(failure.item_id, 2);
                assert!(failure.message.contains("offline"));
            }
            other => panic!("expected a rollback, got {:?}", other),
        }
        assert_eq!(coordinator.collection(), &collection());
    }
}
