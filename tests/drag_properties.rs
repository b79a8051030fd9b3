// Property-based tests for the drag engine
// Checks snapping, resize floors, column hysteresis, key ordering and
// rollback against random gestures

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone};
use egui::Pos2;
use proptest::prelude::*;
use schedule_drag::drag::positioner::insertion_key;
use schedule_drag::drag::{
    ColumnLayout, DragSession, DropTarget, GestureMode, OrderedListPositioner, OriginVisual,
    ResizeEdge, SiblingKey, TimeGrid,
};
use schedule_drag::models::item::{ItemPlacement, ScheduledItem};
use schedule_drag::mutation::{CandidateUpdate, ItemCollection, OptimisticMutationCoordinator};
use schedule_drag::services::record_store::PersistenceError;

fn nine_am() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
}

fn origin() -> OriginVisual {
    OriginVisual {
        top_px: 540.0,
        height_px: 60.0,
        column_index: 3,
    }
}

fn session_for(mode: GestureMode, minutes: i64) -> DragSession {
    let item = ScheduledItem::timed("Client call", nine_am(), nine_am() + Duration::minutes(minutes))
        .unwrap()
        .with_id(1);
    DragSession::begin(
        &item,
        mode,
        Pos2::new(350.0, 560.0),
        origin(),
        ColumnLayout::new(700.0, 7),
        TimeGrid::default(),
    )
    .unwrap()
}

fn committed_range(session: &mut DragSession) -> (DateTime<Local>, DateTime<Local>) {
    match session.begin_commit(&DropTarget::Column(3)) {
        Some(schedule_drag::drag::Candidate::Timed { start, end, .. }) => (start, end),
        other => panic!("expected a timed commit, got {:?}", other),
    }
}

proptest! {
    /// Property: snapped minutes are always a whole number of slots
    #[test]
    fn prop_snapped_minutes_are_multiples_of_increment(px in -2000.0f32..2000.0) {
        let grid = TimeGrid::default();
        prop_assert_eq!(grid.snap_minutes(grid.pixels_to_minutes(px)) % 15, 0);
    }

    /// Property: a moved item lands on the grid and keeps its duration
    #[test]
    fn prop_move_lands_on_grid(dx in -400.0f32..400.0, dy in -500.0f32..500.0) {
        let grid = TimeGrid::default();
        let mut session = session_for(GestureMode::Move, 60);
        session.update(Pos2::new(350.0 + dx, 560.0 + dy));

        let (start, end) = committed_range(&mut session);
        prop_assert!(grid.is_snapped(start));
        prop_assert_eq!(end - start, Duration::hours(1));
    }

    /// Property: resizing never goes below one snap increment
    #[test]
    fn prop_resize_respects_floor(dy in -1000.0f32..1000.0, from_start in any::<bool>()) {
        let edge = if from_start { ResizeEdge::Start } else { ResizeEdge::End };
        let mut session = session_for(GestureMode::Resize(edge), 60);
        session.update(Pos2::new(350.0, 560.0 + dy));

        let (start, end) = committed_range(&mut session);
        prop_assert!(end - start >= Duration::minutes(15));
    }

    /// Property: no column change inside the deadband, whole columns outside
    #[test]
    fn prop_column_shift_hysteresis(dx in -1000.0f32..1000.0) {
        let layout = ColumnLayout::new(700.0, 7);
        let shift = layout.resolve_column_shift(dx);
        if dx.abs() <= 30.0 {
            prop_assert_eq!(shift, 0);
        } else {
            prop_assert_eq!(shift, (f64::from(dx) / 100.0 + 0.5).floor() as i64);
        }
    }

    /// Property: a midpoint key falls strictly between its neighbours
    #[test]
    fn prop_insertion_key_between_neighbours(a in -1000.0f64..1000.0, gap in 0.001f64..1000.0) {
        let b = a + gap;
        let key = insertion_key(&[a, b], 1);
        prop_assert!(a < key && key < b);
    }

    /// Property: keys past either end fall outside the range
    #[test]
    fn prop_insertion_key_at_ends(first in 1.0f64..1000.0, gap in 0.001f64..1000.0) {
        let last = first + gap;
        prop_assert!(insertion_key(&[first, last], 0) < first);
        prop_assert!(insertion_key(&[first, last], 2) > last);
    }

    /// Property: placing then applying re-keys leaves the bucket strictly ordered
    #[test]
    fn prop_placement_keeps_strict_order(
        mut keys in prop::collection::vec(0.0f64..10.0, 0..12),
        index in 0usize..14,
    ) {
        keys.sort_by(f64::total_cmp);
        keys.dedup();
        let mut bucket: Vec<SiblingKey> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| SiblingKey::new(i as i64 + 1, *key))
            .collect();

        let placement = OrderedListPositioner::default().place(&bucket, index);
        for rekey in &placement.rekeyed {
            if let Some(sibling) = bucket.iter_mut().find(|s| s.id == rekey.id) {
                sibling.order_key = rekey.order_key;
            }
        }
        bucket.insert(index.min(bucket.len()), SiblingKey::new(0, placement.order_key));

        prop_assert!(bucket.windows(2).all(|pair| pair[0].order_key < pair[1].order_key));
    }

    /// Property: a failed commit leaves the collection exactly as before
    #[test]
    fn prop_rollback_restores_collection(key in -100.0f64..100.0, bucket in "[a-z]{1,8}") {
        let before = ItemCollection::new(vec![
            ScheduledItem::ordered("Send quote", "todo", 2.0).unwrap().with_id(1),
            ScheduledItem::ordered("Follow up", "todo", 3.0).unwrap().with_id(2),
        ]);
        let mut coordinator = OptimisticMutationCoordinator::new(before.clone());
        let update = CandidateUpdate::new(1, ItemPlacement::Ordered { bucket, order_key: key });

        if let Some(pending) = coordinator.apply(update).unwrap() {
            coordinator.reconcile(pending, Err(PersistenceError::Unavailable("offline".to_string())));
        }
        prop_assert_eq!(coordinator.collection(), &before);
    }
}

#[test]
fn test_zero_delta_round_trip_commits_origin() {
    let mut session = session_for(GestureMode::Move, 45);
    session.update(Pos2::new(350.0, 560.0));
    assert_eq!(
        committed_range(&mut session),
        (nine_am(), nine_am() + Duration::minutes(45))
    );
}

#[tokio::test]
async fn test_commit_with_unreachable_store_restores_state() {
    struct Offline;

    impl schedule_drag::services::record_store::RecordStore for Offline {
        fn update_position(
            &self,
            _item_id: i64,
            _patch: &schedule_drag::models::item::PositionPatch,
        ) -> Result<ScheduledItem, PersistenceError> {
            Err(PersistenceError::Unavailable("offline".to_string()))
        }

        fn list_siblings(&self, _bucket_key: &str) -> Result<Vec<ScheduledItem>, PersistenceError> {
            Ok(Vec::new())
        }
    }

    let before = ItemCollection::new(vec![
        ScheduledItem::ordered("Send quote", "todo", 2.0).unwrap().with_id(1)
    ]);
    let mut coordinator = OptimisticMutationCoordinator::new(before.clone());
    let update = CandidateUpdate::new(
        1,
        ItemPlacement::Ordered {
            bucket: "todo".to_string(),
            order_key: 2.5,
        },
    );

    let outcome = coordinator.commit(update, Arc::new(Offline)).await.unwrap();
    assert!(matches!(
        outcome,
        Some(schedule_drag::mutation::Reconciliation::RolledBack(_))
    ));
    assert_eq!(coordinator.collection().get(1).unwrap().order_key(), Some(2.0));
    assert_eq!(coordinator.collection(), &before);
}
