use thiserror::Error;

use super::session::GestureMode;
use crate::models::item::ItemId;

/// Caller errors raised by the drag engine.
///
/// None of these touch item state; an invalid drop target is not an error
/// and simply cancels the session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DragError {
    #[error("item has not been saved and cannot be dragged")]
    UnsavedItem,
    #[error("item {0} is not in the loaded collection")]
    UnknownItem(ItemId),
    #[error("item {item_id} does not support a {mode:?} gesture")]
    UnsupportedGesture { item_id: ItemId, mode: GestureMode },
    #[error("update for item {0} does not match its kind")]
    KindMismatch(ItemId),
    #[error("no drag session is active")]
    NoActiveSession,
}
