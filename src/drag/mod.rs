// Drag engine module
// Turns pointer gestures into snapped, validated position changes

pub mod column_layout;
pub mod controller;
pub mod error;
pub mod handles;
pub mod positioner;
pub mod preview;
pub mod session;
pub mod time_grid;

pub use column_layout::ColumnLayout;
pub use controller::{CommitOutcome, DragController};
pub use error::DragError;
pub use handles::HandleRects;
pub use positioner::{OrderedListPositioner, Placement, SiblingKey};
pub use preview::{LabelClock, PreviewState};
pub use session::{
    BucketTarget, Candidate, DragSession, DropTarget, GestureMode, OriginVisual, ResizeEdge,
    SessionPhase,
};
pub use time_grid::TimeGrid;
