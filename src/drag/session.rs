//! A single drag gesture, from pointer-down to commit or cancel.
//!
//! The session is a plain value owned by the controller and handed to each
//! pointer handler. It captures the origin once and recomputes the whole
//! candidate from `origin + current delta` on every move, so deltas are never
//! accumulated and the committed value is always the last previewed one.

use chrono::{DateTime, Duration, Local};
use egui::{Pos2, Vec2};

use super::column_layout::ColumnLayout;
use super::error::DragError;
use super::preview::{LabelClock, PreviewState};
use super::time_grid::TimeGrid;
use crate::models::item::{ItemId, ItemKind, ItemPlacement, ScheduledItem};
use crate::utils::date::shift_days;

/// Largest vertical shift a single gesture can produce, in minutes.
///
/// Pointer deltas far off the grid would otherwise overflow date arithmetic.
pub const MAX_SHIFT_MINUTES: i64 = 366 * 24 * 60;

/// Which edge of a timed item a resize drags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeEdge {
    /// Top edge - adjusts start time
    Start,
    /// Bottom edge - adjusts end time
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureMode {
    Move,
    Resize(ResizeEdge),
}

/// Where the dragged element was drawn when the gesture began.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OriginVisual {
    pub top_px: f32,
    pub height_px: f32,
    pub column_index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Committing,
}

/// Bucket and sibling index the pointer is over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketTarget {
    pub bucket: String,
    pub index: usize,
}

impl BucketTarget {
    pub fn new(bucket: impl Into<String>, index: usize) -> Self {
        Self {
            bucket: bucket.into(),
            index,
        }
    }
}

/// What the pointer was released over.
#[derive(Clone, Debug, PartialEq)]
pub enum DropTarget {
    /// A day column of the time grid
    Column(usize),
    /// A position inside an ordered bucket
    Bucket(BucketTarget),
    /// Outside every recognised target
    Nowhere,
}

/// Domain position derived from the current pointer delta.
#[derive(Clone, Debug, PartialEq)]
pub enum Candidate {
    Timed {
        start: DateTime<Local>,
        end: DateTime<Local>,
        column_shift: i64,
    },
    Ordered {
        target: Option<BucketTarget>,
    },
}

#[derive(Clone, Debug)]
pub struct DragSession {
    item_id: ItemId,
    mode: GestureMode,
    origin_pointer: Pos2,
    origin: OriginVisual,
    origin_placement: ItemPlacement,
    layout: ColumnLayout,
    grid: TimeGrid,
    delta: Vec2,
    candidate: Candidate,
    phase: SessionPhase,
}

impl DragSession {
    /// Start a gesture on `item`.
    ///
    /// `origin` must come from the current render state so the preview starts
    /// exactly where the item is drawn.
    pub fn begin(
        item: &ScheduledItem,
        mode: GestureMode,
        pointer: Pos2,
        origin: OriginVisual,
        layout: ColumnLayout,
        grid: TimeGrid,
    ) -> Result<Self, DragError> {
        let item_id = item.id.ok_or(DragError::UnsavedItem)?;

        if item.kind() == ItemKind::Ordered && mode != GestureMode::Move {
            return Err(DragError::UnsupportedGesture { item_id, mode });
        }

        let candidate = match &item.placement {
            ItemPlacement::Timed { start, end } => Candidate::Timed {
                start: *start,
                end: *end,
                column_shift: 0,
            },
            ItemPlacement::Ordered { .. } => Candidate::Ordered { target: None },
        };

        Ok(Self {
            item_id,
            mode,
            origin_pointer: pointer,
            origin,
            origin_placement: item.placement.clone(),
            layout,
            grid,
            delta: Vec2::ZERO,
            candidate,
            phase: SessionPhase::Active,
        })
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn origin(&self) -> OriginVisual {
        self.origin
    }

    pub fn origin_placement(&self) -> &ItemPlacement {
        &self.origin_placement
    }

    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    pub fn grid(&self) -> TimeGrid {
        self.grid
    }

    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// The last computed candidate, i.e. what the preview currently shows.
    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    /// Handle a pointer move and return the refreshed candidate.
    ///
    /// Ignored once the session is committing.
    pub fn update(&mut self, pointer: Pos2) -> &Candidate {
        if self.phase != SessionPhase::Active {
            return &self.candidate;
        }

        self.delta = pointer - self.origin_pointer;
        if let ItemPlacement::Timed { start, end } = self.origin_placement {
            self.candidate = self.timed_candidate(start, end, self.delta);
        }
        &self.candidate
    }

    /// Record the bucket position an ordered item is hovering over.
    pub fn hover(&mut self, target: BucketTarget) {
        if self.phase != SessionPhase::Active {
            return;
        }
        if let Candidate::Ordered { target: hovered } = &mut self.candidate {
            *hovered = Some(target);
        }
    }

    /// Leave the hovered bucket (pointer is over empty space).
    pub fn clear_hover(&mut self) {
        if let Candidate::Ordered { target } = &mut self.candidate {
            *target = None;
        }
    }

    /// Finish the gesture over `drop_target`.
    ///
    /// Returns the final candidate and moves to `Committing`, or `None` when
    /// the target is not valid for this item, in which case the caller
    /// cancels the session. An ordered item commits its last hovered
    /// position; the release target only counts when nothing was hovered.
    pub fn begin_commit(&mut self, drop_target: &DropTarget) -> Option<Candidate> {
        if self.phase != SessionPhase::Active {
            return None;
        }

        let accepted = match (&mut self.candidate, drop_target) {
            (Candidate::Timed { .. }, DropTarget::Column(_)) => true,
            (Candidate::Ordered { target }, DropTarget::Bucket(released)) => {
                match target {
                    // The hovered position is what the preview showed
                    Some(hovered) if *hovered != *released => log::debug!(
                        "Drop of item {} reported {:?}; keeping hovered {:?}",
                        self.item_id,
                        released,
                        hovered
                    ),
                    Some(_) => {}
                    None => *target = Some(released.clone()),
                }
                true
            }
            _ => false,
        };

        if !accepted {
            log::debug!(
                "Drop of item {} over {:?} is not a valid target",
                self.item_id,
                drop_target
            );
            return None;
        }

        self.phase = SessionPhase::Committing;
        Some(self.candidate.clone())
    }

    /// Read-only projection for the presentation layer.
    pub fn preview_state(&self, clock: LabelClock) -> PreviewState {
        match (&self.candidate, &self.origin_placement) {
            (
                Candidate::Timed {
                    start,
                    end,
                    column_shift,
                },
                ItemPlacement::Timed {
                    start: origin_start,
                    end: origin_end,
                },
            ) => {
                let shifted_origin = shift_days(*origin_start, *column_shift);
                let moved_minutes = (*start - shifted_origin).num_minutes();
                let stretched_minutes =
                    ((*end - *start) - (*origin_end - *origin_start)).num_minutes();

                PreviewState {
                    top_px: self.origin.top_px + self.grid.minutes_to_pixels(moved_minutes),
                    height_px: self.origin.height_px
                        + self.grid.minutes_to_pixels(stretched_minutes),
                    column_offset_px: self.layout.column_offset_px(*column_shift),
                    label: clock.timed_label(*start, *end, *column_shift != 0),
                }
            }
            (Candidate::Ordered { target }, _) => PreviewState {
                top_px: self.origin.top_px + self.delta.y,
                height_px: self.origin.height_px,
                column_offset_px: self.delta.x,
                label: target
                    .as_ref()
                    .map(|t| clock.bucket_label(&t.bucket, t.index))
                    .unwrap_or_default(),
            },
            // Candidate kind always follows the origin kind
            (Candidate::Timed { .. }, ItemPlacement::Ordered { .. }) => PreviewState {
                top_px: self.origin.top_px,
                height_px: self.origin.height_px,
                column_offset_px: 0.0,
                label: String::new(),
            },
        }
    }

    fn timed_candidate(
        &self,
        start: DateTime<Local>,
        end: DateTime<Local>,
        delta: Vec2,
    ) -> Candidate {
        let minutes = self
            .grid
            .pixels_to_minutes(delta.y)
            .clamp(-MAX_SHIFT_MINUTES, MAX_SHIFT_MINUTES);
        let floor = self.grid.snap_increment();
        let offset = |instant: DateTime<Local>| instant.checked_add_signed(Duration::minutes(minutes));

        match self.mode {
            GestureMode::Move => {
                let shift = self
                    .layout
                    .clamp_shift(self.origin.column_index, self.layout.resolve_column_shift(delta.x));

                // An unmoved pointer never changes the item
                if minutes == 0 && shift == 0 {
                    return Candidate::Timed {
                        start,
                        end,
                        column_shift: 0,
                    };
                }

                let Some(moved) = offset(start) else {
                    return self.candidate.clone();
                };
                let new_start = shift_days(self.grid.snap_instant(moved), shift);
                let Some(new_end) = new_start.checked_add_signed(end - start) else {
                    return self.candidate.clone();
                };
                Candidate::Timed {
                    start: new_start,
                    end: new_end,
                    column_shift: shift,
                }
            }
            GestureMode::Resize(ResizeEdge::End) => {
                let mut new_end = match offset(end) {
                    _ if minutes == 0 => end,
                    Some(moved) => self.grid.snap_instant(moved),
                    None => return self.candidate.clone(),
                };
                if new_end - start < floor {
                    log::debug!(
                        "Resize of item {} clamped to the {} minute floor",
                        self.item_id,
                        floor.num_minutes()
                    );
                    new_end = start + floor;
                }
                Candidate::Timed {
                    start,
                    end: new_end,
                    column_shift: 0,
                }
            }
            GestureMode::Resize(ResizeEdge::Start) => {
                let mut new_start = match offset(start) {
                    _ if minutes == 0 => start,
                    Some(moved) => self.grid.snap_instant(moved),
                    None => return self.candidate.clone(),
                };
                if end - new_start < floor {
                    log::debug!(
                        "Resize of item {} clamped to the {} minute floor",
                        self.item_id,
                        floor.num_minutes()
                    );
                    new_start = end - floor;
                }
                Candidate::Timed {
                    start: new_start,
                    end,
                    column_shift: 0,
                }
            }
        }
    }
}
