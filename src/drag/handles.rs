// Resize handle hit-testing
//
// Decides at pointer-down whether a gesture on a timed item is a move or a
// resize of its start/end edge.

use egui::{Pos2, Rect, Vec2};

use super::session::{GestureMode, ResizeEdge};

/// Items shorter than this split their whole height between the two zones.
pub const SMALL_ITEM_HEIGHT: f32 = 50.0;
/// Height of each edge zone on larger items.
pub const HANDLE_ZONE_HEIGHT: f32 = 20.0;

impl ResizeEdge {
    /// Returns the cursor icon for this edge
    pub fn cursor_icon(&self) -> egui::CursorIcon {
        egui::CursorIcon::ResizeVertical
    }
}

impl GestureMode {
    pub fn cursor_icon(&self) -> egui::CursorIcon {
        match self {
            GestureMode::Move => egui::CursorIcon::Grabbing,
            GestureMode::Resize(edge) => edge.cursor_icon(),
        }
    }
}

/// Hit zones on a timed item's rect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleRects {
    pub start: Rect,
    pub end: Rect,
}

impl HandleRects {
    pub fn for_timed_item(item_rect: Rect) -> Self {
        let item_height = item_rect.height();

        let zone_height = if item_height < SMALL_ITEM_HEIGHT {
            item_height / 2.0
        } else {
            HANDLE_ZONE_HEIGHT
        };

        // Zones span the full width of the item
        Self {
            start: Rect::from_min_size(
                Pos2::new(item_rect.left(), item_rect.top()),
                Vec2::new(item_rect.width(), zone_height),
            ),
            end: Rect::from_min_size(
                Pos2::new(item_rect.left(), item_rect.bottom() - zone_height),
                Vec2::new(item_rect.width(), zone_height),
            ),
        }
    }

    /// Which edge, if any, the point falls on
    pub fn hit_test(&self, pos: Pos2) -> Option<ResizeEdge> {
        if self.start.contains(pos) {
            Some(ResizeEdge::Start)
        } else if self.end.contains(pos) {
            Some(ResizeEdge::End)
        } else {
            None
        }
    }

    /// Gesture to start for a pointer-down at `pos`
    pub fn gesture_mode(&self, pos: Pos2) -> GestureMode {
        self.hit_test(pos)
            .map(GestureMode::Resize)
            .unwrap_or(GestureMode::Move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_item_uses_fixed_zones() {
        let rect = Rect::from_min_size(Pos2::new(100.0, 100.0), Vec2::new(200.0, 120.0));
        let handles = HandleRects::for_timed_item(rect);

        assert_eq!(handles.hit_test(Pos2::new(200.0, 105.0)), Some(ResizeEdge::Start));
        assert_eq!(handles.hit_test(Pos2::new(200.0, 215.0)), Some(ResizeEdge::End));
        assert_eq!(handles.hit_test(Pos2::new(200.0, 160.0)), None);
        assert_eq!(handles.gesture_mode(Pos2::new(200.0, 160.0)), GestureMode::Move);
    }

    #[test]
    fn test_small_item_splits_in_half() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(100.0, 30.0));
        let handles = HandleRects::for_timed_item(rect);

        assert_eq!(handles.start.height(), 15.0);
        assert_eq!(
            handles.gesture_mode(Pos2::new(50.0, 25.0)),
            GestureMode::Resize(ResizeEdge::End)
        );
    }

    #[test]
    fn test_cursor_icons() {
        assert_eq!(GestureMode::Move.cursor_icon(), egui::CursorIcon::Grabbing);
        assert_eq!(
            GestureMode::Resize(ResizeEdge::End).cursor_icon(),
            egui::CursorIcon::ResizeVertical
        );
    }
}
