//! Horizontal geometry of the visible day columns.
//!
//! Built once per drag session from the layout the presentation layer
//! reports, so column boundaries never move under the pointer mid-drag.

use super::time_grid::round_half_up;

/// Fraction of a column the pointer must travel before the item changes
/// column. Keeps the preview from flickering on a boundary.
pub const COLUMN_SHIFT_DEADBAND: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    visible_width_px: f32,
    column_count: usize,
}

impl ColumnLayout {
    /// A zero column count is treated as a single column.
    pub fn new(visible_width_px: f32, column_count: usize) -> Self {
        Self {
            visible_width_px: if visible_width_px.is_finite() {
                visible_width_px.max(0.0)
            } else {
                0.0
            },
            column_count: column_count.max(1),
        }
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn column_width_px(&self) -> f32 {
        self.visible_width_px / self.column_count as f32
    }

    /// Whole columns moved for a horizontal pointer delta.
    ///
    /// Returns 0 until the pointer has moved more than 30% of a column.
    pub fn resolve_column_shift(&self, delta_x: f32) -> i64 {
        let width = self.column_width_px();
        if width <= 0.0 || !delta_x.is_finite() {
            return 0;
        }
        if delta_x.abs() <= COLUMN_SHIFT_DEADBAND * width {
            return 0;
        }
        round_half_up(f64::from(delta_x) / f64::from(width)) as i64
    }

    /// Limit a shift so `origin_column + shift` stays on a visible column.
    pub fn clamp_shift(&self, origin_column: usize, shift: i64) -> i64 {
        let origin = origin_column.min(self.column_count - 1) as i64;
        let last = self.column_count as i64 - 1;
        shift.clamp(-origin, last - origin)
    }

    pub fn column_offset_px(&self, shift: i64) -> f32 {
        shift as f32 * self.column_width_px()
    }

    /// Column under an x offset measured from the left edge of the first
    /// column, if any.
    pub fn column_at(&self, x: f32) -> Option<usize> {
        let width = self.column_width_px();
        if width <= 0.0 || !x.is_finite() || x < 0.0 {
            return None;
        }
        let index = (x / width) as usize;
        (index < self.column_count).then_some(index)
    }
}
