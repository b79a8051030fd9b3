//! Data contract between a drag session and whatever draws it.
//!
//! Nothing here renders; the presentation layer reads a [`PreviewState`]
//! each frame to position the dragged element and its tooltip.

use chrono::{DateTime, Local};
use egui::{Pos2, Rect, Vec2};

use crate::models::settings::GridSettings;

/// Snapshot of where the dragged element should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewState {
    /// Top offset within the origin column
    pub top_px: f32,
    pub height_px: f32,
    /// Horizontal offset from the origin column
    pub column_offset_px: f32,
    /// Tooltip text, e.g. "09:30 - 10:30"
    pub label: String,
}

impl PreviewState {
    /// Screen rect of the preview given the origin column's left edge and width.
    pub fn rect(&self, column_left: f32, column_width: f32, grid_top: f32) -> Rect {
        Rect::from_min_size(
            Pos2::new(column_left + self.column_offset_px, grid_top + self.top_px),
            Vec2::new(column_width, self.height_px.max(0.0)),
        )
    }
}

/// Clock used for preview labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelClock {
    TwentyFourHour,
    TwelveHour,
}

impl LabelClock {
    pub fn from_settings(settings: &GridSettings) -> Self {
        if settings.uses_12h_clock() {
            LabelClock::TwelveHour
        } else {
            LabelClock::TwentyFourHour
        }
    }

    pub fn format_time(&self, time: DateTime<Local>) -> String {
        match self {
            LabelClock::TwentyFourHour => time.format("%H:%M").to_string(),
            LabelClock::TwelveHour => time.format("%-I:%M %p").to_string(),
        }
    }

    /// Label for a timed candidate; the weekday is shown once the item has
    /// left its original column.
    pub fn timed_label(&self, start: DateTime<Local>, end: DateTime<Local>, show_day: bool) -> String {
        let range = format!("{} - {}", self.format_time(start), self.format_time(end));
        if show_day {
            format!("{} {}", start.format("%a"), range)
        } else {
            range
        }
    }

    pub fn bucket_label(&self, bucket: &str, index: usize) -> String {
        format!("{} #{}", bucket, index + 1)
    }
}
