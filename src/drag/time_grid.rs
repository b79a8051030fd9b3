//! Conversion between vertical pixel offsets and calendar minutes.
//!
//! Every function here is pure and total: any finite pixel delta maps to a
//! whole number of minutes, and snapping always lands on a multiple of the
//! snap increment measured from local midnight.

use chrono::{DateTime, Duration, Local, NaiveTime};

use crate::models::settings::GridSettings;
use crate::utils::date::{minute_of_day, to_local};

/// Default pixel height of one hour.
pub const DEFAULT_SLOT_HEIGHT: f32 = 60.0;
/// Default snap increment in minutes.
pub const DEFAULT_SNAP_MINUTES: i64 = 15;

/// Round half up, the rounding used for every pixel and minute conversion.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    slot_height_px: f32,
    snap_minutes: i64,
    day_start_hour: u32,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_HEIGHT, DEFAULT_SNAP_MINUTES)
    }
}

impl TimeGrid {
    /// Build a grid with `slot_height_px` pixels per hour.
    ///
    /// Degenerate values fall back to the defaults so conversions stay total.
    pub fn new(slot_height_px: f32, snap_minutes: i64) -> Self {
        let slot_height_px = if slot_height_px.is_finite() && slot_height_px > 0.0 {
            slot_height_px
        } else {
            DEFAULT_SLOT_HEIGHT
        };
        let snap_minutes = if snap_minutes > 0 {
            snap_minutes
        } else {
            DEFAULT_SNAP_MINUTES
        };

        Self {
            slot_height_px,
            snap_minutes,
            day_start_hour: 0,
        }
    }

    pub fn from_settings(settings: &GridSettings) -> Self {
        Self::new(settings.slot_height_px, settings.snap_minutes)
            .with_day_start(settings.day_start_hour)
    }

    /// Hour drawn at the top of the grid
    pub fn with_day_start(mut self, hour: u32) -> Self {
        self.day_start_hour = hour.min(23);
        self
    }

    pub fn slot_height_px(&self) -> f32 {
        self.slot_height_px
    }

    pub fn snap_increment_minutes(&self) -> i64 {
        self.snap_minutes
    }

    pub fn snap_increment(&self) -> Duration {
        Duration::minutes(self.snap_minutes)
    }

    /// `round(px / slot_height * 60)`
    pub fn pixels_to_minutes(&self, px: f32) -> i64 {
        if !px.is_finite() {
            return 0;
        }
        round_half_up(f64::from(px) / f64::from(self.slot_height_px) * 60.0) as i64
    }

    /// `(minutes / 60) * slot_height`
    pub fn minutes_to_pixels(&self, minutes: i64) -> f32 {
        (minutes as f32 / 60.0) * self.slot_height_px
    }

    /// `round(minutes / snap) * snap`
    pub fn snap_minutes(&self, minutes: i64) -> i64 {
        let snap = self.snap_minutes as f64;
        round_half_up(minutes as f64 / snap) as i64 * self.snap_minutes
    }

    /// Snap the wall-clock minute of day, keeping the calendar date.
    ///
    /// Seconds take part in the rounding. A time that rounds up past the last
    /// slot of the day resolves to the following local midnight.
    pub fn snap_instant(&self, instant: DateTime<Local>) -> DateTime<Local> {
        let snap = self.snap_minutes as f64;
        let snapped = round_half_up(minute_of_day(instant) / snap) as i64 * self.snap_minutes;
        let midnight = instant.date_naive().and_time(NaiveTime::MIN);
        to_local(midnight + Duration::minutes(snapped))
    }

    /// True when the instant sits exactly on a snap boundary.
    pub fn is_snapped(&self, instant: DateTime<Local>) -> bool {
        let minutes = minute_of_day(instant);
        minutes.fract() == 0.0 && (minutes as i64) % self.snap_minutes == 0
    }

    /// Minutes between the grid's day start and the instant's wall clock.
    pub fn minutes_since_day_start(&self, instant: DateTime<Local>) -> f64 {
        minute_of_day(instant) - f64::from(self.day_start_hour * 60)
    }

    /// Top offset of an instant within its day column.
    pub fn offset_px_for(&self, instant: DateTime<Local>) -> f32 {
        (self.minutes_since_day_start(instant) / 60.0) as f32 * self.slot_height_px
    }
}
