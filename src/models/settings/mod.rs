// Settings module
// Time grid and ordering parameters shared by every drag session

use serde::{Deserialize, Serialize};

/// Process-wide drag/snap configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Pixel height of one hour on the time axis
    pub slot_height_px: f32,
    /// Minimum granularity of committed times, in minutes
    pub snap_minutes: i64,
    /// Hour shown at the top of the time grid
    pub day_start_hour: u32,
    /// Preview label format: "24h" or "12h"
    pub time_format: String,
    /// Smallest gap between adjacent order keys before a bucket is renumbered
    pub renormalize_threshold: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            slot_height_px: 60.0,
            snap_minutes: 15,
            day_start_hour: 0,
            time_format: "24h".to_string(),
            renormalize_threshold: 1e-6,
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !self.slot_height_px.is_finite() || self.slot_height_px <= 0.0 {
            return Err("Slot height must be a positive number of pixels".to_string());
        }

        if !(1..=60).contains(&self.snap_minutes) || 1440 % self.snap_minutes != 0 {
            return Err("Snap increment must be between 1 and 60 minutes and divide a day evenly".to_string());
        }

        if self.day_start_hour >= 24 {
            return Err("Day start hour must be between 0 and 23".to_string());
        }

        if self.time_format != "12h" && self.time_format != "24h" {
            return Err("Time format must be '12h' or '24h'".to_string());
        }

        if !self.renormalize_threshold.is_finite() || self.renormalize_threshold <= 0.0 {
            return Err("Renormalize threshold must be positive".to_string());
        }

        Ok(())
    }

    pub fn uses_12h_clock(&self) -> bool {
        self.time_format == "12h"
    }
}
