// Test fixtures - reusable test data
// Provides consistent items and stores across integration tests

#![allow(dead_code)]

use chrono::{DateTime, Local, TimeZone};
use schedule_drag::drag::{ColumnLayout, OriginVisual};
use schedule_drag::models::item::ScheduledItem;
use schedule_drag::services::database::Database;
use schedule_drag::services::item::ItemService;
use schedule_drag::services::record_store::SqliteRecordStore;
use tempfile::TempDir;

/// Sample instants for testing
pub mod dates {
    use super::*;

    /// Wed Jan 15, 2025 at the given wall-clock time
    pub fn jan_15(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 15, hour, minute, 0).unwrap()
    }

    /// The given day of January 2025
    pub fn january(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, day, hour, minute, 0).unwrap()
    }
}

/// Layout helpers matching a 7-day week view 700px wide
pub mod layout {
    use super::*;

    pub fn week() -> ColumnLayout {
        ColumnLayout::new(700.0, 7)
    }

    /// Origin of an hour-long item at 09:00 in the Wednesday column
    pub fn wednesday_nine_am() -> OriginVisual {
        OriginVisual {
            top_px: 540.0,
            height_px: 60.0,
            column_index: 2,
        }
    }
}

/// Ids of the seeded records
pub struct Seeded {
    pub appointment: i64,
    pub tasks: Vec<i64>,
}

/// A file-backed store seeded with one appointment (09:00-10:00 on Jan 15)
/// and three "todo" tasks keyed 1, 2 and 3.
pub fn seeded_store(dir: &TempDir) -> (SqliteRecordStore, Seeded) {
    let path = dir.path().join("items.db");
    let db = Database::new(path.to_str().unwrap()).expect("Failed to create database");
    db.initialize_schema().expect("Failed to initialize schema");

    let seeded = {
        let service = ItemService::new(db.connection());
        let appointment = service
            .create(ScheduledItem::timed("Client call", dates::jan_15(9, 0), dates::jan_15(10, 0)).unwrap())
            .unwrap()
            .id
            .unwrap();
        let tasks = ["Draft proposal", "Send quote", "Follow up"]
            .iter()
            .enumerate()
            .map(|(i, title)| {
                service
                    .create(ScheduledItem::ordered(*title, "todo", i as f64 + 1.0).unwrap())
                    .unwrap()
                    .id
                    .unwrap()
            })
            .collect();
        Seeded { appointment, tasks }
    };

    (SqliteRecordStore::new(db), seeded)
}

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
