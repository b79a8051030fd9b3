//! The record-store seam the mutation coordinator persists through.
//!
//! Calls are synchronous; the coordinator runs them on the tokio blocking
//! pool so a slow store never stalls pointer handling.

use std::sync::Mutex;

use thiserror::Error;

use super::database::Database;
use super::item::ItemService;
use crate::models::item::{ItemId, PositionPatch, ScheduledItem};

/// Why the record store refused or failed a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("item {0} no longer exists")]
    NotFound(ItemId),
    #[error("record store rejected the change: {0}")]
    Rejected(String),
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Backend operations the drag engine depends on.
#[cfg_attr(test, mockall::automock)]
pub trait RecordStore: Send + Sync {
    /// Merge `patch` into the stored item and return the saved record.
    fn update_position(
        &self,
        item_id: ItemId,
        patch: &PositionPatch,
    ) -> Result<ScheduledItem, PersistenceError>;

    /// Items in `bucket_key`, ascending by order key.
    fn list_siblings(&self, bucket_key: &str) -> Result<Vec<ScheduledItem>, PersistenceError>;
}

/// [`RecordStore`] backed by the SQLite item table.
pub struct SqliteRecordStore {
    db: Mutex<Database>,
}

impl SqliteRecordStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Open `path`, creating the schema if needed.
    pub fn open(path: &str) -> Result<Self, PersistenceError> {
        let db = Database::new(path).map_err(unavailable)?;
        db.initialize_schema().map_err(unavailable)?;
        Ok(Self::new(db))
    }

    /// Run `f` with the locked database.
    pub fn with_database<T>(
        &self,
        f: impl FnOnce(&Database) -> T,
    ) -> Result<T, PersistenceError> {
        let db = self
            .db
            .lock()
            .map_err(|_| PersistenceError::Unavailable("database lock poisoned".to_string()))?;
        Ok(f(&db))
    }
}

impl RecordStore for SqliteRecordStore {
    fn update_position(
        &self,
        item_id: ItemId,
        patch: &PositionPatch,
    ) -> Result<ScheduledItem, PersistenceError> {
        let saved = self.with_database(|db| {
            ItemService::new(db.connection()).update_position(item_id, patch)
        })?;

        match saved {
            Ok(Some(item)) => Ok(item),
            Ok(None) => Err(PersistenceError::NotFound(item_id)),
            Err(e) => {
                log::warn!("Record store rejected move of item {}: {:#}", item_id, e);
                Err(PersistenceError::Rejected(format!("{:#}", e)))
            }
        }
    }

    fn list_siblings(&self, bucket_key: &str) -> Result<Vec<ScheduledItem>, PersistenceError> {
        self.with_database(|db| ItemService::new(db.connection()).list_bucket(bucket_key))?
            .map_err(unavailable)
    }
}

fn unavailable(e: anyhow::Error) -> PersistenceError {
    PersistenceError::Unavailable(format!("{:#}", e))
}
