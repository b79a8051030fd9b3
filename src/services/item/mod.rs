//! Scheduled item service entry point.
//! Provides database-backed operations for the reference record store,
//! organized across focused submodules.

use rusqlite::Connection;

pub mod crud;
pub mod queries;
mod shared;

/// Service for managing scheduled items stored in SQLite.
pub struct ItemService<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> ItemService<'a> {
    /// Create a new ItemService with a database connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}
