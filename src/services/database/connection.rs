use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::{migrations, schema};

/// How long a save waits on a locked file before the store reports it
/// unavailable.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

const IN_MEMORY: &str = ":memory:";

/// SQLite file backing the reference record store.
///
/// Position saves run on the blocking pool while the host may read the same
/// file, so file databases use WAL and wait out short locks.
pub struct Database {
    conn: Connection,
    path: String,
}

impl Database {
    /// Open (or create) the item database at `path`. `":memory:"` gives a
    /// private in-memory database.
    ///
    /// # Examples
    /// ```
    /// use schedule_drag::services::database::Database;
    /// let db = Database::new(":memory:").unwrap();
    /// assert!(db.is_in_memory());
    /// ```
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open item database at {}", path))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;

        let db = Self {
            conn,
            path: path.to_string(),
        };
        if !db.is_in_memory() {
            let mode: String = db
                .conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                .context("Failed to switch item database to WAL")?;
            log::debug!("Item database {} opened in {} mode", path, mode);
        }
        Ok(db)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }

    /// Create the items table and bring an older file up to date.
    pub fn initialize_schema(&self) -> Result<()> {
        schema::initialize_schema(&self.conn)
    }

    /// Migration level recorded in the file.
    pub fn schema_version(&self) -> Result<u32> {
        migrations::current_version(&self.conn)
    }
}
