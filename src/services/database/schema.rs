use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_items_table(conn)?;
    run_item_migrations(conn)?;
    create_item_indexes(conn)?;
    Ok(())
}

fn create_items_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('timed', 'ordered')),
            start_datetime TEXT,
            end_datetime TEXT,
            bucket_key TEXT,
            order_key REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create items table")?;

    Ok(())
}

fn run_item_migrations(conn: &Connection) -> Result<()> {
    let version = migrations::run(conn)?;
    if version < migrations::latest_version() {
        return Err(anyhow!(
            "Item database is at v{}, expected v{}",
            version,
            migrations::latest_version()
        ));
    }
    Ok(())
}

fn create_item_indexes(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_items_bucket ON items(bucket_key, order_key)",
        [],
    )
    .context("Failed to create bucket index")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_items_start ON items(start_datetime)",
        [],
    )
    .context("Failed to create start index")?;

    Ok(())
}
