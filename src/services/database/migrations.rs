use anyhow::{Context, Result};
use rusqlite::Connection;

/// One upgrade step for files written by an older build.
struct Migration {
    version: u32,
    description: &'static str,
    apply: fn(&Connection) -> Result<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "add items.order_key",
        apply: add_order_key,
    },
    Migration {
        version: 2,
        description: "key unkeyed ordered items by id",
        apply: backfill_order_keys,
    },
];

/// Highest version this build knows how to produce.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Version stored in the file's `user_version` pragma.
pub fn current_version(conn: &Connection) -> Result<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("Failed to read schema version")
}

/// Apply every step above the file's version, each in its own transaction.
///
/// Returns the version the file ends at.
pub fn run(conn: &Connection) -> Result<u32> {
    let mut version = current_version(conn)?;

    for migration in MIGRATIONS.iter().filter(move |m| m.version > version) {
        log::info!(
            "Migrating item database to v{}: {}",
            migration.version,
            migration.description
        );
        let tx = conn.unchecked_transaction()?;
        (migration.apply)(&tx)
            .with_context(|| format!("Migration v{} failed", migration.version))?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
        version = migration.version;
    }

    Ok(version)
}

/// Checks whether a column exists on a table.
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
            [table, column],
            |row| row.get(0),
        )
        .with_context(|| format!("Failed to inspect columns of {}", table))?;
    Ok(count > 0)
}

fn add_order_key(conn: &Connection) -> Result<()> {
    // Fresh files already get the column from CREATE TABLE
    if column_exists(conn, "items", "order_key")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE items ADD COLUMN order_key REAL", [])
        .context("Failed to add items.order_key")?;
    Ok(())
}

fn backfill_order_keys(conn: &Connection) -> Result<()> {
    let keyed = conn
        .execute(
            "UPDATE items SET order_key = id WHERE kind = 'ordered' AND order_key IS NULL",
            [],
        )
        .context("Failed to backfill order keys")?;
    if keyed > 0 {
        log::info!("Assigned order keys to {} ordered item(s)", keyed);
    }
    Ok(())
}
