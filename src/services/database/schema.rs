use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_collections_table(conn)?;
    run_collection_migrations(conn)?;
    Ok(())
}

fn create_collections_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS collections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            location TEXT,
            attributes TEXT NOT NULL DEFAULT '0 0 0 0',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create collections table")?;

    Ok(())
}

/// Columns added after the first release of the table.
fn run_collection_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "collections",
        "compatibility",
        "ALTER TABLE collections ADD COLUMN compatibility TEXT NOT NULL DEFAULT '8 -1'",
    )?;

    Ok(())
}
