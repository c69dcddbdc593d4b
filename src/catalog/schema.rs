/*!
 * SQLite schema for local catalog stores.
 *
 * Production catalogs live in MySQL and their schema is managed elsewhere.
 * A SQLite store is created on demand with the same two tables and the same
 * uniqueness keys, so the upsert statements behave identically.
 */

use log::{debug, info};
use rusqlite::Connection;

use super::store::TableNames;
use crate::errors::DataAccessError;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection, tables: &TableNames) -> Result<(), DataAccessError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing catalog schema v{}", SCHEMA_VERSION);
        create_all_tables(conn, tables)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else {
        // Table names are configurable, so a known file may still lack them
        debug!("Catalog schema is at v{}", current_version);
        create_all_tables(conn, tables)?;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32, DataAccessError> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .map_err(|e| DataAccessError::query("check schema version", e))?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), DataAccessError> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )
    .map_err(|e| DataAccessError::query("set schema version", e))?;
    Ok(())
}

fn create_all_tables(conn: &Connection, tables: &TableNames) -> Result<(), DataAccessError> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS {flat} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sku TEXT NOT NULL,
            product_id INTEGER NOT NULL,
            locale TEXT NOT NULL,
            channel TEXT,
            name TEXT,
            description TEXT,
            short_description TEXT,
            UNIQUE (sku, locale)
        );

        CREATE INDEX IF NOT EXISTS idx_{flat}_locale ON {flat}(locale);

        CREATE TABLE IF NOT EXISTS {attributes} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL,
            attribute_id INTEGER NOT NULL,
            locale TEXT NOT NULL,
            channel TEXT,
            text_value TEXT,
            UNIQUE (product_id, attribute_id, locale)
        );
        "#,
        flat = tables.flat,
        attributes = tables.attribute_values,
    );

    conn.execute_batch(&ddl)
        .map_err(|e| DataAccessError::query("create catalog tables", e))?;

    Ok(())
}
