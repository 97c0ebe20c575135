use std::fs;
use std::path::Path;

use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};

use super::StoreResult;

/// Open (or create) the database file, creating parent directories as needed,
/// and make sure the key/value table exists.
pub fn open_database(path: &Path) -> StoreResult<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode=file path={} error={}",
                path.display(),
                err
            );
            return Err(err.into());
        }
    };
    ensure_schema(&conn)?;
    info!(
        "event=store_open module=store status=ok mode=file path={}",
        path.display()
    );
    Ok(conn)
}

pub fn open_database_in_memory() -> StoreResult<Connection> {
    let conn = Connection::open_in_memory()?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Every collection lives under one key as a whole document, so a single table
/// covers the entire schema.
pub fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Raw value stored under `key`, or `None` when nothing was ever saved.
pub(crate) fn read_value(conn: &Connection, key: &str) -> StoreResult<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

/// Replace the value under `key`.
pub(crate) fn write_value(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}
