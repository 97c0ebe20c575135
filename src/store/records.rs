use rusqlite::Connection;

use super::connection::{read_value, write_value};
use super::{decode_collection, StoreError, StoreResult};
use crate::models::StudentRecord;

/// Key the borrow history is stored under.
pub(crate) const RECORDS_KEY: &str = "borrowRecords";
/// Key holding the date the last retention purge ran.
pub(crate) const MARKER_KEY: &str = "lastDeletionDate";

/// Load every borrow record in stored order. Missing history is empty.
pub fn fetch_records(conn: &Connection) -> StoreResult<Vec<StudentRecord>> {
    match read_value(conn, RECORDS_KEY)? {
        Some(raw) => decode_collection(RECORDS_KEY, &raw),
        None => Ok(Vec::new()),
    }
}

/// Replace the stored history with `records`.
pub fn save_records(conn: &Connection, records: &[StudentRecord]) -> StoreResult<()> {
    let raw = serde_json::to_string(records).map_err(StoreError::Serialize)?;
    write_value(conn, RECORDS_KEY, &raw)
}

pub fn fetch_deletion_marker(conn: &Connection) -> StoreResult<Option<String>> {
    read_value(conn, MARKER_KEY)
}

pub fn save_deletion_marker(conn: &Connection, marker: &str) -> StoreResult<()> {
    write_value(conn, MARKER_KEY, marker)
}
