//! Persistence layer. Each collection is read and replaced as a whole under a
//! fixed key; there is no partial update API. The [`Store`] trait is what the
//! library and retention code talk to, and [`SqliteStore`] backs it with an
//! embedded SQLite file.

mod books;
mod connection;
mod records;

use std::path::Path;

use log::warn;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{Book, StudentRecord};

pub use books::{fetch_books, save_books};
pub use connection::{ensure_schema, open_database, open_database_in_memory};
pub use records::{fetch_deletion_marker, fetch_records, save_deletion_marker, save_records};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored `{key}` data is unreadable: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize data: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Keyed whole-collection persistence.
pub trait Store {
    fn load_books(&self) -> StoreResult<Vec<Book>>;
    fn save_books(&self, books: &[Book]) -> StoreResult<()>;
    fn load_records(&self) -> StoreResult<Vec<StudentRecord>>;
    fn save_records(&self, records: &[StudentRecord]) -> StoreResult<()>;
    fn load_last_deletion_marker(&self) -> StoreResult<Option<String>>;
    fn save_last_deletion_marker(&self, marker: &str) -> StoreResult<()>;
}

/// [`Store`] backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_database_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for SqliteStore {
    fn load_books(&self) -> StoreResult<Vec<Book>> {
        fetch_books(&self.conn)
    }

    fn save_books(&self, books: &[Book]) -> StoreResult<()> {
        save_books(&self.conn, books)
    }

    fn load_records(&self) -> StoreResult<Vec<StudentRecord>> {
        fetch_records(&self.conn)
    }

    fn save_records(&self, records: &[StudentRecord]) -> StoreResult<()> {
        save_records(&self.conn, records)
    }

    fn load_last_deletion_marker(&self) -> StoreResult<Option<String>> {
        fetch_deletion_marker(&self.conn)
    }

    fn save_last_deletion_marker(&self, marker: &str) -> StoreResult<()> {
        save_deletion_marker(&self.conn, marker)
    }
}

/// Parse a stored JSON array, reporting which key was corrupt.
fn decode_collection<T: DeserializeOwned>(key: &'static str, raw: &str) -> StoreResult<Vec<T>> {
    serde_json::from_str(raw).map_err(|source| {
        warn!(
            "event=store_decode module=store status=error key={} error={}",
            key, source
        );
        StoreError::Malformed { key, source }
    })
}
