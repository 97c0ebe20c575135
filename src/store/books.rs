use rusqlite::Connection;

use super::connection::{read_value, write_value};
use super::{decode_collection, StoreError, StoreResult};
use crate::models::Book;

/// Key the book catalogue is stored under.
pub(crate) const BOOKS_KEY: &str = "books";

/// Load the whole catalogue. A catalogue that was never saved is empty.
pub fn fetch_books(conn: &Connection) -> StoreResult<Vec<Book>> {
    match read_value(conn, BOOKS_KEY)? {
        Some(raw) => decode_collection(BOOKS_KEY, &raw),
        None => Ok(Vec::new()),
    }
}

/// Replace the stored catalogue with `books`.
pub fn save_books(conn: &Connection, books: &[Book]) -> StoreResult<()> {
    let raw = serde_json::to_string(books).map_err(StoreError::Serialize)?;
    write_value(conn, BOOKS_KEY, &raw)
}
