//! Catalogue and circulation actions performed from the UI. Each function is a
//! read-modify-write over whole collections in a [`Store`].

use log::info;
use thiserror::Error;

use crate::models::{Book, BorrowRequest, StudentRecord, ValidationError};
use crate::store::{Store, StoreError};
use crate::time::{format_for_record, Clock};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Please select a valid book.")]
    BookNotFound,
    #[error("Record not found.")]
    RecordNotFound,
    #[error("{0} has already been returned.")]
    AlreadyReturned(String),
}

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Add a book to the catalogue and return it.
pub fn add_book<S: Store + ?Sized>(store: &S, title: &str, author: &str) -> LibraryResult<Book> {
    let book = Book::new(title, author)?;
    let mut books = store.load_books()?;
    books.push(book.clone());
    store.save_books(&books)?;
    info!("event=book_add module=library status=ok book_id={}", book.id);
    Ok(book)
}

/// Remove a book from the catalogue. Borrow records keep their own copy of the
/// title and author, so history is unaffected.
pub fn delete_book<S: Store + ?Sized>(store: &S, id: &str) -> LibraryResult<Book> {
    let mut books = store.load_books()?;
    let index = books
        .iter()
        .position(|book| book.id == id)
        .ok_or(LibraryError::BookNotFound)?;
    let removed = books.remove(index);
    store.save_books(&books)?;
    info!("event=book_delete module=library status=ok book_id={}", removed.id);
    Ok(removed)
}

/// Open a borrow record for the requested book, stamped with the current
/// school-local time.
pub fn borrow_book<S: Store + ?Sized, C: Clock + ?Sized>(
    store: &S,
    clock: &C,
    request: &BorrowRequest,
) -> LibraryResult<StudentRecord> {
    if request.book_id.trim().is_empty() {
        return Err(ValidationError::MissingField("Book").into());
    }
    let books = store.load_books()?;
    let book = books
        .iter()
        .find(|book| book.id == request.book_id)
        .ok_or(LibraryError::BookNotFound)?;

    let record = StudentRecord::borrow(request, book, format_for_record(&clock.now()))?;
    let mut records = store.load_records()?;
    records.push(record.clone());
    store.save_records(&records)?;
    info!(
        "event=book_borrow module=library status=ok record_id={}",
        record.id
    );
    Ok(record)
}

/// Mark a borrowed record as returned now.
pub fn return_book<S: Store + ?Sized, C: Clock + ?Sized>(
    store: &S,
    clock: &C,
    record_id: &str,
) -> LibraryResult<StudentRecord> {
    let mut records = store.load_records()?;
    let record = records
        .iter_mut()
        .find(|record| record.id == record_id)
        .ok_or(LibraryError::RecordNotFound)?;

    if !record.mark_returned(format_for_record(&clock.now())) {
        return Err(LibraryError::AlreadyReturned(record.book_title.clone()));
    }
    let returned = record.clone();
    store.save_records(&records)?;
    info!(
        "event=book_return module=library status=ok record_id={}",
        returned.id
    );
    Ok(returned)
}

/// Delete one record. Returns `false` when no record had that id.
pub fn delete_record<S: Store + ?Sized>(store: &S, id: &str) -> LibraryResult<bool> {
    let mut records = store.load_records()?;
    let before = records.len();
    records.retain(|record| record.id != id);
    if records.len() == before {
        return Ok(false);
    }
    store.save_records(&records)?;
    info!("event=record_delete module=library status=ok record_id={}", id);
    Ok(true)
}

/// Records that can still be returned.
pub fn borrowed_records(records: &[StudentRecord]) -> Vec<&StudentRecord> {
    records.iter().filter(|record| !record.is_returned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::time::{school_offset, FixedClock};
    use chrono::TimeZone;

    fn clock() -> FixedClock {
        FixedClock(
            school_offset()
                .with_ymd_and_hms(2025, 3, 12, 14, 30, 0)
                .unwrap(),
        )
    }

    fn request(book_id: &str) -> BorrowRequest {
        BorrowRequest {
            first_name: "Maria".into(),
            middle_name: String::new(),
            last_name: "Cruz".into(),
            grade_section: "Grade 10 - Einstein".into(),
            book_id: book_id.into(),
        }
    }

    #[test]
    fn borrow_stamps_record_time() {
        let store = SqliteStore::open_in_memory().unwrap();
        let book = add_book(&store, "Noli Me Tangere", "Jose Rizal").unwrap();
        let record = borrow_book(&store, &clock(), &request(&book.id)).unwrap();
        assert_eq!(record.date_borrowed, "03/12/2025, 02:30 PM");
        assert_eq!(store.load_records().unwrap(), vec![record]);
    }

    #[test]
    fn borrow_requires_known_book() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = borrow_book(&store, &clock(), &request("missing")).unwrap_err();
        assert!(matches!(err, LibraryError::BookNotFound));

        let err = borrow_book(&store, &clock(), &request("")).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::Validation(ValidationError::MissingField("Book"))
        ));
    }

    #[test]
    fn return_happens_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        let book = add_book(&store, "Noli Me Tangere", "Jose Rizal").unwrap();
        let record = borrow_book(&store, &clock(), &request(&book.id)).unwrap();

        let returned = return_book(&store, &clock(), &record.id).unwrap();
        assert_eq!(returned.date_returned(), Some("03/12/2025, 02:30 PM"));
        assert!(matches!(
            return_book(&store, &clock(), &record.id),
            Err(LibraryError::AlreadyReturned(_))
        ));
        assert!(borrowed_records(&store.load_records().unwrap()).is_empty());
    }

    #[test]
    fn deleting_book_keeps_history() {
        let store = SqliteStore::open_in_memory().unwrap();
        let book = add_book(&store, "Noli Me Tangere", "Jose Rizal").unwrap();
        borrow_book(&store, &clock(), &request(&book.id)).unwrap();

        delete_book(&store, &book.id).unwrap();
        assert!(store.load_books().unwrap().is_empty());
        assert_eq!(store.load_records().unwrap()[0].book_title, "Noli Me Tangere");
        assert!(matches!(
            delete_book(&store, &book.id),
            Err(LibraryError::BookNotFound)
        ));
    }

    #[test]
    fn delete_record_reports_whether_anything_changed() {
        let store = SqliteStore::open_in_memory().unwrap();
        let book = add_book(&store, "Noli Me Tangere", "Jose Rizal").unwrap();
        let record = borrow_book(&store, &clock(), &request(&book.id)).unwrap();

        assert!(!delete_record(&store, "nope").unwrap());
        assert!(delete_record(&store, &record.id).unwrap());
        assert!(store.load_records().unwrap().is_empty());
    }
}
