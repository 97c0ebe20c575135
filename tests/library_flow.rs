use chrono::TimeZone;
use pretty_assertions::assert_eq;
use school_library_manager::time::school_offset;
use school_library_manager::{
    add_book, borrow_book, borrowed_records, delete_record, return_book, search, BorrowRequest,
    FixedClock, LibraryError, RecordStatus, SqliteStore, Store, ValidationError,
};

fn clock() -> FixedClock {
    FixedClock(
        school_offset()
            .with_ymd_and_hms(2025, 6, 2, 7, 45, 0)
            .unwrap(),
    )
}

fn request(first: &str, middle: &str, last: &str, book_id: &str) -> BorrowRequest {
    BorrowRequest {
        first_name: first.into(),
        middle_name: middle.into(),
        last_name: last.into(),
        grade_section: "Grade 7 - Mabini".into(),
        book_id: book_id.into(),
    }
}

#[test]
fn records_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("library.sqlite");

    let (borrowed, returned) = {
        let store = SqliteStore::open(&path).unwrap();
        let book = add_book(&store, "Noli Me Tangere", "Jose Rizal").unwrap();
        let borrowed = borrow_book(&store, &clock(), &request("Maria", "", "Cruz", &book.id)).unwrap();
        let other = borrow_book(&store, &clock(), &request("Jose", "Protasio", "Rizal", &book.id)).unwrap();
        let returned = return_book(&store, &clock(), &other.id).unwrap();
        (borrowed, returned)
    };

    let store = SqliteStore::open(&path).unwrap();
    let records = store.load_records().unwrap();
    assert_eq!(records, vec![borrowed.clone(), returned.clone()]);
    assert_eq!(records[0].middle_name, "");
    assert_eq!(records[0].date_returned(), None);
    assert_eq!(
        records[1].status,
        RecordStatus::Returned {
            date_returned: Some("06/02/2025, 07:45 AM".into())
        }
    );
    assert_eq!(borrowed_records(&records), vec![&borrowed]);
}

#[test]
fn history_search_and_delete() {
    let store = SqliteStore::open_in_memory().unwrap();
    let book = add_book(&store, "Ibong Adarna", "Unknown").unwrap();
    let maria = borrow_book(&store, &clock(), &request("Maria", "", "Cruz", &book.id)).unwrap();
    let jose = borrow_book(&store, &clock(), &request("Jose", "", "Rizal", &book.id)).unwrap();

    let records = store.load_records().unwrap();
    assert_eq!(search("maria", &records), vec![maria.clone()]);
    assert_eq!(search("cruz rizal", &records), vec![maria.clone(), jose.clone()]);
    assert!(search(" ", &records).is_empty());

    assert!(delete_record(&store, &maria.id).unwrap());
    assert_eq!(store.load_records().unwrap(), vec![jose]);
}

#[test]
fn blank_student_fields_are_rejected_before_saving() {
    let store = SqliteStore::open_in_memory().unwrap();
    let book = add_book(&store, "Ibong Adarna", "Unknown").unwrap();
    let err = borrow_book(&store, &clock(), &request("Maria", "", "  ", &book.id)).unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Validation(ValidationError::MissingField("Last name"))
    ));
    assert!(store.load_records().unwrap().is_empty());

    let err = add_book(&store, "", "Someone").unwrap_err();
    assert_eq!(err.to_string(), "Title is required.");
}
