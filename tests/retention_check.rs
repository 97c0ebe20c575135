use chrono::{Duration, TimeZone};
use pretty_assertions::assert_eq;
use school_library_manager::time::{format_for_record, school_offset, Timestamp};
use school_library_manager::{
    check_retention, Book, BorrowRequest, FixedClock, RetentionReport, SqliteStore, Store,
    StoreError, StudentRecord,
};

/// Saturday 2025-03-15 08:00 school time.
fn saturday() -> Timestamp {
    school_offset()
        .with_ymd_and_hms(2025, 3, 15, 8, 0, 0)
        .unwrap()
}

fn returned_record(first: &str, returned_days_ago: i64) -> StudentRecord {
    let now = saturday();
    let book = Book::new("Noli Me Tangere", "Jose Rizal").unwrap();
    let request = BorrowRequest {
        first_name: first.into(),
        last_name: "Cruz".into(),
        grade_section: "10-A".into(),
        ..BorrowRequest::default()
    };
    let borrowed = now - Duration::days(returned_days_ago + 7);
    let mut record = StudentRecord::borrow(&request, &book, format_for_record(&borrowed)).unwrap();
    record.mark_returned(format_for_record(&(now - Duration::days(returned_days_ago))));
    record
}

#[test]
fn saturday_check_purges_and_marks_once() {
    let store = SqliteStore::open_in_memory().unwrap();
    let old = returned_record("Old", 45);
    let fresh = returned_record("Fresh", 3);
    store.save_records(&[old, fresh.clone()]).unwrap();

    let clock = FixedClock(saturday());
    assert_eq!(
        check_retention(&store, &clock).unwrap(),
        RetentionReport::Ran { removed_count: 1 }
    );
    assert_eq!(store.load_records().unwrap(), vec![fresh]);
    assert_eq!(
        store.load_last_deletion_marker().unwrap().as_deref(),
        Some("2025-03-15")
    );

    // Later the same day: already marked.
    let later = FixedClock(saturday() + Duration::hours(10));
    assert_eq!(check_retention(&store, &later).unwrap(), RetentionReport::Skipped);
}

#[test]
fn next_saturday_runs_again() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.save_last_deletion_marker("2025-03-08").unwrap();
    let clock = FixedClock(saturday());
    assert_eq!(
        check_retention(&store, &clock).unwrap(),
        RetentionReport::Ran { removed_count: 0 }
    );
}

#[test]
fn weekdays_never_touch_the_store() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.save_records(&[returned_record("Old", 90)]).unwrap();
    for days_back in 1..7 {
        let clock = FixedClock(saturday() - Duration::days(days_back));
        assert_eq!(check_retention(&store, &clock).unwrap(), RetentionReport::Skipped);
    }
    assert_eq!(store.load_records().unwrap().len(), 1);
    assert_eq!(store.load_last_deletion_marker().unwrap(), None);
}

#[test]
fn malformed_history_is_reported_and_marker_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.sqlite");
    {
        let store = SqliteStore::open(&path).unwrap();
        store
            .connection()
            .execute(
                "INSERT INTO kv (key, value) VALUES ('borrowRecords', '[{\"id\": 1}]')",
                [],
            )
            .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let clock = FixedClock(saturday());
    assert!(matches!(
        check_retention(&store, &clock),
        Err(StoreError::Malformed { .. })
    ));
    assert_eq!(store.load_last_deletion_marker().unwrap(), None);
}
