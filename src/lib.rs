//! Core library surface for the School Library Manager.
//!
//! The data core (`time`, `retention`, `search`) is pure and holds no timers;
//! `store` persists whole collections and `library` wraps the borrow/return
//! actions. The `ui` module is the terminal front-end that drives them.
pub mod config;
pub mod library;
pub mod logging;
pub mod models;
pub mod retention;
pub mod search;
pub mod store;
pub mod time;
pub mod ui;

pub use config::AppConfig;
pub use library::{
    add_book, borrow_book, borrowed_records, delete_book, delete_record, return_book,
    LibraryError,
};
pub use models::{Book, BorrowRequest, RecordStatus, StudentRecord, ValidationError};
pub use retention::{check_retention, purge, run_if_due, should_run, RetentionReport};
pub use search::search;
pub use store::{SqliteStore, Store, StoreError};
pub use time::{Clock, FixedClock, SystemClock, Timestamp};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
