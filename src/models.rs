//! Domain models for books and borrow records. These stay light-weight data
//! holders; the `store` module persists them and the `ui` module renders them.
//!
//! The JSON shape produced by serde mirrors the keyed collections the library
//! has always stored (camelCase fields, flat `status` string, optional
//! `dateReturned`), while the in-memory status is a closed variant so a
//! borrowed record can never carry a return date.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Rejected input when constructing a domain value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    MissingField(&'static str),
}

/// Trim `value` and reject it when nothing is left.
fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A catalogued book. Borrow records copy the title and author at borrow time,
/// so deleting a book never rewrites history.
pub struct Book {
    /// Opaque identifier assigned on creation.
    pub id: String,
    pub title: String,
    pub author: String,
}

impl Book {
    /// Validate and create a new catalogue entry with a fresh id.
    pub fn new(title: &str, author: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: new_id(),
            title: required(title, "Title")?,
            author: required(author, "Author")?,
        })
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.author)
    }
}

/// Lifecycle of a borrow record. A record moves from `Borrowed` to `Returned`
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    Borrowed,
    /// `date_returned` is only `None` when persisted data was hand-edited or
    /// corrupted; records returned through [`StudentRecord::mark_returned`]
    /// always carry it.
    Returned { date_returned: Option<String> },
}

impl RecordStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RecordStatus::Borrowed => "Borrowed",
            RecordStatus::Returned { .. } => "Returned",
        }
    }
}

/// Student identity and book selection captured by the borrow form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorrowRequest {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub grade_section: String,
    pub book_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredRecord", into = "StoredRecord")]
/// One borrow transaction.
pub struct StudentRecord {
    pub id: String,
    pub first_name: String,
    /// Empty when the student has no middle name.
    pub middle_name: String,
    pub last_name: String,
    pub grade_section: String,
    pub book_title: String,
    pub book_author: String,
    /// Record-format stamp (`MM/DD/YYYY, HH:MM AM/PM`, UTC+8).
    pub date_borrowed: String,
    pub status: RecordStatus,
}

impl StudentRecord {
    /// Open a new borrow record for `book`, stamped with `date_borrowed`.
    pub fn borrow(
        request: &BorrowRequest,
        book: &Book,
        date_borrowed: String,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: new_id(),
            first_name: required(&request.first_name, "First name")?,
            middle_name: request.middle_name.trim().to_string(),
            last_name: required(&request.last_name, "Last name")?,
            grade_section: required(&request.grade_section, "Grade & section")?,
            book_title: book.title.clone(),
            book_author: book.author.clone(),
            date_borrowed,
            status: RecordStatus::Borrowed,
        })
    }

    /// Transition to `Returned`. Returns `false` without touching the record
    /// when it was already returned.
    pub fn mark_returned(&mut self, date_returned: String) -> bool {
        if self.is_returned() {
            return false;
        }
        self.status = RecordStatus::Returned {
            date_returned: Some(date_returned),
        };
        true
    }

    pub fn is_returned(&self) -> bool {
        matches!(self.status, RecordStatus::Returned { .. })
    }

    pub fn date_returned(&self) -> Option<&str> {
        match &self.status {
            RecordStatus::Returned { date_returned } => date_returned.as_deref(),
            RecordStatus::Borrowed => None,
        }
    }

    /// The stamp retention ages a record by: the return date when present,
    /// otherwise the borrow date.
    pub fn effective_date(&self) -> &str {
        self.date_returned().unwrap_or(&self.date_borrowed)
    }

    /// `"{first} {middle} {last}"`. The middle slot is kept even when empty,
    /// which leaves a double space; search relies on this exact shape.
    pub fn full_name(&self) -> String {
        format!(
            "{} {} {}",
            self.first_name, self.middle_name, self.last_name
        )
    }

    /// Name for lists and status messages, without the double space.
    pub fn display_name(&self) -> String {
        if self.middle_name.trim().is_empty() {
            format!("{} {}", self.first_name, self.last_name)
        } else {
            format!("{} {} {}", self.first_name, self.middle_name, self.last_name)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum StoredStatus {
    Borrowed,
    Returned,
}

/// Flat persisted shape of a [`StudentRecord`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    id: String,
    first_name: String,
    #[serde(default)]
    middle_name: String,
    last_name: String,
    grade_section: String,
    book_title: String,
    book_author: String,
    date_borrowed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_returned: Option<String>,
    status: StoredStatus,
}

impl From<StoredRecord> for StudentRecord {
    fn from(stored: StoredRecord) -> Self {
        let status = match stored.status {
            StoredStatus::Borrowed => RecordStatus::Borrowed,
            StoredStatus::Returned => RecordStatus::Returned {
                date_returned: stored.date_returned,
            },
        };
        Self {
            id: stored.id,
            first_name: stored.first_name,
            middle_name: stored.middle_name,
            last_name: stored.last_name,
            grade_section: stored.grade_section,
            book_title: stored.book_title,
            book_author: stored.book_author,
            date_borrowed: stored.date_borrowed,
            status,
        }
    }
}

impl From<StudentRecord> for StoredRecord {
    fn from(record: StudentRecord) -> Self {
        let (status, date_returned) = match record.status {
            RecordStatus::Borrowed => (StoredStatus::Borrowed, None),
            RecordStatus::Returned { date_returned } => (StoredStatus::Returned, date_returned),
        };
        Self {
            id: record.id,
            first_name: record.first_name,
            middle_name: record.middle_name,
            last_name: record.last_name,
            grade_section: record.grade_section,
            book_title: record.book_title,
            book_author: record.book_author,
            date_borrowed: record.date_borrowed,
            date_returned,
            status,
        }
    }
}
