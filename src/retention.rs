//! Weekly auto-deletion of old returned records.
//!
//! On Saturdays (school-local time) the history is pruned of `Returned`
//! records whose effective date is more than [`RETENTION_DAYS`] days old. A
//! persisted date marker keeps the purge to at most one run per calendar day,
//! so the scheduler may call [`check_retention`] as often as it likes.

use chrono::{Duration, NaiveDate};
use log::{info, warn};

use crate::models::StudentRecord;
use crate::store::{Store, StoreResult};
use crate::time::{
    format_marker, is_weekly_trigger, parse_marker, parse_stamp, school_date, Clock, Timestamp,
};

/// Returned records older than this many days are purged.
pub const RETENTION_DAYS: i64 = 30;

/// Outcome of [`purge`]: the surviving records in their original order and
/// how many were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purge {
    pub kept: Vec<StudentRecord>,
    pub removed_count: usize,
}

/// A purge that actually ran, plus the marker to persist afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionRun {
    pub kept: Vec<StudentRecord>,
    pub removed_count: usize,
    pub new_marker: NaiveDate,
}

/// What [`check_retention`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionReport {
    Skipped,
    Ran { removed_count: usize },
}

/// Due on a Saturday that has not already been marked as cleaned.
pub fn should_run(now: &Timestamp, last_marker: Option<NaiveDate>) -> bool {
    is_weekly_trigger(now) && last_marker != Some(school_date(now))
}

/// Drop `Returned` records whose effective date is strictly before
/// `now - RETENTION_DAYS`, or cannot be read at all. Borrowed records are
/// never touched.
pub fn purge(records: Vec<StudentRecord>, now: &Timestamp) -> Purge {
    let cutoff = *now - Duration::days(RETENTION_DAYS);
    let total = records.len();
    let kept: Vec<StudentRecord> = records
        .into_iter()
        .filter(|record| !is_expired(record, &cutoff))
        .collect();
    Purge {
        removed_count: total - kept.len(),
        kept,
    }
}

fn is_expired(record: &StudentRecord, cutoff: &Timestamp) -> bool {
    if !record.is_returned() {
        return false;
    }
    match parse_stamp(record.effective_date()) {
        Some(date) => date < *cutoff,
        None => {
            // A returned record that cannot be dated never ages out otherwise.
            warn!(
                "event=retention_parse module=retention status=expired record_id={} stamp={:?}",
                record.id,
                record.effective_date()
            );
            true
        }
    }
}

/// [`should_run`] followed by [`purge`]. `None` means nothing is due.
pub fn run_if_due(
    now: &Timestamp,
    last_marker: Option<NaiveDate>,
    records: Vec<StudentRecord>,
) -> Option<RetentionRun> {
    if !should_run(now, last_marker) {
        return None;
    }
    let Purge {
        kept,
        removed_count,
    } = purge(records, now);
    Some(RetentionRun {
        kept,
        removed_count,
        new_marker: school_date(now),
    })
}

/// Scheduler entry point: load, decide, purge, and persist.
///
/// Nothing is written unless a purge runs. Unreadable history surfaces as an
/// error before anything is saved, so the marker is not advanced and the next
/// check retries.
pub fn check_retention<S: Store + ?Sized, C: Clock + ?Sized>(
    store: &S,
    clock: &C,
) -> StoreResult<RetentionReport> {
    let now = clock.now();
    let last_marker = store
        .load_last_deletion_marker()?
        .as_deref()
        .and_then(parse_marker);

    if !should_run(&now, last_marker) {
        return Ok(RetentionReport::Skipped);
    }

    let records = store.load_records()?;
    let Some(run) = run_if_due(&now, last_marker, records) else {
        return Ok(RetentionReport::Skipped);
    };

    if run.removed_count > 0 {
        store.save_records(&run.kept)?;
    }
    store.save_last_deletion_marker(&format_marker(run.new_marker))?;
    info!(
        "event=retention_run module=retention status=ok removed={} kept={} marker={}",
        run.removed_count,
        run.kept.len(),
        run.new_marker
    );

    Ok(RetentionReport::Ran {
        removed_count: run.removed_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, BorrowRequest};
    use crate::time::{format_for_record, school_offset};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    /// Saturday 2025-03-15 10:00 school time.
    fn saturday() -> Timestamp {
        school_offset()
            .with_ymd_and_hms(2025, 3, 15, 10, 0, 0)
            .unwrap()
    }

    fn record(borrowed: Timestamp, returned: Option<Timestamp>) -> StudentRecord {
        let book = Book::new("Noli Me Tangere", "Jose Rizal").unwrap();
        let request = BorrowRequest {
            first_name: "Maria".into(),
            last_name: "Cruz".into(),
            grade_section: "10-A".into(),
            ..BorrowRequest::default()
        };
        let mut record =
            StudentRecord::borrow(&request, &book, format_for_record(&borrowed)).unwrap();
        if let Some(returned) = returned {
            record.mark_returned(format_for_record(&returned));
        }
        record
    }

    #[test]
    fn runs_only_on_unmarked_saturdays() {
        let now = saturday();
        assert!(should_run(&now, None));
        assert!(should_run(&now, NaiveDate::from_ymd_opt(2025, 3, 8)));
        assert!(!should_run(&now, Some(school_date(&now))));
        assert!(!should_run(&(now - Duration::days(1)), None));
    }

    #[test]
    fn purge_removes_only_expired_returned_records() {
        let now = saturday();
        let old_return = record(now - Duration::days(40), Some(now - Duration::days(31)));
        let recent_return = record(now - Duration::days(35), Some(now - Duration::days(29)));
        let old_borrow = record(now - Duration::days(100), None);

        let result = purge(
            vec![old_return, recent_return.clone(), old_borrow.clone()],
            &now,
        );
        assert_eq!(result.removed_count, 1);
        assert_eq!(result.kept, vec![recent_return, old_borrow]);
    }

    #[test]
    fn record_exactly_at_cutoff_is_kept() {
        let now = saturday();
        let at_cutoff = record(now - Duration::days(45), Some(now - Duration::days(30)));
        let result = purge(vec![at_cutoff], &now);
        assert_eq!(result.removed_count, 0);
        assert_eq!(result.kept.len(), 1);
    }

    #[test]
    fn returned_without_date_ages_by_borrow_date() {
        let now = saturday();
        let mut stale = record(now - Duration::days(60), None);
        stale.status = crate::models::RecordStatus::Returned {
            date_returned: None,
        };
        let result = purge(vec![stale], &now);
        assert_eq!(result.removed_count, 1);
    }

    #[test]
    fn undatable_returned_records_are_purged() {
        let now = saturday();
        let mut odd = record(now - Duration::days(2), Some(now - Duration::days(1)));
        odd.status = crate::models::RecordStatus::Returned {
            date_returned: Some("Invalid Date".into()),
        };
        let mut still_out = record(now - Duration::days(2), None);
        still_out.date_borrowed = "Invalid Date".into();

        let result = purge(vec![odd, still_out.clone()], &now);
        assert_eq!(result.removed_count, 1);
        assert_eq!(result.kept, vec![still_out]);
    }

    #[test]
    fn run_if_due_is_idempotent_for_the_same_day() {
        let now = saturday();
        let records = vec![record(now - Duration::days(50), Some(now - Duration::days(40)))];

        let first = run_if_due(&now, None, records.clone()).unwrap();
        assert_eq!(first.removed_count, 1);
        assert_eq!(first.new_marker, school_date(&now));

        assert_eq!(run_if_due(&now, Some(first.new_marker), first.kept), None);
    }

    #[test]
    fn not_due_on_weekdays() {
        let friday = saturday() - Duration::days(1);
        let records = vec![record(friday - Duration::days(90), Some(friday - Duration::days(80)))];
        assert_eq!(run_if_due(&friday, None, records), None);
    }
}
