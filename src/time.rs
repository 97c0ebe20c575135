//! School-local time. Every timestamp the library shows or stores is rendered
//! in UTC+8 (Philippine time) regardless of the host's timezone or locale, so
//! records always read in local school time.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc, Weekday,
};

/// Seconds east of UTC for school-local time.
const SCHOOL_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// `MM/DD/YYYY, HH:MM AM/PM`, used for `dateBorrowed` / `dateReturned`.
const RECORD_FORMAT: &str = "%m/%d/%Y, %I:%M %p";
/// 12-hour wall clock shown in the header.
const CLOCK_FORMAT: &str = "%I:%M:%S %p";
/// 24-hour, dash separated, sorts lexicographically in chronological order.
const SORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Date-only stamp for the retention marker.
const MARKER_FORMAT: &str = "%Y-%m-%d";

/// An instant whose wall-clock fields are school-local.
pub type Timestamp = DateTime<FixedOffset>;

/// The fixed UTC+8 offset. Asia/Manila observes no daylight saving.
pub fn school_offset() -> FixedOffset {
    FixedOffset::east_opt(SCHOOL_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Re-express any instant in school-local time.
pub fn to_school_time<Tz: TimeZone>(t: &DateTime<Tz>) -> Timestamp {
    t.with_timezone(&school_offset())
}

/// Source of "now". The event loop reads it every redraw, so implementations
/// must not cache.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Host wall clock converted to school-local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        to_school_time(&Utc::now())
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Current school-local time, recomputed on every call.
pub fn current_time() -> Timestamp {
    SystemClock.now()
}

/// True iff `t` falls on a Saturday in school-local time.
pub fn is_weekly_trigger(t: &Timestamp) -> bool {
    to_school_time(t).weekday() == Weekday::Sat
}

pub fn format_clock(t: &Timestamp) -> String {
    to_school_time(t).format(CLOCK_FORMAT).to_string()
}

pub fn format_for_record(t: &Timestamp) -> String {
    to_school_time(t).format(RECORD_FORMAT).to_string()
}

pub fn format_for_sort(t: &Timestamp) -> String {
    to_school_time(t).format(SORT_FORMAT).to_string()
}

/// School-local calendar date of `t`.
pub fn school_date(t: &Timestamp) -> NaiveDate {
    to_school_time(t).date_naive()
}

pub fn format_marker(date: NaiveDate) -> String {
    date.format(MARKER_FORMAT).to_string()
}

/// Parse a persisted retention marker. Anything unreadable is treated as if no
/// marker had been stored.
pub fn parse_marker(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), MARKER_FORMAT).ok()
}

/// Read a stored stamp back into an instant. Record and sort formats are
/// interpreted as school-local wall time; RFC 3339 carries its own offset.
pub fn parse_stamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    for format in [RECORD_FORMAT, SORT_FORMAT] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return school_offset().from_local_datetime(&naive).single();
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| to_school_time(&t))
}
