//! Calendar primitives shared by the period generator and the status evaluator.
//!
//! Everything here is zone-aware: day boundaries are resolved in the caller's
//! IANA timezone, never by adding fixed 24-hour spans. No function in this
//! module reads the system clock except [`now_in`], which exists for callers
//! that want "now" as their reference instant.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{PeriodicityError, Result};

/// How far to walk away from a wall-clock time that falls into a DST gap.
const GAP_SEARCH_MINUTES: i32 = 3 * 60;

// ── Parsing ─────────────────────────────────────────────────────────────────

/// Parse an IANA timezone string into `Tz`.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| PeriodicityError::InvalidTimezone(format!("'{}'", s)))
}

/// Parse an instant and express it in `tz`.
///
/// Accepts an RFC 3339 datetime with any offset, or a bare `YYYY-MM-DD` date,
/// which resolves to the start of that day in `tz`.
pub fn parse_instant(s: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(tz));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| PeriodicityError::InvalidDatetime(format!("'{}': {}", s, e)))?;
    start_of_day(date, tz)
}

/// The current instant expressed in `tz`.
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

// ── Day boundaries ──────────────────────────────────────────────────────────

/// The first instant of `date` in `tz`.
///
/// Local midnight when it exists; when a DST gap swallows midnight, the first
/// local minute after it that does.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> Result<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    resolve_local(tz, midnight, Duration::minutes(1)).ok_or_else(|| {
        PeriodicityError::Computation(format!(
            "no start of day for {} in {}",
            date,
            tz.name()
        ))
    })
}

/// The last instant of `date` in `tz` (`23:59:59.999` local).
pub fn end_of_day(date: NaiveDate, tz: &Tz) -> Result<DateTime<Tz>> {
    let last = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| PeriodicityError::Computation(format!("no end of day for {}", date)))?;
    resolve_local(tz, last, Duration::minutes(-1)).ok_or_else(|| {
        PeriodicityError::Computation(format!("no end of day for {} in {}", date, tz.name()))
    })
}

/// Map a wall-clock time to an instant, walking by `step` out of DST gaps.
///
/// Folded (ambiguous) times pick the instant on the side we are walking from:
/// earliest when walking forward, latest when walking backward.
fn resolve_local(tz: &Tz, naive: NaiveDateTime, step: Duration) -> Option<DateTime<Tz>> {
    let forward = step > Duration::zero();
    (0..=GAP_SEARCH_MINUTES).find_map(|i| {
        let candidate = naive.checked_add_signed(step * i)?;
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, latest) => {
                Some(if forward { earliest } else { latest })
            }
            LocalResult::None => None,
        }
    })
}

// ── Month arithmetic ────────────────────────────────────────────────────────

/// Number of days in a month, or `None` if the month is out of range.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (ny, nm) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?;
    let first_next = NaiveDate::from_ymd_opt(ny, nm, 1)?;
    Some(first_next.pred_opt()?.day())
}

/// Shift a `(year, month)` pair by a signed number of whole months.
pub fn shift_month(year: i32, month: u32, offset: i64) -> Option<(i32, u32)> {
    let index = (i64::from(year) * 12 + i64::from(month) - 1).checked_add(offset)?;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    Some((year, month))
}

/// `day` of the given month, clamped to the month's last day.
///
/// Jan 31 shifted into February lands on Feb 28 (or 29), never in March.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
}

// ── Tests ───────────────────────────────────────────────────────────────────
