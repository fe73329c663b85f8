//! Period generation: turn a periodicity rule into a contiguous timeline.
//!
//! Each recurrence of the rule becomes one period whose deadline is the end
//! of the recurrence day. The period nominally starts `duration_days` before
//! the recurrence; neighbouring periods are then stitched so the timeline has
//! no gaps and no overlaps:
//!
//! - a period whose lookback reaches into its predecessor is clipped to start
//!   where the predecessor ends;
//! - a period whose lookback leaves a gap extends its predecessor up to its
//!   own start.
//!
//! Only the very first generated period keeps its full nominal length, which
//! is why generation covers more cycles than the caller asks for and then
//! slices a window out of the middle.
//!
//! ```
//! use periodicity_engine::{generate_periods, parse_instant, PeriodicityRule, YearlyOccurrence};
//! use chrono_tz::Tz;
//!
//! let rule = PeriodicityRule::Yearly {
//!     occurrences: vec![YearlyOccurrence { month: 6, date: 15 }],
//! };
//! let now = parse_instant("2022-07-01", &Tz::UTC).unwrap();
//! let window = generate_periods(&rule, 15, 1, 2, &now).unwrap();
//!
//! assert_eq!(window.periods.len(), 4);
//! assert_eq!(window.active_period_index, 1);
//! assert_eq!(window.active().to_string(), "2022-05-31 / 2023-05-31 :: 2022-06-15");
//! ```

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, warn};

use crate::calendar::{end_of_day, start_of_day};
use crate::error::{PeriodicityError, Result};
use crate::rule::PeriodicityRule;

/// Extra cycles generated before the requested window.
const CYCLES_BEFORE_MARGIN: i64 = 1;
/// Extra cycles generated after the requested window.
const CYCLES_AFTER_MARGIN: i64 = 3;

// ── Interval ────────────────────────────────────────────────────────────────

/// A half-open range `[start, end)` in a single timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Interval {
    /// Build an interval, rejecting `start > end`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
        if start > end {
            return Err(PeriodicityError::InvalidInterval {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Whether `instant` lies in `[start, end)`, whatever zone it is expressed in.
    pub fn contains<T: TimeZone>(&self, instant: &DateTime<T>) -> bool {
        let instant = instant.with_timezone(&Utc);
        self.start.with_timezone(&Utc) <= instant && instant < self.end.with_timezone(&Utc)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// ── Period ──────────────────────────────────────────────────────────────────

/// One entry of a generated timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub interval: Interval,
    /// The deadline this period targets: the last instant of the recurrence day.
    pub occurrence: DateTime<Tz>,
}

impl Period {
    pub fn new(interval: Interval, occurrence: DateTime<Tz>) -> Self {
        Self {
            interval,
            occurrence,
        }
    }
}

impl fmt::Display for Period {
    /// `start / end :: occurrence`, each as `yyyy-mm-dd`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} :: {}",
            self.interval.start.format("%Y-%m-%d"),
            self.interval.end.format("%Y-%m-%d"),
            self.occurrence.format("%Y-%m-%d")
        )
    }
}

/// A slice of the timeline around a reference instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodicityWindow {
    /// Chronologically ascending, contiguous periods.
    pub periods: Vec<Period>,
    /// Index of the period containing the reference instant.
    pub active_period_index: usize,
}

impl PeriodicityWindow {
    /// The period containing the reference instant.
    ///
    /// # Panics
    ///
    /// If `active_period_index` is out of bounds for `periods`, which only
    /// happens for a window assembled by hand.
    pub fn active(&self) -> &Period {
        &self.periods[self.active_period_index]
    }
}

// ── Options ─────────────────────────────────────────────────────────────────

/// Window shape for [`generate_periods_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOptions {
    /// Days to look back from each recurrence to form its period's start.
    pub duration_days: u32,
    /// Whole periods to return before the active one.
    pub previous_count: usize,
    /// Whole periods to return after the active one.
    pub next_count: usize,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            duration_days: 0,
            previous_count: 1,
            next_count: 0,
        }
    }
}

// ── generate_periods ────────────────────────────────────────────────────────

/// Generate the window of periods around `reference`.
///
/// # Arguments
///
/// * `rule`: The periodicity rule to expand
/// * `duration_days`: Lookback from each recurrence to its period's nominal start
/// * `previous_count`: Whole periods wanted before the one containing `reference`
/// * `next_count`: Whole periods wanted after the one containing `reference`
/// * `reference`: The "now" anchor; periods are produced in its timezone
///
/// # Returns
///
/// A [`PeriodicityWindow`] of `previous_count + 1 + next_count` contiguous
/// periods with `active_period_index == previous_count`.
///
/// # Errors
///
/// Configuration errors when the rule has no or out-of-range occurrences;
/// [`PeriodicityError::InvalidInterval`] or [`PeriodicityError::Computation`]
/// when the stitched timeline cannot be built.
pub fn generate_periods(
    rule: &PeriodicityRule,
    duration_days: u32,
    previous_count: usize,
    next_count: usize,
    reference: &DateTime<Tz>,
) -> Result<PeriodicityWindow> {
    generate_periods_with_options(
        rule,
        &WindowOptions {
            duration_days,
            previous_count,
            next_count,
        },
        reference,
    )
}

/// Generate the window of periods around `reference` with options.
///
/// See [`generate_periods`].
pub fn generate_periods_with_options(
    rule: &PeriodicityRule,
    options: &WindowOptions,
    reference: &DateTime<Tz>,
) -> Result<PeriodicityWindow> {
    rule.validate()?;
    let tz = reference.timezone();

    let recurrences = recurrence_days(rule, options, reference.date_naive())?;
    let bounds = stitch(&recurrences, options.duration_days)?;

    let mut timeline = Vec::with_capacity(recurrences.len());
    for (recurrence, (start, end)) in recurrences.iter().zip(bounds) {
        let start = start_of_day(start, &tz)?;
        let end = start_of_day(end, &tz)?;
        let interval = Interval::new(start, end).inspect_err(|e| {
            warn!(recurrence = %recurrence, error = %e, "stitched period is not chronological");
        })?;
        timeline.push(Period::new(interval, end_of_day(*recurrence, &tz)?));
    }

    let active = timeline
        .iter()
        .take_while(|p| p.interval.start <= *reference)
        .count()
        .checked_sub(1)
        .ok_or_else(|| {
            PeriodicityError::Computation(format!(
                "no generated period starts at or before {}",
                reference.to_rfc3339()
            ))
        })?;

    let first = active.checked_sub(options.previous_count);
    let last = active.checked_add(options.next_count);
    let (first, last) = match (first, last) {
        (Some(first), Some(last)) if last < timeline.len() => (first, last),
        _ => {
            return Err(PeriodicityError::Computation(format!(
                "window of {} previous and {} next periods around index {} exceeds {} generated periods",
                options.previous_count,
                options.next_count,
                active,
                timeline.len()
            )));
        }
    };

    let periods: Vec<Period> = timeline[first..=last].to_vec();
    debug!(
        kind = rule.kind(),
        occurrences = rule.occurrence_count(),
        duration_days = options.duration_days,
        generated = timeline.len(),
        active = %periods[options.previous_count],
        "generated periodicity window"
    );

    Ok(PeriodicityWindow {
        periods,
        active_period_index: options.previous_count,
    })
}

// ── Internal helpers ────────────────────────────────────────────────────────

/// Every recurrence day in the generated range, strictly ascending.
///
/// Covers `previous_count + 1` cycles before the reference cycle and
/// `next_count + 3` after it. Days that coincide after month-end clamping
/// collapse into one.
fn recurrence_days(
    rule: &PeriodicityRule,
    options: &WindowOptions,
    reference: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    let anchors = rule.anchors(reference);
    let back = cycle_span(options.previous_count, CYCLES_BEFORE_MARGIN, "previous")?;
    let forward = cycle_span(options.next_count, CYCLES_AFTER_MARGIN, "next")?;
    let step = rule.cycle_months();
    let months = |cycle: i64| {
        cycle.checked_mul(step).ok_or_else(|| {
            PeriodicityError::Computation(format!("{} cycles of {} months overflow", cycle, step))
        })
    };

    // Both ends of the range must be representable before anything is generated.
    if let (Some(first), Some(last)) = (anchors.first(), anchors.last()) {
        first.shifted(months(-back)?)?;
        last.shifted(months(forward)?)?;
    }

    let mut days: Vec<NaiveDate> = Vec::new();
    for cycle in -back..=forward {
        for anchor in &anchors {
            let day = anchor.shifted(months(cycle)?)?;
            if days.last() != Some(&day) {
                days.push(day);
            }
        }
    }
    Ok(days)
}

/// Cycles to generate on one side of the reference: `count` plus its margin.
fn cycle_span(count: usize, margin: i64, side: &str) -> Result<i64> {
    i64::try_from(count)
        .ok()
        .and_then(|c| c.checked_add(margin))
        .ok_or_else(|| {
            PeriodicityError::Computation(format!(
                "{} count {} is out of range",
                side, count
            ))
        })
}

/// Final `[start, end)` days for each recurrence.
///
/// Computed by index rather than by revisiting earlier entries: a period
/// starts at its nominal start or its predecessor's recurrence, whichever is
/// later, and ends where its successor starts. The last period ends on its
/// own recurrence day.
fn stitch(recurrences: &[NaiveDate], duration_days: u32) -> Result<Vec<(NaiveDate, NaiveDate)>> {
    let lookback = Days::new(u64::from(duration_days));
    let starts = recurrences
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let nominal = day.checked_sub_days(lookback).ok_or_else(|| {
                PeriodicityError::Computation(format!(
                    "{} minus {} days is not representable",
                    day, duration_days
                ))
            })?;
            Ok(match i.checked_sub(1) {
                Some(prev) => nominal.max(recurrences[prev]),
                None => nominal,
            })
        })
        .collect::<Result<Vec<NaiveDate>>>()?;

    Ok(starts
        .iter()
        .enumerate()
        .map(|(i, start)| {
            let end = starts.get(i + 1).copied().unwrap_or(recurrences[i]);
            (*start, end)
        })
        .collect())
}

// ── Tests ───────────────────────────────────────────────────────────────────
