//! Periodicity rules: the declarative recurrence a period timeline is built from.
//!
//! A rule is either yearly (fixed month and day) or monthly (fixed day every
//! month) and carries one or more occurrences. The JSON shape is the one the
//! rules are stored in:
//!
//! ```
//! use periodicity_engine::PeriodicityRule;
//!
//! let rule = PeriodicityRule::from_json(
//!     r#"{"type":"yearly","occurrences":[{"month":6,"date":15}]}"#,
//! ).unwrap();
//! assert_eq!(rule.kind(), "yearly");
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{clamped_date, days_in_month, shift_month};
use crate::error::{PeriodicityError, Result};

/// Leap year used to decide whether a yearly month/day exists at all.
const LEAP_YEAR: i32 = 2024;

/// A yearly occurrence: the same month and day every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyOccurrence {
    /// Month of year, 1-12.
    pub month: u32,
    /// Day of month.
    pub date: u32,
}

/// A monthly occurrence: the same day every month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyOccurrence {
    /// Day of month. Days past the end of a short month clamp to its last day.
    pub date: u32,
}

/// A recurrence rule, stored as `{"type": "yearly" | "monthly", "occurrences": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PeriodicityRule {
    Yearly { occurrences: Vec<YearlyOccurrence> },
    Monthly { occurrences: Vec<MonthlyOccurrence> },
}

/// One occurrence placed in a concrete cycle, before day clamping.
///
/// Ordering is chronological within a cycle: month first, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Anchor {
    year: i32,
    month: u32,
    day: u32,
}

impl Anchor {
    /// The recurrence day `months` months away from this anchor.
    pub(crate) fn shifted(&self, months: i64) -> Result<NaiveDate> {
        shift_month(self.year, self.month, months)
            .and_then(|(year, month)| clamped_date(year, month, self.day))
            .ok_or_else(|| {
                PeriodicityError::Computation(format!(
                    "recurrence {}-{:02}-{:02} shifted by {} months is not representable",
                    self.year, self.month, self.day, months
                ))
            })
    }
}

impl PeriodicityRule {
    /// Parse a rule from its stored JSON form.
    ///
    /// Unknown `type` values and malformed documents are configuration errors.
    pub fn from_json(json: &str) -> Result<Self> {
        let rule: PeriodicityRule = serde_json::from_str(json)
            .map_err(|e| PeriodicityError::InvalidRule(e.to_string()))?;
        rule.validate()?;
        Ok(rule)
    }

    /// `"yearly"` or `"monthly"`.
    pub fn kind(&self) -> &'static str {
        match self {
            PeriodicityRule::Yearly { .. } => "yearly",
            PeriodicityRule::Monthly { .. } => "monthly",
        }
    }

    pub fn occurrence_count(&self) -> usize {
        match self {
            PeriodicityRule::Yearly { occurrences } => occurrences.len(),
            PeriodicityRule::Monthly { occurrences } => occurrences.len(),
        }
    }

    /// Length of one recurrence cycle in months.
    pub fn cycle_months(&self) -> i64 {
        match self {
            PeriodicityRule::Yearly { .. } => 12,
            PeriodicityRule::Monthly { .. } => 1,
        }
    }

    /// Check that the rule can produce a timeline.
    ///
    /// # Errors
    ///
    /// [`PeriodicityError::MissingOccurrences`] when there are no occurrences,
    /// [`PeriodicityError::InvalidOccurrence`] when a month or day is out of
    /// range. Yearly days must exist in their month in a leap year, so Feb 29
    /// is accepted and Apr 31 is not.
    pub fn validate(&self) -> Result<()> {
        if self.occurrence_count() == 0 {
            return Err(PeriodicityError::MissingOccurrences);
        }
        match self {
            PeriodicityRule::Yearly { occurrences } => {
                for occ in occurrences {
                    let last = days_in_month(LEAP_YEAR, occ.month).ok_or_else(|| {
                        PeriodicityError::InvalidOccurrence(format!(
                            "month {} is not in 1-12",
                            occ.month
                        ))
                    })?;
                    if occ.date == 0 || occ.date > last {
                        return Err(PeriodicityError::InvalidOccurrence(format!(
                            "day {} does not exist in month {}",
                            occ.date, occ.month
                        )));
                    }
                }
            }
            PeriodicityRule::Monthly { occurrences } => {
                if let Some(occ) = occurrences.iter().find(|o| o.date == 0 || o.date > 31) {
                    return Err(PeriodicityError::InvalidOccurrence(format!(
                        "day {} is not in 1-31",
                        occ.date
                    )));
                }
            }
        }
        Ok(())
    }

    /// The rule's occurrences placed in the cycle containing `reference`, ascending.
    pub(crate) fn anchors(&self, reference: NaiveDate) -> Vec<Anchor> {
        let year = reference.year();
        let mut anchors: Vec<Anchor> = match self {
            PeriodicityRule::Yearly { occurrences } => occurrences
                .iter()
                .map(|o| Anchor {
                    year,
                    month: o.month,
                    day: o.date,
                })
                .collect(),
            PeriodicityRule::Monthly { occurrences } => occurrences
                .iter()
                .map(|o| Anchor {
                    year,
                    month: reference.month(),
                    day: o.date,
                })
                .collect(),
        };
        anchors.sort();
        anchors
    }
}
