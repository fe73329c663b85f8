//! # periodicity-engine
//!
//! Deterministic inspection-period computation.
//!
//! Given a yearly or monthly periodicity rule, the engine lays out a
//! contiguous timeline of periods, each ending at a recurrence deadline,
//! finds the period containing a reference instant, and classifies check-ins
//! against a period as on time, late, or missed. Every function is pure: the
//! caller supplies "now", and nothing is cached between calls.
//!
//! ## Modules
//!
//! - [`rule`]: Periodicity rules (yearly/monthly occurrences) and their JSON form
//! - [`period`]: Period generation, stitching and window slicing
//! - [`status`]: Check-in evaluation against a period
//! - [`calendar`]: Zone-aware day boundaries, month arithmetic and parsing
//! - [`error`]: Error types

pub mod calendar;
pub mod error;
pub mod period;
pub mod rule;
pub mod status;

pub use calendar::{now_in, parse_instant, parse_timezone};
pub use error::PeriodicityError;
pub use period::{
    generate_periods, generate_periods_with_options, Interval, Period, PeriodicityWindow,
    WindowOptions,
};
pub use rule::{MonthlyOccurrence, PeriodicityRule, YearlyOccurrence};
pub use status::{
    period_report, period_status, CheckIn, Executed, PeriodReport, PeriodStatus, Remark,
};
