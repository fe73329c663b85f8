//! Status evaluation: was a period's obligation met, and when?
//!
//! Check-ins are matched against a period's half-open interval. Any check-in
//! at or before the period's deadline makes the period `on_time`; check-ins
//! only after it make it `late`; none at all make it `missed`.
//!
//! Remark codes are owned by whoever stores the check-ins, so the evaluator is
//! generic over them. [`Remark`] is the vocabulary used by the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::period::{Period, PeriodicityWindow};

/// Remark codes a check-in can carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remark {
    Workorder,
    PoliceReport,
    ErrorReport,
    /// Any code this build does not know about, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

/// An event evidencing work on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn<R = Remark> {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<R>,
}

impl<R> CheckIn<R> {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            result: None,
        }
    }

    pub fn with_result(timestamp: DateTime<Utc>, result: R) -> Self {
        Self {
            timestamp,
            result: Some(result),
        }
    }
}

/// How a period's obligation was met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Executed {
    OnTime,
    Late,
    Missed,
}

/// The outcome of evaluating check-ins against one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStatus<R = Remark> {
    pub executed: Executed,
    /// Remarks of the check-ins inside the period, ascending by timestamp.
    pub remarks: Vec<R>,
}

impl<R> PeriodStatus<R> {
    pub fn missed() -> Self {
        Self {
            executed: Executed::Missed,
            remarks: Vec::new(),
        }
    }

    /// True when at least one check-in fell inside the period.
    pub fn is_satisfied(&self) -> bool {
        self.executed != Executed::Missed
    }
}

/// Evaluate `check_ins` against one period.
///
/// Only check-ins with `start <= timestamp < end` count. When `presorted` is
/// true the caller guarantees ascending timestamps and their order is used
/// as is; otherwise the check-ins are stably sorted by timestamp first, so
/// remarks always come out in ascending-timestamp order.
pub fn period_status<R: Clone>(
    period: &Period,
    check_ins: &[CheckIn<R>],
    presorted: bool,
) -> PeriodStatus<R> {
    let mut inside: Vec<&CheckIn<R>> = check_ins
        .iter()
        .filter(|c| period.interval.contains(&c.timestamp))
        .collect();
    if inside.is_empty() {
        return PeriodStatus::missed();
    }
    if !presorted {
        inside.sort_by_key(|c| c.timestamp);
    }

    let deadline = period.occurrence.with_timezone(&Utc);
    let executed = if inside.iter().any(|c| c.timestamp <= deadline) {
        Executed::OnTime
    } else {
        Executed::Late
    };

    PeriodStatus {
        executed,
        remarks: inside.iter().filter_map(|c| c.result.clone()).collect(),
    }
}

/// One period of a window together with its evaluated status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodReport<R = Remark> {
    pub period: Period,
    pub status: PeriodStatus<R>,
    /// True for the period containing the window's reference instant.
    pub active: bool,
}

/// Evaluate every period of `window` against the same check-ins.
///
/// The check-ins are sorted once and each period is then evaluated as presorted.
pub fn period_report<R: Clone>(
    window: &PeriodicityWindow,
    check_ins: &[CheckIn<R>],
) -> Vec<PeriodReport<R>> {
    let mut sorted = check_ins.to_vec();
    sorted.sort_by_key(|c| c.timestamp);

    window
        .periods
        .iter()
        .enumerate()
        .map(|(i, period)| PeriodReport {
            period: *period,
            status: period_status(period, &sorted, true),
            active: i == window.active_period_index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_instant;
    use crate::period::Interval;
    use chrono_tz::Tz;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn period(start: &str, end: &str, occurrence: &str) -> Period {
        let tz = Tz::UTC;
        Period::new(
            Interval::new(parse_instant(start, &tz).unwrap(), parse_instant(end, &tz).unwrap())
                .unwrap(),
            parse_instant(occurrence, &tz).unwrap(),
        )
    }

    fn june() -> Period {
        period(
            "2022-06-01T00:00:00Z",
            "2022-07-01T00:00:00Z",
            "2022-06-15T00:00:00Z",
        )
    }

    #[test]
    fn test_on_time_without_remarks() {
        let p = period(
            "2021-05-31T00:00:00Z",
            "2022-05-31T00:00:00Z",
            "2021-06-30T00:00:00Z",
        );
        let status = period_status(&p, &[CheckIn::<Remark>::new(utc("2021-06-10T00:00:00Z"))], false);
        assert_eq!(status.executed, Executed::OnTime);
        assert!(status.remarks.is_empty());
    }

    #[test]
    fn test_late_with_remark() {
        let p = period(
            "2021-05-31T00:00:00Z",
            "2022-05-31T00:00:00Z",
            "2021-06-30T00:00:00Z",
        );
        let check_ins = [CheckIn::with_result(
            utc("2021-08-10T00:00:00Z"),
            Remark::Workorder,
        )];
        let status = period_status(&p, &check_ins, false);
        assert_eq!(status.executed, Executed::Late);
        assert_eq!(status.remarks, vec![Remark::Workorder]);
    }

    #[test]
    fn test_check_in_exactly_at_deadline_is_on_time() {
        let p = june();
        let status = period_status(&p, &[CheckIn::<Remark>::new(utc("2022-06-15T00:00:00Z"))], false);
        assert_eq!(status.executed, Executed::OnTime);

        let status = period_status(&p, &[CheckIn::<Remark>::new(utc("2022-06-15T00:00:01Z"))], false);
        assert_eq!(status.executed, Executed::Late);
    }

    #[test]
    fn test_no_check_ins_is_missed() {
        let status = period_status::<Remark>(&june(), &[], false);
        assert_eq!(status, PeriodStatus::missed());
        assert!(!status.is_satisfied());
    }

    #[test]
    fn test_check_ins_outside_interval_are_ignored() {
        let check_ins = [
            CheckIn::with_result(utc("2022-05-31T23:59:59Z"), Remark::ErrorReport),
            CheckIn::with_result(utc("2022-07-01T00:00:00Z"), Remark::ErrorReport),
        ];
        let status = period_status(&june(), &check_ins, false);
        assert_eq!(status.executed, Executed::Missed);
        assert!(status.remarks.is_empty());
    }

    #[test]
    fn test_any_on_time_check_in_wins_over_later_late_ones() {
        let check_ins = [
            CheckIn::<Remark>::new(utc("2022-06-30T00:00:00Z")),
            CheckIn::<Remark>::new(utc("2022-06-02T00:00:00Z")),
            CheckIn::<Remark>::new(utc("2022-06-20T00:00:00Z")),
        ];
        let status = period_status(&june(), &check_ins, false);
        assert_eq!(status.executed, Executed::OnTime);
        assert!(status.is_satisfied());
    }

    fn mixed_check_ins() -> Vec<CheckIn> {
        vec![
            CheckIn::with_result(utc("2022-01-01T00:00:00Z"), Remark::ErrorReport),
            CheckIn::with_result(utc("2022-06-30T00:00:00Z"), Remark::Workorder),
            CheckIn::new(utc("2022-06-20T00:00:00Z")),
            CheckIn::with_result(utc("2022-06-10T00:00:00Z"), Remark::PoliceReport),
            CheckIn::with_result(utc("2022-12-01T00:00:00Z"), Remark::ErrorReport),
        ]
    }

    #[test]
    fn test_remarks_ascending_by_timestamp_when_unsorted() {
        let status = period_status(&june(), &mixed_check_ins(), false);
        assert_eq!(status.executed, Executed::OnTime);
        assert_eq!(status.remarks, vec![Remark::PoliceReport, Remark::Workorder]);
    }

    #[test]
    fn test_presorted_input_order_is_trusted() {
        let status = period_status(&june(), &mixed_check_ins(), true);
        assert_eq!(status.executed, Executed::OnTime);
        assert_eq!(status.remarks, vec![Remark::Workorder, Remark::PoliceReport]);
    }

    #[test]
    fn test_generic_remark_type() {
        let check_ins = [CheckIn::with_result(utc("2022-06-03T00:00:00Z"), 42u8)];
        let status = period_status(&june(), &check_ins, false);
        assert_eq!(status.remarks, vec![42u8]);
    }

    #[test]
    fn test_remark_wire_format() {
        let check_ins: Vec<CheckIn> = serde_json::from_str(
            r#"[
                {"timestamp":"2022-06-10T00:00:00Z","result":"police_report"},
                {"timestamp":"2022-06-11T00:00:00Z","result":"graffiti"},
                {"timestamp":"2022-06-12T00:00:00Z"}
            ]"#,
        )
        .unwrap();
        assert_eq!(check_ins[0].result, Some(Remark::PoliceReport));
        assert_eq!(check_ins[1].result, Some(Remark::Other("graffiti".to_string())));
        assert_eq!(check_ins[2].result, None);

        let status = period_status(&june(), &check_ins, false);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["executed"], "on_time");
        assert_eq!(json["remarks"][0], "police_report");
        assert_eq!(json["remarks"][1], "graffiti");
    }

    #[test]
    fn test_period_report_flags_active_period() {
        use crate::period::generate_periods;
        use crate::rule::{MonthlyOccurrence, PeriodicityRule};

        let rule = PeriodicityRule::Monthly {
            occurrences: vec![MonthlyOccurrence { date: 15 }],
        };
        let now = parse_instant("2022-06-20", &Tz::UTC).unwrap();
        let window = generate_periods(&rule, 0, 1, 1, &now).unwrap();
        let check_ins = vec![
            CheckIn::with_result(utc("2022-07-01T00:00:00Z"), Remark::Workorder),
            CheckIn::new(utc("2022-05-15T08:00:00Z")),
        ];

        let report = period_report(&window, &check_ins);
        assert_eq!(report.len(), 3);
        assert_eq!(
            report.iter().map(|r| r.active).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        // [05-15, 06-15) deadline 05-15 end of day
        assert_eq!(report[0].status.executed, Executed::OnTime);
        // [06-15, 07-15) deadline 06-15 end of day
        assert_eq!(report[1].status.executed, Executed::Late);
        assert_eq!(report[1].status.remarks, vec![Remark::Workorder]);
        assert_eq!(report[2].status.executed, Executed::Missed);
    }
}
