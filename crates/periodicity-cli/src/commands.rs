//! Subcommand implementations. Each returns the JSON document to print.

use anyhow::{Context, Result};
use clap::Args;
use periodicity_engine::{
    generate_periods_with_options, parse_timezone, period_report, period_status, Interval,
    Period, WindowOptions,
};
use tracing::debug;

use crate::input;

/// Flags describing the window of periods to generate.
#[derive(Args)]
pub struct WindowArgs {
    /// Periodicity rule as JSON, `@path` to a JSON file, or `@-` for stdin
    #[arg(long)]
    rule: String,
    /// Days to look back from each recurrence to start its period
    #[arg(long, default_value_t = WindowOptions::default().duration_days)]
    duration: u32,
    /// Periods to include before the one containing the reference instant
    #[arg(long, default_value_t = WindowOptions::default().previous_count)]
    previous: usize,
    /// Periods to include after the one containing the reference instant
    #[arg(long, default_value_t = WindowOptions::default().next_count)]
    next: usize,
    /// Reference instant (RFC 3339 or YYYY-MM-DD); defaults to the current time
    #[arg(long)]
    now: Option<String>,
}

impl WindowArgs {
    fn options(&self) -> WindowOptions {
        WindowOptions {
            duration_days: self.duration,
            previous_count: self.previous,
            next_count: self.next,
        }
    }
}

/// Flags shared by every subcommand.
#[derive(Args)]
pub struct CommonArgs {
    /// IANA timezone periods are computed in
    #[arg(long, default_value = "UTC")]
    tz: String,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
pub struct PeriodsArgs {
    #[command(flatten)]
    window: WindowArgs,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Period start (inclusive)
    #[arg(long)]
    start: String,
    /// Period end (exclusive)
    #[arg(long)]
    end: String,
    /// Period deadline
    #[arg(long)]
    occurrence: String,
    /// Check-ins as a JSON array, `@path` to a JSON file, or `@-` for stdin
    #[arg(long = "check-ins")]
    check_ins: String,
    /// Trust the check-ins to already be in ascending timestamp order
    #[arg(long)]
    presorted: bool,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    window: WindowArgs,
    /// Check-ins as a JSON array, `@path` to a JSON file, or `@-` for stdin
    #[arg(long = "check-ins")]
    check_ins: String,
    #[command(flatten)]
    common: CommonArgs,
}

pub fn periods(args: PeriodsArgs) -> Result<String> {
    let tz = parse_timezone(&args.common.tz)?;
    let rule = input::rule(&args.window.rule)?;
    let reference = input::reference(args.window.now.as_deref(), tz)?;

    let window = generate_periods_with_options(&rule, &args.window.options(), &reference)
        .context("generating periods")?;
    debug!(periods = window.periods.len(), "window ready");
    input::to_json(&window, args.common.pretty)
}

pub fn status(args: StatusArgs) -> Result<String> {
    let tz = parse_timezone(&args.common.tz)?;
    let interval = Interval::new(
        input::instant(&args.start, &tz, "start")?,
        input::instant(&args.end, &tz, "end")?,
    )?;
    let period = Period::new(interval, input::instant(&args.occurrence, &tz, "occurrence")?);
    let check_ins = input::check_ins(&args.check_ins)?;

    let status = period_status(&period, &check_ins, args.presorted);
    input::to_json(&status, args.common.pretty)
}

pub fn report(args: ReportArgs) -> Result<String> {
    let tz = parse_timezone(&args.common.tz)?;
    let rule = input::rule(&args.window.rule)?;
    let reference = input::reference(args.window.now.as_deref(), tz)?;
    let check_ins = input::check_ins(&args.check_ins)?;

    let window = generate_periods_with_options(&rule, &args.window.options(), &reference)
        .context("generating periods")?;
    let report = period_report(&window, &check_ins);
    debug!(
        periods = report.len(),
        check_ins = check_ins.len(),
        "report ready"
    );
    input::to_json(&report, args.common.pretty)
}
