//! Argument decoding shared by the subcommands.

use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use periodicity_engine::{now_in, parse_instant, CheckIn, PeriodicityRule};
use serde::Serialize;

/// Resolve an inline JSON argument, `@path` (file) or `@-` (stdin).
pub fn json_source(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {path}")),
        None => Ok(arg.to_string()),
    }
}

pub fn rule(arg: &str) -> Result<PeriodicityRule> {
    let json = json_source(arg)?;
    Ok(PeriodicityRule::from_json(&json)?)
}

pub fn check_ins(arg: &str) -> Result<Vec<CheckIn>> {
    let json = json_source(arg)?;
    serde_json::from_str(&json).context("parsing check-ins")
}

/// The reference instant; the wall clock when none was given.
pub fn reference(now: Option<&str>, tz: Tz) -> Result<DateTime<Tz>> {
    match now {
        Some(s) => parse_instant(s, &tz).context("parsing --now"),
        None => Ok(now_in(tz)),
    }
}

pub fn instant(s: &str, tz: &Tz, flag: &str) -> Result<DateTime<Tz>> {
    parse_instant(s, tz).with_context(|| format!("parsing --{flag}"))
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}
