//! Duration expressions.
//!
//! `L` means lifetime. Otherwise the first `<digits><unit>` run anywhere in
//! the expression, with unit `hr` or `day`, is added to the current time.

use chrono::{DateTime, Days, TimeDelta, Utc};
use regex::Regex;
use std::sync::LazyLock;

use super::record::Expiration;
use crate::error::LedgerError;

/// Expression (and store encoding) for a key that never expires.
pub const LIFETIME_TOKEN: &str = "L";

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)(hr|day)").expect("duration pattern is valid"));

/// Convert a duration expression into an expiration relative to `now`.
///
/// Values past the end of year 9999 clamp to [`latest_expiration`], the last
/// instant the store encoding can hold.
/// A value of zero yields `now` itself, which a sweep treats as expired.
pub fn parse_expiration(expr: &str, now: DateTime<Utc>) -> Result<Expiration, LedgerError> {
    if expr == LIFETIME_TOKEN {
        return Ok(Expiration::Lifetime);
    }

    let caps = DURATION_RE
        .captures(expr)
        .ok_or_else(|| LedgerError::InvalidDuration(expr.to_string()))?;

    // Digits only, so the sole parse failure is overflow.
    let value = caps[1].parse::<u64>().unwrap_or(u64::MAX);
    let at = if &caps[2] == "hr" {
        add_hours(now, value)
    } else {
        add_days(now, value)
    };
    let latest = latest_expiration();
    Ok(Expiration::At(at.map_or(latest, |at| at.min(latest))))
}

/// `9999-12-31T23:59:59Z`.
pub fn latest_expiration() -> DateTime<Utc> {
    DateTime::from_timestamp(253_402_300_799, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn add_hours(now: DateTime<Utc>, hours: u64) -> Option<DateTime<Utc>> {
    let hours = i64::try_from(hours).ok()?;
    now.checked_add_signed(TimeDelta::try_hours(hours)?)
}

fn add_days(now: DateTime<Utc>, days: u64) -> Option<DateTime<Utc>> {
    now.checked_add_days(Days::new(days))
}
