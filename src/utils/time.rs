//! Term arithmetic shared by accrual and adjudication.

use bigdecimal::{BigDecimal, One, Zero};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Longest accepted plan term: 100 years of 365 days.
pub const MAX_DURATION_DAYS: u32 = 100 * 365;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised plan duration '{0}'")]
pub struct InvalidDuration(pub String);

/// Fraction of a `duration_days` term elapsed at `now`, clamped to `[0, 1]`.
///
/// This is the only place that decides how much of a term has passed. A zero-day
/// term has no ramp and counts as fully elapsed.
pub fn elapsed_fraction(start: DateTime<Utc>, duration_days: u32, now: DateTime<Utc>) -> BigDecimal {
    if duration_days == 0 {
        return BigDecimal::one();
    }
    if now <= start {
        return BigDecimal::zero();
    }

    let term = Duration::days(i64::from(duration_days));
    let elapsed = now - start;
    if elapsed >= term {
        return BigDecimal::one();
    }

    BigDecimal::from(elapsed.num_milliseconds()) / BigDecimal::from(term.num_milliseconds())
}

/// Instant at which a term starting at `start` is fully elapsed, or `None` when it
/// falls outside the representable calendar.
pub fn term_end(start: DateTime<Utc>, duration_days: u32) -> Option<DateTime<Utc>> {
    start.checked_add_signed(Duration::days(i64::from(duration_days)))
}

/// Parses plan durations such as `"30"`, `"30 days"`, `"2 weeks"`, `"3 months"` or
/// `"1 year"` into a day count. Months count as 30 days and years as 365. Terms
/// longer than [`MAX_DURATION_DAYS`] are rejected.
pub fn parse_duration_days(text: &str) -> Result<u32, InvalidDuration> {
    let normalized = text.trim().to_lowercase();
    let split = normalized
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(normalized.len());
    let (count, unit) = normalized.split_at(split);

    let count: u32 = count
        .parse()
        .map_err(|_| InvalidDuration(text.to_string()))?;

    let multiplier = match unit.trim() {
        "" | "d" | "day" | "days" => 1,
        "w" | "week" | "weeks" => 7,
        "month" | "months" => 30,
        "y" | "year" | "years" => 365,
        _ => return Err(InvalidDuration(text.to_string())),
    };

    count
        .checked_mul(multiplier)
        .filter(|days| *days <= MAX_DURATION_DAYS)
        .ok_or_else(|| InvalidDuration(text.to_string()))
}
