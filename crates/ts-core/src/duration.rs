//! `H:MM:SS` duration parsing and formatting.
//!
//! Durations are whole seconds. Hours are unbounded in both directions:
//! `"100:00:00"` parses, and 360000 seconds formats back to `"100:00:00"`.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::ValidationError;

/// Pre-compiled manual duration grammar.
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})$").expect("valid duration regex"));

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Parses a manual duration such as `"2:30:00"` into seconds.
///
/// Surrounding whitespace is ignored. Minutes and seconds must each be in 0-59.
pub fn parse_duration(input: &str) -> Result<u64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "duration" });
    }

    let invalid = || ValidationError::InvalidDuration {
        value: input.to_string(),
    };

    let caps = DURATION_RE.captures(trimmed).ok_or_else(invalid)?;
    let hours: u64 = caps[1].parse().map_err(|_| invalid())?;
    let minutes: u64 = caps[2].parse().map_err(|_| invalid())?;
    let seconds: u64 = caps[3].parse().map_err(|_| invalid())?;

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    hours
        .checked_mul(SECONDS_PER_HOUR)
        .and_then(|h| h.checked_add(minutes * SECONDS_PER_MINUTE + seconds))
        .ok_or_else(invalid)
}

/// Formats seconds as zero-padded `HH:MM:SS`.
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Converts whole seconds to fractional hours.
#[expect(
    clippy::cast_precision_loss,
    reason = "tracked durations are far below 2^52 seconds"
)]
pub fn seconds_to_hours(seconds: u64) -> f64 {
    seconds as f64 / SECONDS_PER_HOUR as f64
}
