//! Wall-clock helpers for log timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// 9999-12-31T23:59:59Z, the last instant a four-digit year can show.
const MAX_RENDERED_SECS: u64 = 253_402_300_799;

const SECS_PER_DAY: u64 = 86_400;

/// Current UTC time as fractional Unix seconds.
pub fn now_unix_f64() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

fn is_leap(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Render fractional Unix seconds as ISO-8601 UTC with whole seconds.
///
/// The fraction is truncated. Negative or NaN input renders as the epoch;
/// values past year 9999 (including +inf) render as its last second.
pub fn unix_to_iso8601(secs: f64) -> String {
    let secs = if secs.is_nan() || secs <= 0.0 {
        0
    } else if secs >= MAX_RENDERED_SECS as f64 {
        MAX_RENDERED_SECS
    } else {
        secs.trunc() as u64
    };

    let mut days = secs / SECS_PER_DAY;
    let clock = secs % SECS_PER_DAY;

    let mut year = 1970;
    loop {
        let year_len = if is_leap(year) { 366 } else { 365 };
        if days < year_len {
            break;
        }
        days -= year_len;
        year += 1;
    }

    let feb = if is_leap(year) { 29 } else { 28 };
    let month_lengths = [31, feb, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 1;
    for len in month_lengths {
        if days < len {
            break;
        }
        days -= len;
        month += 1;
    }

    format!(
        "{year:04}-{month:02}-{day:02}T{h:02}:{m:02}:{s:02}Z",
        day = days + 1,
        h = clock / 3600,
        m = clock % 3600 / 60,
        s = clock % 60,
    )
}
