//! Simulated-time accounting and timestamp formatting.
//!
//! `sim_time` is always computed as `start_timestamp + cycle_count * cycle_time` — never by
//! repeatedly adding `cycle_time` in a loop, which would accumulate floating-point drift over a
//! long run.

use chrono::{DateTime, Utc};

/// Compute the simulated time (seconds, as an absolute or relative timestamp depending on how
/// `start_timestamp` was chosen) for a given cycle count.
#[must_use]
pub fn sim_time(start_timestamp: f64, cycle_count: u64, cycle_time: f64) -> f64 {
    start_timestamp + (cycle_count as f64) * cycle_time
}

/// Render `sim_time` seconds as a timestamp string.
///
/// If `pattern` is `Some`, it is interpreted as a `chrono` strftime-style format string. If
/// `None`, the default is ISO 8601 / RFC 3339 (`to_rfc3339`), matching the clock's documented
/// default.
#[must_use]
pub fn format_time(sim_time_secs: f64, pattern: Option<&str>) -> String {
    let secs = sim_time_secs.floor() as i64;
    let nanos = ((sim_time_secs - sim_time_secs.floor()) * 1_000_000_000.0).round() as u32;
    let dt: DateTime<Utc> = DateTime::from_timestamp(secs, nanos).unwrap_or_else(|| {
        if sim_time_secs.is_sign_negative() {
            DateTime::from_timestamp(i64::MIN / 1_000, 0).expect("valid fallback timestamp")
        } else {
            DateTime::from_timestamp(i64::MAX / 1_000, 0).expect("valid fallback timestamp")
        }
    });

    match pattern {
        Some(fmt) => dt.format(fmt).to_string(),
        None => dt.to_rfc3339(),
    }
}
