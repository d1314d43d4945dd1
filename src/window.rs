//! Recency window selection for the aggregator.

use chrono::{DateTime, Duration, Utc};

// ---

/// Window used when the caller does not ask for one (or asks for nonsense).
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Longest window a caller may request; larger values are clamped.
pub const MAX_WINDOW_DAYS: u32 = 365;

/// Resolve the raw `days` query value into a window length in days.
///
/// Absent, blank, non-numeric and non-positive values fall back to
/// [`DEFAULT_WINDOW_DAYS`]; values above [`MAX_WINDOW_DAYS`] clamp down.
pub fn resolve_window_days(raw: Option<&str>) -> u32 {
    // ---
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(days) if days >= 1 => days.min(MAX_WINDOW_DAYS as i64) as u32,
        _ => DEFAULT_WINDOW_DAYS,
    }
}

/// Concrete `[start, end]` range covered by a window ending at `now`.
pub fn window_range(days: u32, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - Duration::days(i64::from(days)), now)
}
