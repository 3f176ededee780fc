//! Compact human rendering of millisecond durations.

use super::tables::{DAY_MS, HOUR_MS, MINUTE_MS};

/// Render as `2d 3h 15m`, dropping leading zero units.
///
/// Durations under a minute render in seconds (`42s`); negative input
/// renders as `0s`.
pub fn format_duration_ms(ms: i64) -> String {
    let ms = ms.max(0);
    if ms < MINUTE_MS {
        return format!("{}s", ms / 1000);
    }

    let days = ms / DAY_MS;
    let hours = (ms % DAY_MS) / HOUR_MS;
    let minutes = (ms % HOUR_MS) / MINUTE_MS;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{hours}h"));
    }
    parts.push(format!("{minutes}m"));
    parts.join(" ")
}

/// Render a 0.0..=1.0 fraction as a whole percentage.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", (fraction.clamp(0.0, 1.0) * 100.0).floor())
}
