//! Time utilities

use std::time::Duration;

/// Format a wall-clock limit in seconds, e.g. `30s` or `0.5s`
pub fn format_seconds(duration: Duration) -> String {
    format!("{}s", duration.as_secs_f64())
}

/// Format milliseconds as a human-readable string
pub fn format_milliseconds(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.1}us", ms * 1000.0)
    } else if ms < 1000.0 {
        format!("{:.2}ms", ms)
    } else if ms < 60_000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        let seconds = (ms / 1000.0) as u64;
        format!("{}m {}s", seconds / 60, seconds % 60)
    }
}
