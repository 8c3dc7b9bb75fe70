// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable elapsed-time formatting for TUI rows and log lines.

use std::time::Duration;

/// Format a duration as `Hh MMm SSs`, `MMm SSs`, or `SSs`, dropping leading
/// zero components.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

/// Format a duration with millisecond precision, for short-lived children
/// where whole seconds would read as `0s`.
pub fn format_elapsed_ms(elapsed: Duration) -> String {
    if elapsed.as_secs() == 0 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format_elapsed(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_seconds_only() {
        assert_eq!(format_elapsed(Duration::from_secs(9)), "9s");
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(65)), "1m 05s");
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(3725)), "1h 02m 05s");
    }

    #[test]
    fn sub_second_uses_milliseconds() {
        assert_eq!(format_elapsed_ms(Duration::from_millis(250)), "250ms");
    }
}
