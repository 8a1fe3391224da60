//! Display formatting for durations.

/// Format elapsed seconds for the duration readout.
///
/// `45` → `"45s"`, `83` → `"1min 23s"`, `120` → `"2min"`,
/// `3905` → `"1h 5min 5s"`.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{}s", seconds);
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        return format!("{}h {}min {}s", hours, minutes, secs);
    }

    if secs > 0 {
        format!("{}min {}s", minutes, secs)
    } else {
        format!("{}min", minutes)
    }
}

/// Format seconds as `MM:SS` for the rest timer.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_seconds_only() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(60), "1min");
        assert_eq!(format_duration(83), "1min 23s");
        assert_eq!(format_duration(125), "2min 5s");
    }

    #[test]
    fn test_format_duration_hours_always_shows_all_parts() {
        assert_eq!(format_duration(3600), "1h 0min 0s");
        assert_eq!(format_duration(3905), "1h 5min 5s");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(5), "00:05");
    }
}
