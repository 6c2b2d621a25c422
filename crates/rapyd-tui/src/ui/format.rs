//! Human-readable sizes and timestamps.

use std::fmt::Write as _;
use std::time::SystemTime;

use chrono::{DateTime, Local, TimeZone, Utc};

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count with binary units and one decimal: `1.5 KB`.
///
/// Whole values drop the decimal (`2 MB`), and bytes are never fractional.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0} {}", UNITS[unit])
    } else {
        format!("{rounded:.1} {}", UNITS[unit])
    }
}

/// Formats a modification time in the local timezone.
pub fn format_date(time: SystemTime, pattern: &str) -> String {
    format_date_in(time, &Local, pattern)
}

/// Formats `time` in `tz`. An invalid `pattern` falls back to ISO 8601.
pub fn format_date_in<Tz>(time: SystemTime, tz: &Tz, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let local = DateTime::<Utc>::from(time).with_timezone(tz);
    let mut out = String::new();
    if write!(out, "{}", local.format(pattern)).is_err() {
        out.clear();
        let _ = write!(out, "{}", local.format("%Y-%m-%d %H:%M"));
    }
    out
}

/// Coarse age such as `5m ago`, relative to `now`.
pub fn format_age(time: SystemTime, now: SystemTime) -> String {
    let secs = match now.duration_since(time) {
        Ok(d) => d.as_secs(),
        Err(_) => return "just now".to_owned(),
    };
    match secs {
        0..=59 => "just now".to_owned(),
        60..=3_599 => format!("{}m ago", secs / 60),
        3_600..=86_399 => format!("{}h ago", secs / 3_600),
        86_400..=2_591_999 => format!("{}d ago", secs / 86_400),
        _ => format!("{}mo ago", secs / 2_592_000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn sizes_below_one_kilobyte() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1), "1 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn sizes_scale_through_units() {
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_size(1_288_490_189), "1.2 GB");
        assert_eq!(format_size(3 * 1024u64.pow(4)), "3 TB");
    }

    #[test]
    fn terabytes_are_the_largest_unit() {
        assert_eq!(format_size(2048 * 1024u64.pow(4)), "2048 TB");
    }

    #[test]
    fn rounding_up_to_a_whole_value_drops_decimal() {
        // 1023.96 KB rounds to 1024.0 KB
        assert_eq!(format_size(1_048_535), "1024 KB");
    }

    #[test]
    fn date_in_utc() {
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(format_date_in(t, &Utc, "%Y-%m-%d %H:%M"), "2023-11-14 22:13");
        assert_eq!(format_date_in(t, &Utc, "%d.%m.%Y"), "14.11.2023");
    }

    #[test]
    fn invalid_pattern_falls_back() {
        let t = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(format_date_in(t, &Utc, "%Q"), "2023-11-14 22:13");
    }

    #[test]
    fn age_buckets() {
        let now = UNIX_EPOCH + Duration::from_secs(10_000_000);
        let ago = |secs: u64| format_age(now - Duration::from_secs(secs), now);
        assert_eq!(ago(5), "just now");
        assert_eq!(ago(120), "2m ago");
        assert_eq!(ago(7_200), "2h ago");
        assert_eq!(ago(3 * 86_400), "3d ago");
        assert_eq!(ago(90 * 86_400), "3mo ago");
    }

    #[test]
    fn future_time_is_just_now() {
        let now = UNIX_EPOCH + Duration::from_secs(100);
        assert_eq!(format_age(now + Duration::from_secs(50), now), "just now");
    }
}
