//! Shared formatting helpers for table cells and cluster summaries.
//!
//! All pure formatting functions (no ratatui styles, no UI layout) live here.
//! Functions that differ between compact table columns and verbose detail text
//! are parameterized via [`FmtStyle`].

use chrono::{DateTime, Utc};

use crate::cluster::GeoPoint;

/// Placeholder for absent values.
pub const NONE: &str = "-";

/// Controls compact (table columns) vs verbose (detail text) output.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FmtStyle {
    /// Compact: no spaces, short suffixes ("3m5s")
    Compact,
    /// Detail: spaces ("3m 5s")
    Detail,
}

/// Format duration in seconds as human-readable.
///
/// Compact: `"3m5s"` (no spaces, `"-"` for negative)
/// Detail:  `"3m 5s"` (with spaces, `"0s"` for `<= 0`)
pub fn format_duration(secs: i64, style: FmtStyle) -> String {
    match style {
        FmtStyle::Compact => {
            if secs < 0 {
                return NONE.to_string();
            }
            if secs < 60 {
                format!("{}s", secs)
            } else if secs < 3600 {
                format!("{}m{}s", secs / 60, secs % 60)
            } else if secs < 86400 {
                format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
            } else {
                format!("{}d{}h", secs / 86400, (secs % 86400) / 3600)
            }
        }
        FmtStyle::Detail => {
            if secs <= 0 {
                return "0s".to_string();
            }
            if secs < 60 {
                format!("{}s", secs)
            } else if secs < 3600 {
                format!("{}m {}s", secs / 60, secs % 60)
            } else if secs < 86400 {
                format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
            } else {
                format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
            }
        }
    }
}

/// Time since `ts` relative to `now`: `"5m0s ago"`. Future timestamps read `"now"`.
pub fn format_age(ts: Option<DateTime<Utc>>, now: DateTime<Utc>, style: FmtStyle) -> String {
    match ts {
        None => NONE.to_string(),
        Some(ts) => {
            let secs = (now - ts).num_seconds();
            if secs <= 0 {
                "now".to_string()
            } else {
                format!("{} ago", format_duration(secs, style))
            }
        }
    }
}

/// `"2024-05-01 14:03"` in UTC.
pub fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| NONE.to_string())
}

/// Degrees with five decimals (about one metre).
pub fn format_degrees(value: f64) -> String {
    format!("{:.5}", value)
}

/// `"52.51234, 13.40123"`.
pub fn format_point(point: Option<GeoPoint>) -> String {
    point
        .map(|p| format!("{}, {}", format_degrees(p.lat()), format_degrees(p.lng())))
        .unwrap_or_else(|| NONE.to_string())
}

pub fn format_battery(pct: Option<u8>) -> String {
    pct.map(|p| format!("{}%", p))
        .unwrap_or_else(|| NONE.to_string())
}

pub fn format_pressure(bar: Option<f64>) -> String {
    bar.map(|b| format!("{:.2} bar", b))
        .unwrap_or_else(|| NONE.to_string())
}

/// Cluster radius in degrees, trimmed for the status line: `"0.0025°"`.
pub fn format_radius(degrees: f64) -> String {
    if degrees >= 1.0 {
        format!("{:.1}°", degrees)
    } else {
        let s = format!("{:.5}", degrees);
        let s = s.trim_end_matches('0');
        format!("{}°", s.trim_end_matches('.'))
    }
}

/// Truncates to `max` characters, ending with `…` when shortened.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(-1, FmtStyle::Compact), "-");
        assert_eq!(format_duration(59, FmtStyle::Compact), "59s");
        assert_eq!(format_duration(185, FmtStyle::Compact), "3m5s");
        assert_eq!(format_duration(185, FmtStyle::Detail), "3m 5s");
        assert_eq!(format_duration(90_000, FmtStyle::Compact), "1d1h");
        assert_eq!(format_duration(0, FmtStyle::Detail), "0s");
    }

    #[test]
    fn test_format_age() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 11, 55, 0).unwrap();
        assert_eq!(format_age(Some(ts), now, FmtStyle::Compact), "5m0s ago");
        assert_eq!(format_age(Some(now), now, FmtStyle::Compact), "now");
        assert_eq!(format_age(None, now, FmtStyle::Compact), "-");
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 14, 3, 59).unwrap();
        assert_eq!(format_timestamp(Some(ts)), "2024-05-01 14:03");
        assert_eq!(format_timestamp(None), "-");
    }

    #[test]
    fn test_format_point() {
        let p = GeoPoint::new(52.512341, 13.4).unwrap();
        assert_eq!(format_point(Some(p)), "52.51234, 13.40000");
        assert_eq!(format_point(None), "-");
    }

    #[test]
    fn test_format_values() {
        assert_eq!(format_battery(Some(87)), "87%");
        assert_eq!(format_pressure(Some(4.2)), "4.20 bar");
        assert_eq!(format_pressure(None), "-");
    }

    #[test]
    fn test_format_radius() {
        assert_eq!(format_radius(0.0025), "0.0025°");
        assert_eq!(format_radius(0.01), "0.01°");
        assert_eq!(format_radius(2.5), "2.5°");
        assert_eq!(format_radius(0.0), "0°");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("pressure logger", 8), "pressur…");
        assert_eq!(truncate("short", 8), "short");
        assert_eq!(truncate("abc", 0), "");
    }
}
