//! Shared display formatting with fixed edge-case policies.
//!
//! These policies are load-bearing for report determinism: zero bytes is
//! exactly `"0 B"`, a negative ratio renders as infinity, and timestamps
//! at or below zero render as an em-dash.

use chrono::DateTime;

const SIZE_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Formats a byte count with binary (1024-based) units, one decimal place.
pub fn human_size(bytes: f64) -> String {
    human_size_with(bytes, 1)
}

/// Formats a byte count with a caller-chosen number of decimals.
pub fn human_size_with(bytes: f64, decimals: usize) -> String {
    if bytes <= 0.0 {
        return "0 B".to_string();
    }
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.decimals$} {}", SIZE_UNITS[unit])
}

/// Formats a transfer rate; zero renders as `"0 B/s"`.
pub fn format_speed(bytes_per_sec: f64) -> String {
    if bytes_per_sec == 0.0 {
        return "0 B/s".to_string();
    }
    format!("{}/s", human_size(bytes_per_sec))
}

/// Formats remaining seconds as a coarse countdown.
///
/// Non-positive or non-finite input means "unknown" and renders as
/// infinity. Components truncate toward zero with no padding.
pub fn format_eta(seconds: f64) -> String {
    if seconds <= 0.0 || !seconds.is_finite() {
        return "∞".to_string();
    }
    let total = seconds as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}h {m}m")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

/// Formats a share ratio; negative means infinite per the wire protocol.
pub fn format_ratio(ratio: f64) -> String {
    if ratio < 0.0 {
        return "∞".to_string();
    }
    format!("{ratio:.2}")
}

/// Formats a unix timestamp as date and time; zero or negative means
/// unknown and renders as an em-dash.
pub fn format_date(timestamp: i64) -> String {
    if timestamp <= 0 {
        return "—".to_string();
    }
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string())
}

/// Replaces characters illegal in download filenames with underscores.
///
/// Touches exactly `/ \ * ? : " < > |`; everything else, dots included,
/// passes through unchanged.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn test_human_size_zero_is_exact() {
        assert_eq!(human_size(0.0), "0 B");
    }

    #[test]
    fn test_human_size_unit_boundaries() {
        assert_eq!(human_size(1.0), "1.0 B");
        assert_eq!(human_size(1024.0), "1.0 KiB");
        assert_eq!(human_size(1024.0 * 1024.0), "1.0 MiB");
        assert_eq!(human_size(1024.0 * 1024.0 * 1024.0), "1.0 GiB");
        assert_eq!(human_size(1024.0f64.powi(4)), "1.0 TiB");
    }

    #[test]
    fn test_human_size_sub_kilobyte() {
        assert_eq!(human_size(500.0), "500.0 B");
    }

    #[test]
    fn test_human_size_fractional() {
        assert_eq!(human_size(1536.0), "1.5 KiB");
        assert_eq!(human_size_with(1536.0, 2), "1.50 KiB");
    }

    #[test]
    fn test_human_size_clamps_to_largest_unit() {
        assert_eq!(human_size(1024.0f64.powi(5)), "1024.0 TiB");
    }

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(0.0), "0 B/s");
        assert_eq!(format_speed(2048.0), "2.0 KiB/s");
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(0.0), "∞");
        assert_eq!(format_eta(-5.0), "∞");
        assert_eq!(format_eta(f64::INFINITY), "∞");
        assert_eq!(format_eta(f64::NAN), "∞");
        assert_eq!(format_eta(45.0), "45s");
        assert_eq!(format_eta(90.0), "1m 30s");
        assert_eq!(format_eta(3665.0), "1h 1m");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(-1.0), "∞");
        assert_eq!(format_ratio(0.0), "0.00");
        assert_eq!(format_ratio(1.5), "1.50");
        assert_eq!(format_ratio(12.345), "12.35");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(0), "—");
        assert_eq!(format_date(-100), "—");
        assert_eq!(format_date(1_700_000_000), "2023-11-14 22:13");
    }

    #[test]
    fn test_sanitize_filename_replaces_illegal_chars() {
        assert_eq!(sanitize_filename("foo/bar"), "foo_bar");
        assert_eq!(sanitize_filename("foo\\bar"), "foo_bar");
        assert_eq!(sanitize_filename("a*b?c:d\"e<f>g|h"), "a_b_c_d_e_f_g_h");
    }

    #[test]
    fn test_sanitize_filename_identity_on_safe_names() {
        assert_eq!(sanitize_filename("My.Torrent.Name"), "My.Torrent.Name");
        assert_eq!(sanitize_filename("normal-name_123"), "normal-name_123");
    }
}
