//! Terminal output
//!
//! Status lines play the role of toast notifications: short, transient,
//! one per outcome. Successes and info go to stdout, problems to stderr.

use imgconv_core::Error;
use owo_colors::OwoColorize;
use std::fmt::Display;
use std::time::Duration;

/// One-line status messages
pub struct Status;

impl Status {
    /// `✓ message` on stdout
    pub fn success(message: impl Display) {
        println!("{} {}", "✓".green(), message);
    }

    /// `✗ message` on stderr
    pub fn error(message: impl Display) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// `⚠ message` on stderr
    pub fn warning(message: impl Display) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// `ℹ message` on stdout
    pub fn info(message: impl Display) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Indented `label: value` line under a status
    pub fn field(label: &str, value: impl Display) {
        println!("  {} {}", format!("{label}:").dimmed(), value);
    }

    /// A coded error with its context and suggestion
    pub fn report(err: &Error) {
        eprintln!("{} {} {}", "✗".red(), format!("[{}]", err.code).dimmed(), err.message);
        if let Some(context) = &err.context {
            eprintln!("  {}", context.dimmed());
        }
        if let Some(suggestion) = &err.suggestion {
            eprintln!("  {} {}", "→".cyan(), suggestion);
        }
    }

    /// Bold title with an underline sized to it
    pub fn header(title: impl Display) {
        let title = title.to_string();
        println!();
        println!("{}", title.bold());
        println!("{}", "─".repeat(title.chars().count()));
    }
}

/// `850ms`, `4.2s` or `2m 5s`
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    match millis {
        0..=999 => format!("{millis}ms"),
        1_000..=59_999 => format!("{:.1}s", duration.as_secs_f64()),
        _ => {
            let secs = duration.as_secs();
            format!("{}m {}s", secs / 60, secs % 60)
        }
    }
}

/// Format a file size for display: two decimals at most, trailing zeros trimmed.
///
/// ```
/// use imgconv_cli::output::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    const K: f64 = 1024.0;

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= K && unit < UNITS.len() - 1 {
        value /= K;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// `1 image`, `3 images`
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    let noun = if count == 1 { singular } else { plural };
    format!("{count} {noun}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_below_a_second_is_millis() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(850)), "850ms");
    }

    #[test]
    fn test_duration_seconds_have_one_decimal() {
        assert_eq!(format_duration(Duration::from_millis(4_200)), "4.2s");
        assert_eq!(format_duration(Duration::from_millis(59_000)), "59.0s");
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m 0s");
    }

    #[test]
    fn test_format_file_size_bytes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
    }

    #[test]
    fn test_format_file_size_trims_zeros() {
        assert_eq!(format_file_size(2048), "2 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(100 * 1024 * 1024), "100 MB");
    }

    #[test]
    fn test_format_file_size_rounds_to_two_places() {
        assert_eq!(format_file_size(1234), "1.21 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(1, "image", "images"), "1 image");
        assert_eq!(format_count(0, "image", "images"), "0 images");
        assert_eq!(format_count(7, "image", "images"), "7 images");
    }
}
