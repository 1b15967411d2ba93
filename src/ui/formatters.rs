use chrono::{DateTime, Local, Utc};
use colored::*;
use humansize::{format_size as humansize_format, BINARY};

use crate::core::alerts::AlertSeverity;

/// Format a byte count in human-readable binary units (KiB, MiB, GiB)
pub fn format_size(size: u64) -> String {
    humansize_format(size, BINARY)
}

/// Format a UTC timestamp in local time (YYYY-MM-DD HH:MM:SS)
pub fn format_time(time: DateTime<Utc>) -> String {
    let local: DateTime<Local> = time.with_timezone(&Local);
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Percentage colored green / yellow / red against `threshold`
pub fn format_percent(value: f64, threshold: f64) -> ColoredString {
    let text = format!("{:.1}%", value);
    if value >= threshold {
        text.red().bold()
    } else if value >= threshold * 0.9 {
        text.yellow()
    } else {
        text.green()
    }
}

pub fn format_severity(severity: AlertSeverity) -> ColoredString {
    let label = severity.as_str().to_uppercase();
    match severity {
        AlertSeverity::Critical => label.red().bold(),
        AlertSeverity::Error => label.red(),
        AlertSeverity::Warning => label.yellow(),
        AlertSeverity::Info => label.cyan(),
    }
}
