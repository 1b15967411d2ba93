// UI and formatting module

pub mod formatters;
pub mod monitor_formatters;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_percent, format_severity, format_size, format_time};
pub use monitor_formatters::{print_alert_report, print_snapshot};
