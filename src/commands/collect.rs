use anyhow::{Context, Result};

use crate::core::config::MonitorConfig;
use crate::core::monitor::Monitor;
use crate::ui::print_snapshot;

/// Run a single collect-and-store pass, then exit
pub fn execute(config: &MonitorConfig) -> Result<()> {
    log::info!("Running in collect-only mode");

    let mut monitor = Monitor::new(config).context("Failed to initialize monitor")?;
    let snapshot = monitor
        .collect_once()
        .context("Collection cycle failed")?;

    print_snapshot(&snapshot, config);
    Ok(())
}
