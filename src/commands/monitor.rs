//! Continuous monitoring command handler.

use anyhow::{Context, Result};
use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::core::config::MonitorConfig;
use crate::core::monitor::Monitor;

/// Run the monitor loop until Ctrl+C
pub fn execute(config: &MonitorConfig, interval_secs: u64, daemon: bool) -> Result<()> {
    let mut monitor = Monitor::new(config).context("Failed to initialize monitor")?;

    // The flag is checked between cycles only
    let shutdown = monitor.shutdown_handle();
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    log::info!("Starting auto-monitor (interval: {}s)", interval_secs);
    monitor
        .run(Duration::from_secs(interval_secs), daemon)
        .context("Monitor loop failed")
}
