use anyhow::{Context, Result};

use crate::core::config::MonitorConfig;
use crate::core::monitor::Monitor;
use crate::ui::print_alert_report;

/// Run a single collect-and-evaluate pass (nothing is stored), then exit
pub fn execute(config: &MonitorConfig) -> Result<()> {
    log::info!("Running in alert-only mode");

    let mut monitor = Monitor::new(config).context("Failed to initialize monitor")?;
    let summary = monitor.check_alerts_once();
    let alerts = monitor.alert_manager().get_active_alerts(None);

    print_alert_report(&summary, &alerts);
    Ok(())
}
