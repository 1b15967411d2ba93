use colored::*;

use super::formatters::{format_percent, format_severity, format_size, format_time};
use crate::core::alerts::{Alert, AlertSummary};
use crate::core::collectors::{CycleSnapshot, ServiceSnapshot, SystemSnapshot};
use crate::core::config::MonitorConfig;

/// Print a collected snapshot for the collect-only mode
pub fn print_snapshot(snapshot: &CycleSnapshot, config: &MonitorConfig) {
    println!("\n{}", "COLLECTED METRICS".bold().bright_cyan());
    println!("{}", "=".repeat(60));

    if let Some(system) = &snapshot.system {
        print_system(system, config);
    }

    if let Some(services) = &snapshot.services {
        print_services(services);
    }

    if let Some(applications) = &snapshot.applications {
        if !applications.applications.is_empty() {
            print_section_header("Applications");
            for (name, app) in &applications.applications {
                println!("  {}: {} ({})", name, app.status, app.message.dimmed());
            }
        }
    }

    println!();
}

/// Print the alert summary and the active alerts
pub fn print_alert_report(summary: &AlertSummary, alerts: &[Alert]) {
    println!("\n{}", "ALERTS".bold().bright_cyan());
    println!("{}", "=".repeat(60));

    if summary.total == 0 {
        println!("  {}", "No active alerts".green());
        println!();
        return;
    }

    println!(
        "  {} active: {} critical, {} error, {} warning, {} info",
        summary.total, summary.critical, summary.error, summary.warning, summary.info
    );
    println!();

    for alert in alerts {
        println!(
            "  [{}] {} - {} {}",
            format_severity(alert.severity),
            alert.name.bold(),
            alert.message,
            format!("(since {})", format_time(alert.timestamp)).dimmed()
        );
    }
    println!();
}

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

fn print_system(system: &SystemSnapshot, config: &MonitorConfig) {
    print_section_header("System");

    if let Some(hostname) = &system.hostname {
        println!("  Host: {}", hostname);
    }
    if let Some(platform) = &system.platform {
        println!("  Platform: {}", platform);
    }

    if let (Some(count), Some(percent)) = (system.cpu_count, system.cpu_percent) {
        println!(
            "  CPU: {} across {} cores",
            format_percent(percent, config.threshold("cpu")),
            count
        );
    }

    if let Some(memory) = &system.memory {
        println!(
            "  Memory: {} ({} used of {}, {} available)",
            format_percent(memory.percent, config.threshold("memory")),
            format_size(memory.used),
            format_size(memory.total),
            format_size(memory.available)
        );
    }

    if let Some(disk) = &system.disk {
        println!(
            "  Disk {}: {} ({} used of {}, {} free)",
            disk.mount_point,
            format_percent(disk.percent, config.threshold("disk")),
            format_size(disk.used),
            format_size(disk.total),
            format_size(disk.free)
        );
    }

    if let Some(network) = &system.network {
        println!(
            "  Network: {} sent, {} received ({} errors in, {} out)",
            format_size(network.bytes_sent),
            format_size(network.bytes_recv),
            network.errin,
            network.errout
        );
    }

    let [one, five, fifteen] = system.load_average;
    println!("  Load average: {:.2} {:.2} {:.2}", one, five, fifteen);
}

fn print_services(services: &ServiceSnapshot) {
    if services.services.is_empty() {
        return;
    }

    print_section_header("Services");
    for (name, result) in &services.services {
        let status = if result.healthy {
            result.status.green()
        } else {
            result.status.red().bold()
        };

        let mut line = format!("  {}: {}", name, status);
        if let Some(pid) = result.pid {
            line.push_str(&format!(" (pid {})", pid));
        }
        if let Some(port) = result.port {
            line.push_str(&format!(" (port {})", port));
        }
        if let Some(error) = &result.error {
            line.push_str(&format!(" - {}", error.dimmed()));
        }
        println!("{}", line);
    }
}
