use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use auto_monitor::commands::{self, Mode};
use auto_monitor::core::config::MonitorConfig;

const DEFAULT_CONFIG_PATH: &str = "config/auto-monitor.yaml";

fn cli() -> Command {
    Command::new("auto-monitor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Self-hosted health monitor for system metrics and services")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to configuration file")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_name("MODE")
                .help("Operation mode")
                .value_parser(Mode::NAMES)
                .default_value("monitor"),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .value_name("SECONDS")
                .help("Collection interval in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("60"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("daemon")
                .long("daemon")
                .help("Run as daemon")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    auto_monitor::init_logging(matches.get_flag("verbose"));

    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = MonitorConfig::load(&config_path);
    config.validate().context("Invalid configuration")?;

    let mode: Mode = matches
        .get_one::<String>("mode")
        .map(String::as_str)
        .unwrap_or("monitor")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let interval = matches.get_one::<u64>("interval").copied().unwrap_or(60);

    let result = match mode {
        Mode::Collect => commands::collect::execute(&config),
        Mode::Alert => commands::alert::execute(&config),
        Mode::Monitor => {
            commands::monitor::execute(&config, interval, matches.get_flag("daemon"))
        }
    };

    if let Err(e) = &result {
        log::error!("Error: {:#}", e);
    } else {
        log::info!("Shutting down...");
    }
    result
}
