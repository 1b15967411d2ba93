//! The collection loop.
//!
//! One cycle runs strictly in order: collect (system, service, application),
//! persist, evaluate thresholds and service health, sweep resolved alerts.
//! An interrupt is only observed between cycles.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::alerts::{Alert, AlertManager, AlertSeverity, AlertSummary, ALERT_SOURCE};
use super::collectors::{
    default_collectors, CycleSnapshot, MetricCollector, ServiceSnapshot, SystemSnapshot,
};
use super::config::MonitorConfig;
use super::storage::{create_storage, MetricStorage};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Collecting,
    Evaluating,
    Sleeping,
    Stopped,
}

pub struct Monitor {
    alert_manager: AlertManager,
    collectors: Vec<Box<dyn MetricCollector>>,
    storage: Box<dyn MetricStorage>,
    alerts_enabled: bool,
    state: MonitorState,
    running: bool,
    shutdown: Arc<AtomicBool>,
    iteration: u64,
}

impl Monitor {
    /// Build the monitor with the standard collectors and the configured storage.
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        let storage = create_storage(&config.storage)?;
        Ok(Self::with_parts(config, default_collectors(config), storage))
    }

    /// Build the monitor from explicit parts. Collectors run in the given order.
    pub fn with_parts(
        config: &MonitorConfig,
        collectors: Vec<Box<dyn MetricCollector>>,
        storage: Box<dyn MetricStorage>,
    ) -> Self {
        let monitor = Self {
            alert_manager: AlertManager::new(&config.alerts),
            collectors,
            storage,
            alerts_enabled: config.alerts.enabled,
            state: MonitorState::Idle,
            running: false,
            shutdown: Arc::new(AtomicBool::new(false)),
            iteration: 0,
        };
        log::info!("Auto-monitor initialized");
        monitor
    }

    /// Use an externally owned shutdown flag (e.g. one shared with a signal handler).
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = flag;
        self
    }

    pub fn alert_manager(&self) -> &AlertManager {
        &self.alert_manager
    }

    pub fn alert_manager_mut(&mut self) -> &mut AlertManager {
        &mut self.alert_manager
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Flag that requests an orderly stop at the next cycle boundary.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Collect and persist, without evaluating alerts.
    pub fn collect_once(&mut self) -> Result<CycleSnapshot> {
        log::info!("Starting collection cycle...");
        let snapshot = self.collect();
        self.persist(&snapshot)?;
        self.state = MonitorState::Idle;
        log::info!("Collection cycle complete");
        Ok(snapshot)
    }

    /// Collect and evaluate, without writing to storage.
    pub fn check_alerts_once(&mut self) -> AlertSummary {
        log::info!("Checking alerts...");
        let snapshot = self.collect();
        self.evaluate(&snapshot);
        self.state = MonitorState::Idle;
        self.log_summary()
    }

    /// One full cycle: collect, persist, evaluate, sweep resolved alerts.
    pub fn run_cycle(&mut self) -> Result<AlertSummary> {
        let snapshot = self.collect();
        self.persist(&snapshot)?;
        self.evaluate(&snapshot);
        self.alert_manager.clear_resolved_alerts();
        Ok(self.log_summary())
    }

    /// Run cycles every `interval` until shutdown is requested.
    ///
    /// An interrupt ends the loop normally. Any other error stops the monitor and is
    /// returned to the caller.
    pub fn run(&mut self, interval: Duration, daemon: bool) -> Result<()> {
        self.running = true;
        log::info!(
            "Starting auto-monitor (interval: {}s, daemon: {})",
            interval.as_secs(),
            daemon
        );

        loop {
            if self.shutdown_requested() {
                log::info!("Received interrupt signal");
                self.stop();
                return Ok(());
            }

            self.iteration += 1;
            log::info!("Starting iteration {}", self.iteration);

            if let Err(e) = self.run_cycle() {
                log::error!("Fatal error in iteration {}: {}", self.iteration, e);
                self.stop();
                return Err(e);
            }

            if self.shutdown_requested() {
                log::info!("Received interrupt signal");
                self.stop();
                return Ok(());
            }

            self.state = MonitorState::Sleeping;
            log::debug!("Sleeping for {}s...", interval.as_secs());
            std::thread::sleep(interval);
        }
    }

    /// Stop the monitor and report what is still firing.
    pub fn stop(&mut self) {
        log::info!("Stopping auto-monitor...");
        self.running = false;
        self.state = MonitorState::Stopped;

        let summary = self.alert_manager.get_alert_summary();
        if summary.total > 0 {
            log::warn!("Shutting down with {} active alerts", summary.total);
            for alert in self.alert_manager.get_active_alerts(None) {
                log::warn!("  - {}: {}", alert.name, alert.message);
            }
        }
    }

    fn collect(&mut self) -> CycleSnapshot {
        self.state = MonitorState::Collecting;
        let mut snapshot = CycleSnapshot::default();

        for collector in self.collectors.iter_mut() {
            let collected = collector.collect();
            log::debug!("Collected {} metrics: {:?}", collector.name(), collected);
            snapshot.merge(collected);
        }

        snapshot
    }

    /// Best-effort write; storage failures are logged and the cycle continues.
    fn persist(&mut self, snapshot: &CycleSnapshot) -> Result<()> {
        let mut entries: Vec<(&str, Value)> = Vec::with_capacity(3);
        if let Some(system) = &snapshot.system {
            entries.push(("system", serde_json::to_value(system)?));
        }
        if let Some(services) = &snapshot.services {
            entries.push(("services", serde_json::to_value(services)?));
        }
        if let Some(applications) = &snapshot.applications {
            entries.push(("applications", serde_json::to_value(applications)?));
        }

        log::debug!("Storing metrics: {} categories", entries.len());
        for (name, value) in entries {
            if let Err(e) = self.storage.store_metric(name, value, None) {
                log::error!("Failed to store {} metrics: {}", name, e);
            }
        }
        Ok(())
    }

    fn evaluate(&mut self, snapshot: &CycleSnapshot) {
        self.state = MonitorState::Evaluating;
        if !self.alerts_enabled {
            log::debug!("Alerting disabled, skipping evaluation");
            return;
        }

        if let Some(system) = &snapshot.system {
            self.check_system_alerts(system);
        }
        if let Some(services) = &snapshot.services {
            self.check_service_alerts(services);
        }
    }

    fn check_system_alerts(&mut self, system: &SystemSnapshot) {
        let readings = [
            ("cpu", system.cpu_percent),
            ("memory", system.memory_percent),
            ("disk", system.disk_percent),
        ];

        for (metric, value) in readings {
            let Some(value) = value else {
                continue;
            };

            match self.alert_manager.check_metric(metric, value, None) {
                Some(alert) => self.alert_manager.add_alert(alert),
                None => {
                    self.alert_manager
                        .resolve_alert(&format!("{}_high", metric), Some(ALERT_SOURCE));
                }
            }
        }
    }

    fn check_service_alerts(&mut self, services: &ServiceSnapshot) {
        for (name, result) in &services.services {
            let alert_name = service_alert_name(name);

            if result.healthy {
                self.alert_manager.resolve_alert(&alert_name, Some(ALERT_SOURCE));
                continue;
            }

            let metadata = json!({
                "service": name,
                "status": result.status,
            });
            let mut alert = Alert::new(
                alert_name,
                AlertSeverity::Error,
                format!("Service {} is unhealthy", name),
                ALERT_SOURCE,
            );
            if let Value::Object(map) = metadata {
                alert = alert.with_metadata(map);
            }
            self.alert_manager.add_alert(alert);
        }
    }

    fn log_summary(&self) -> AlertSummary {
        let summary = self.alert_manager.get_alert_summary();
        if summary.total > 0 {
            log::warn!("Active alerts: {}", summary);
        } else {
            log::info!("No active alerts");
        }
        summary
    }
}

/// Name of the alert raised while service `name` is unhealthy.
pub fn service_alert_name(name: &str) -> String {
    format!("service_{}_down", name)
}
