//! Metric collectors.
//!
//! Every collector is best-effort: `collect` never fails. Internal errors are logged
//! and yield a partial (or empty) snapshot.

mod application;
mod service;
mod system;

pub use application::{ApplicationCollector, ApplicationSnapshot, ApplicationStatus};
pub use service::{ServiceCheckResult, ServiceCollector, ServiceSnapshot};
pub use system::{
    DiskUsage, MemoryUsage, NetworkCounters, SystemCollector, SystemSnapshot,
};

use serde::Serialize;

use super::config::MonitorConfig;

/// One collector's readings at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Snapshot {
    System(SystemSnapshot),
    Service(ServiceSnapshot),
    Application(ApplicationSnapshot),
}

/// A source of metric snapshots.
pub trait MetricCollector {
    fn name(&self) -> &'static str;

    fn collect(&mut self) -> Snapshot;
}

/// The collectors run each cycle, in order: system, service, application.
pub fn default_collectors(config: &MonitorConfig) -> Vec<Box<dyn MetricCollector>> {
    vec![
        Box::new(SystemCollector::new(&config.system)),
        Box::new(ServiceCollector::new(&config.services)),
        Box::new(ApplicationCollector::new(&config.metrics)),
    ]
}

/// Snapshots gathered during one monitor cycle, merged by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<ServiceSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applications: Option<ApplicationSnapshot>,
}

impl CycleSnapshot {
    pub fn merge(&mut self, snapshot: Snapshot) {
        match snapshot {
            Snapshot::System(s) => self.system = Some(s),
            Snapshot::Service(s) => self.services = Some(s),
            Snapshot::Application(s) => self.applications = Some(s),
        }
    }
}
