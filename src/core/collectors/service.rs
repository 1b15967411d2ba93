use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use sysinfo::{Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

use super::{MetricCollector, Snapshot};
use crate::core::config::{CheckKind, ServiceCheck, ServiceEntry, ServicesConfig};
use crate::platform::is_port_listening;

/// Longest process name the Linux kernel keeps in `comm`
const COMM_NAME_LEN: usize = 15;

/// Outcome of one service health check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCheckResult {
    pub healthy: bool,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceCheckResult {
    pub fn healthy(status: impl Into<String>) -> Self {
        Self {
            healthy: true,
            status: status.into(),
            pid: None,
            memory_percent: None,
            cpu_percent: None,
            port: None,
            error: None,
        }
    }

    pub fn unhealthy(status: impl Into<String>, error: Option<String>) -> Self {
        Self {
            healthy: false,
            error,
            ..Self::healthy(status)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    pub timestamp: DateTime<Utc>,
    pub services: BTreeMap<String, ServiceCheckResult>,
}

/// Runs the configured service checks
pub struct ServiceCollector {
    enabled: bool,
    services: Vec<ServiceEntry>,
    system: System,
}

impl ServiceCollector {
    pub fn new(config: &ServicesConfig) -> Self {
        Self {
            enabled: config.enabled,
            services: config.monitored_services.clone(),
            system: System::new(),
        }
    }

    fn refresh_processes(&mut self) {
        self.system.refresh_memory();
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cpu()
                .with_memory()
                .with_exe(UpdateKind::OnlyIfNotSet)
                .with_cmd(UpdateKind::OnlyIfNotSet),
        );
    }

    fn check_service(&self, check: &ServiceCheck) -> ServiceCheckResult {
        match &check.kind {
            CheckKind::Process => self.check_process(check),
            CheckKind::Http => check_http_endpoint(check),
            CheckKind::Port => check_port(check),
            CheckKind::Other(kind) => {
                log::warn!("Unknown service check type: {}", kind);
                ServiceCheckResult::unhealthy(
                    "unknown",
                    Some(format!("unknown check type: {}", kind)),
                )
            }
        }
    }

    fn check_process(&self, check: &ServiceCheck) -> ServiceCheckResult {
        let process_name = check.process_name.as_deref().unwrap_or(&check.name);
        let total_memory = self.system.total_memory();

        let found = self
            .system
            .processes()
            .values()
            .find(|p| process_matches(p, process_name));

        match found {
            Some(process) => ServiceCheckResult {
                pid: Some(process.pid().as_u32()),
                memory_percent: Some(if total_memory > 0 {
                    (process.memory() as f32 / total_memory as f32) * 100.0
                } else {
                    0.0
                }),
                cpu_percent: Some(process.cpu_usage()),
                ..ServiceCheckResult::healthy("running")
            },
            None => ServiceCheckResult::unhealthy(
                "not_found",
                Some(format!("Process {} not found", process_name)),
            ),
        }
    }
}

fn process_matches(process: &Process, target: &str) -> bool {
    let argv0 = process.cmd().first().map(|arg| arg.as_os_str());
    name_matches(process.name(), process.exe(), argv0, target)
}

/// Whether a process is `target`, looking past the kernel's 15-byte `comm` cut.
///
/// A full-length `comm` that is a prefix of `target` is confirmed against the file
/// name of the executable or of `argv[0]`.
fn name_matches(name: &OsStr, exe: Option<&Path>, argv0: Option<&OsStr>, target: &str) -> bool {
    let target = OsStr::new(target);
    if name == target {
        return true;
    }

    let name = name.as_encoded_bytes();
    if name.len() != COMM_NAME_LEN || !target.as_encoded_bytes().starts_with(name) {
        return false;
    }

    exe.and_then(Path::file_name) == Some(target)
        || argv0.map(Path::new).and_then(Path::file_name) == Some(target)
}

// TODO: issue a GET against `check.url` with a timeout once an HTTP client is added
fn check_http_endpoint(check: &ServiceCheck) -> ServiceCheckResult {
    log::warn!("HTTP health check not implemented for {}", check.name);
    ServiceCheckResult::healthy("unknown")
}

fn check_port(check: &ServiceCheck) -> ServiceCheckResult {
    let Some(port) = check.port.filter(|p| *p != 0) else {
        return ServiceCheckResult::unhealthy("error", Some("No port specified".to_string()));
    };

    match is_port_listening(port) {
        Ok(true) => ServiceCheckResult {
            port: Some(port),
            ..ServiceCheckResult::healthy("listening")
        },
        Ok(false) => ServiceCheckResult {
            port: Some(port),
            ..ServiceCheckResult::unhealthy("not_listening", None)
        },
        Err(e) => {
            log::error!("Error checking port {}: {}", port, e);
            ServiceCheckResult::unhealthy("error", Some(e.to_string()))
        }
    }
}

impl MetricCollector for ServiceCollector {
    fn name(&self) -> &'static str {
        "service"
    }

    fn collect(&mut self) -> Snapshot {
        let mut snapshot = ServiceSnapshot {
            timestamp: Utc::now(),
            services: BTreeMap::new(),
        };

        if !self.enabled || self.services.is_empty() {
            return Snapshot::Service(snapshot);
        }

        let needs_processes = self
            .services
            .iter()
            .any(|s| s.to_check().kind == CheckKind::Process);
        if needs_processes {
            self.refresh_processes();
        }

        for entry in &self.services {
            let check = entry.to_check();
            let result = self.check_service(&check);
            log::debug!("Service {}: {:?}", check.name, result);
            snapshot.services.insert(check.name, result);
        }

        Snapshot::Service(snapshot)
    }
}
