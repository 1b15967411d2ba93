use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Threshold used by `check_metric` when no rule is configured for a metric.
pub const DEFAULT_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub version: String,
    pub system: SystemConfig,
    pub services: ServicesConfig,
    pub metrics: MetricsConfig,
    pub alerts: AlertsConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub enabled: bool,
    /// Suggested collection interval in seconds (the CLI flag wins)
    pub interval: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub enabled: bool,
    pub monitored_services: Vec<ServiceEntry>,
}

/// A monitored service: either a bare process name or a full check definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceEntry {
    Name(String),
    Check(ServiceCheck),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCheck {
    #[serde(default = "unknown_name")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CheckKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    #[default]
    Process,
    Http,
    Port,
    /// Any other `type` string, kept so the collector can report it
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub applications: Vec<ApplicationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationEntry {
    #[serde(default = "unknown_name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub enabled: bool,
    /// `<metric>_threshold -> percent`
    pub alert_rules: HashMap<String, f64>,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub enabled: bool,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub retention_days: u32,
    /// Directory for file storage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Per-metric cap for memory storage
    pub max_size: usize,
}

fn unknown_name() -> String {
    "unknown".to_string()
}

impl ServiceEntry {
    pub fn name(&self) -> &str {
        match self {
            ServiceEntry::Name(name) => name,
            ServiceEntry::Check(check) => &check.name,
        }
    }

    /// Normalize into a full check definition (bare names are process checks).
    pub fn to_check(&self) -> ServiceCheck {
        match self {
            ServiceEntry::Name(name) => ServiceCheck {
                name: name.clone(),
                kind: CheckKind::Process,
                process_name: None,
                port: None,
                url: None,
            },
            ServiceEntry::Check(check) => check.clone(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            system: SystemConfig::default(),
            services: ServicesConfig::default(),
            metrics: MetricsConfig::default(),
            alerts: AlertsConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 60,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            monitored_services: vec![
                ServiceEntry::Check(ServiceCheck {
                    name: "synergymesh-core".to_string(),
                    kind: CheckKind::Process,
                    process_name: Some("python".to_string()),
                    port: None,
                    url: None,
                }),
                ServiceEntry::Check(ServiceCheck {
                    name: "contract-service".to_string(),
                    kind: CheckKind::Process,
                    process_name: Some("node".to_string()),
                    port: None,
                    url: None,
                }),
            ],
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            applications: Vec::new(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alert_rules: default_alert_rules(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: "memory".to_string(),
            retention_days: 7,
            path: None,
            max_size: 10_000,
        }
    }
}

/// Built-in alert rules, used when the config does not provide any.
pub fn default_alert_rules() -> HashMap<String, f64> {
    HashMap::from([
        ("cpu_threshold".to_string(), 80.0),
        ("memory_threshold".to_string(), 85.0),
        ("disk_threshold".to_string(), 90.0),
        ("service_down_threshold".to_string(), 1.0),
    ])
}

impl MonitorConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing, unreadable or malformed file is logged and replaced by the defaults,
    /// so the monitor can always start.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::warn!("Config file {:?} not found, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path)
            .map_err(MonitorError::from)
            .and_then(|text| Self::from_yaml_str(&text))
        {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path);
                config
            }
            Err(e) => {
                log::error!("Error loading config from {:?}: {}", path, e);
                log::info!("Using default configuration");
                Self::default()
            }
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let text = serde_yaml::to_string(self)?;
        fs::write(path, text)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Check the configuration for values the monitor cannot work with.
    ///
    /// Thresholds outside 0-100 are suspicious but allowed; they only produce a warning.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(MonitorError::config("missing version"));
        }

        for (name, value) in &self.alerts.alert_rules {
            if !value.is_finite() {
                return Err(MonitorError::config(format!(
                    "invalid threshold value for {}: {}",
                    name, value
                )));
            }
            if *value < 0.0 || *value > 100.0 {
                log::warn!(
                    "Threshold {} = {} is outside normal range [0-100]",
                    name,
                    value
                );
            }
        }

        for service in &self.services.monitored_services {
            if service.name().trim().is_empty() {
                return Err(MonitorError::config("service entry with empty name"));
            }
        }

        log::info!("Configuration validation passed");
        Ok(())
    }

    /// Configured threshold for `metric`, or [`DEFAULT_THRESHOLD`].
    pub fn threshold(&self, metric: &str) -> f64 {
        self.alerts
            .alert_rules
            .get(&format!("{}_threshold", metric))
            .copied()
            .unwrap_or(DEFAULT_THRESHOLD)
    }
}
