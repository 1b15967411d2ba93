use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{MetricCollector, Snapshot};
use crate::core::config::{ApplicationEntry, MetricsConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStatus {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSnapshot {
    pub timestamp: DateTime<Utc>,
    pub applications: BTreeMap<String, ApplicationStatus>,
}

/// Placeholder for application-specific metrics (APIs, log files, ...).
/// Reports every configured application as not implemented.
pub struct ApplicationCollector {
    enabled: bool,
    applications: Vec<ApplicationEntry>,
}

impl ApplicationCollector {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            enabled: config.enabled,
            applications: config.applications.clone(),
        }
    }
}

impl MetricCollector for ApplicationCollector {
    fn name(&self) -> &'static str {
        "application"
    }

    fn collect(&mut self) -> Snapshot {
        let applications = if self.enabled {
            self.applications
                .iter()
                .map(|app| {
                    (
                        app.name.clone(),
                        ApplicationStatus {
                            status: "unknown".to_string(),
                            message: "Application metrics not implemented".to_string(),
                        },
                    )
                })
                .collect()
        } else {
            BTreeMap::new()
        };

        Snapshot::Application(ApplicationSnapshot {
            timestamp: Utc::now(),
            applications,
        })
    }
}
