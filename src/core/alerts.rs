//! Alert lifecycle management.
//!
//! Evaluates metric values against configured thresholds, keeps at most one
//! unresolved alert per `(name, source)` pair, and moves resolved alerts into an
//! append-only history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;

use super::config::{default_alert_rules, AlertsConfig, DEFAULT_THRESHOLD};

/// Source tag attached to every alert raised by the monitor itself.
pub const ALERT_SOURCE: &str = "auto-monitor";

/// Alert severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Error => "error",
            AlertSeverity::Critical => "critical",
        }
    }

    /// Classify a value that reached `threshold` by how far it overshoots.
    ///
    /// Bands: >= 1.2x critical, >= 1.1x error, >= 1.0x warning. Anything below the
    /// threshold maps to info; `check_metric` never asks for that, but other callers may.
    pub fn classify(value: f64, threshold: f64) -> Self {
        if value >= threshold * 1.2 {
            AlertSeverity::Critical
        } else if value >= threshold * 1.1 {
            AlertSeverity::Error
        } else if value >= threshold {
            AlertSeverity::Warning
        } else {
            AlertSeverity::Info
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitoring alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub name: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub metadata: Map<String, Value>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn new(
        name: impl Into<String>,
        severity: AlertSeverity,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            severity,
            message: message.into(),
            timestamp: Utc::now(),
            source: source.into(),
            metadata: Map::new(),
            resolved: false,
            resolved_at: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Mark the alert as resolved now.
    pub fn resolve(&mut self) {
        self.resolved = true;
        self.resolved_at = Some(Utc::now());
    }

    fn same_key(&self, name: &str, source: &str) -> bool {
        self.name == name && self.source == source
    }
}

/// Active alert counts, by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl AlertSummary {
    pub fn count(&self, severity: AlertSeverity) -> usize {
        match severity {
            AlertSeverity::Critical => self.critical,
            AlertSeverity::Error => self.error,
            AlertSeverity::Warning => self.warning,
            AlertSeverity::Info => self.info,
        }
    }
}

impl fmt::Display for AlertSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} critical={} error={} warning={} info={}",
            self.total, self.critical, self.error, self.warning, self.info
        )
    }
}

/// Delivery channel for newly created alerts.
///
/// Called exactly once per alert that enters the active set; refreshes of an
/// existing alert are not delivered again.
pub trait Notifier {
    fn notify(&self, alert: &Alert);
}

/// Writes alerts to the log. The only channel available today.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: &Alert) {
        log::warn!("ALERT: [{}] {}", alert.severity, alert.message);
    }
}

/// Owns the active alert set and the resolution history.
pub struct AlertManager {
    rules: HashMap<String, f64>,
    active: Vec<Alert>,
    history: Vec<Alert>,
    notifier: Box<dyn Notifier>,
}

impl AlertManager {
    pub fn new(config: &AlertsConfig) -> Self {
        Self::with_notifier(config, Box::new(LogNotifier))
    }

    pub fn with_notifier(config: &AlertsConfig, notifier: Box<dyn Notifier>) -> Self {
        let rules = if config.alert_rules.is_empty() {
            default_alert_rules()
        } else {
            config.alert_rules.clone()
        };

        if config.notifications.enabled && !config.notifications.channels.is_empty() {
            log::warn!(
                "Notification channels {:?} are not supported yet, alerts are logged only",
                config.notifications.channels
            );
        }

        Self {
            rules,
            active: Vec::new(),
            history: Vec::new(),
            notifier,
        }
    }

    pub fn rules(&self) -> &HashMap<String, f64> {
        &self.rules
    }

    /// Build an alert for `metric_name` if `value` reached the threshold.
    ///
    /// Without an explicit threshold the `<metric>_threshold` rule is used, falling
    /// back to [`DEFAULT_THRESHOLD`]. The alert is not registered; pass it to
    /// [`AlertManager::add_alert`] for that.
    pub fn check_metric(&self, metric_name: &str, value: f64, threshold: Option<f64>) -> Option<Alert> {
        let threshold = threshold.unwrap_or_else(|| {
            self.rules
                .get(&format!("{}_threshold", metric_name))
                .copied()
                .unwrap_or(DEFAULT_THRESHOLD)
        });

        // NaN never reaches a threshold
        if value.is_nan() || value < threshold {
            return None;
        }

        let severity = AlertSeverity::classify(value, threshold);
        let metadata = json!({
            "metric": metric_name,
            "value": value,
            "threshold": threshold,
        });

        let alert = Alert::new(
            format!("{}_high", metric_name),
            severity,
            format!(
                "{} is at {:.1}% (threshold: {}%)",
                metric_name, value, threshold
            ),
            ALERT_SOURCE,
        );

        Some(match metadata {
            Value::Object(map) => alert.with_metadata(map),
            _ => alert,
        })
    }

    /// Register an alert, merging it into an existing unresolved one with the same key.
    ///
    /// A merge refreshes timestamp and metadata only. The stored severity is kept even
    /// if the new trigger is more severe.
    pub fn add_alert(&mut self, alert: Alert) {
        if let Some(existing) = self
            .active
            .iter_mut()
            .find(|a| !a.resolved && a.same_key(&alert.name, &alert.source))
        {
            log::debug!("Alert {} already exists, updating...", alert.name);
            existing.timestamp = alert.timestamp;
            existing.metadata = alert.metadata;
            return;
        }

        log::info!(
            "New alert: {} - {} - {}",
            alert.name,
            alert.severity,
            alert.message
        );
        self.notifier.notify(&alert);
        self.active.push(alert);
    }

    /// Resolve the first unresolved alert named `name` (and from `source`, if given)
    /// and move it to history. Returns `false` when nothing matched.
    pub fn resolve_alert(&mut self, name: &str, source: Option<&str>) -> bool {
        let position = self.active.iter().position(|a| {
            !a.resolved && a.name == name && source.map_or(true, |s| a.source == s)
        });

        match position {
            Some(index) => {
                let mut alert = self.active.remove(index);
                alert.resolve();
                log::info!("Resolved alert: {}", name);
                self.history.push(alert);
                true
            }
            None => false,
        }
    }

    /// Active alerts, optionally only those of one severity.
    pub fn get_active_alerts(&self, severity: Option<AlertSeverity>) -> Vec<Alert> {
        self.active
            .iter()
            .filter(|a| severity.map_or(true, |s| a.severity == s))
            .cloned()
            .collect()
    }

    /// Mutable access to the active set, for callers that mark alerts resolved in place.
    /// Such alerts stay put until the next [`AlertManager::clear_resolved_alerts`].
    pub fn active_alerts_mut(&mut self) -> impl Iterator<Item = &mut Alert> {
        self.active.iter_mut()
    }

    pub fn history(&self) -> &[Alert] {
        &self.history
    }

    pub fn get_alert_summary(&self) -> AlertSummary {
        let mut summary = AlertSummary {
            total: self.active.len(),
            ..Default::default()
        };

        for alert in &self.active {
            match alert.severity {
                AlertSeverity::Critical => summary.critical += 1,
                AlertSeverity::Error => summary.error += 1,
                AlertSeverity::Warning => summary.warning += 1,
                AlertSeverity::Info => summary.info += 1,
            }
        }

        summary
    }

    /// Move alerts that were marked resolved in place from the active set to history.
    /// Returns how many were moved.
    pub fn clear_resolved_alerts(&mut self) -> usize {
        let (resolved, still_active): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|a| a.resolved);
        self.active = still_active;

        let cleared = resolved.len();
        self.history.extend(resolved);

        log::info!("Cleared {} resolved alerts", cleared);
        cleared
    }
}
