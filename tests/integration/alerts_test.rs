// Tests for alert evaluation, deduplication and resolution

use auto_monitor::core::alerts::{Alert, AlertManager, AlertSeverity, ALERT_SOURCE};
use auto_monitor::core::config::{AlertsConfig, MonitorConfig};

fn manager_with_cpu_threshold(threshold: f64) -> AlertManager {
    let mut config = MonitorConfig::default().alerts;
    config
        .alert_rules
        .insert("cpu_threshold".to_string(), threshold);
    AlertManager::new(&config)
}

#[test]
fn test_severity_bands_for_threshold_80() {
    let manager = manager_with_cpu_threshold(80.0);

    let cases = [
        (97.0, Some(AlertSeverity::Critical)),
        (89.0, Some(AlertSeverity::Error)),
        (81.0, Some(AlertSeverity::Warning)),
        (80.0, Some(AlertSeverity::Warning)),
        (79.9, None),
    ];

    for (value, expected) in cases {
        let severity = manager
            .check_metric("cpu", value, None)
            .map(|alert| alert.severity);
        assert_eq!(severity, expected, "cpu at {}", value);
    }
}

#[test]
fn test_explicit_threshold_overrides_rule() {
    let manager = manager_with_cpu_threshold(80.0);
    assert!(manager.check_metric("cpu", 50.0, Some(40.0)).is_some());
    assert!(manager.check_metric("cpu", 90.0, Some(95.0)).is_none());
}

#[test]
fn test_unconfigured_metric_uses_default_threshold() {
    let manager = manager_with_cpu_threshold(80.0);
    assert!(manager.check_metric("gpu", 99.0, None).is_none());
    assert!(manager.check_metric("gpu", 100.0, None).is_some());
}

#[test]
fn test_alert_carries_metric_metadata() {
    let manager = manager_with_cpu_threshold(80.0);
    let alert = manager.check_metric("cpu", 90.0, None).unwrap();

    assert_eq!(alert.name, "cpu_high");
    assert_eq!(alert.source, ALERT_SOURCE);
    assert_eq!(alert.metadata["metric"], "cpu");
    assert_eq!(alert.metadata["value"], 90.0);
    assert_eq!(alert.metadata["threshold"], 80.0);
    assert!(!alert.resolved);
    assert!(alert.resolved_at.is_none());
}

#[test]
fn test_duplicate_alerts_collapse_to_one() {
    let mut manager = manager_with_cpu_threshold(80.0);

    for value in [85.0, 90.0, 99.0] {
        let alert = manager.check_metric("cpu", value, None).unwrap();
        manager.add_alert(alert);
    }

    let active = manager.get_active_alerts(None);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, AlertSeverity::Warning);
    assert_eq!(active[0].metadata["value"], 99.0);
}

#[test]
fn test_same_name_different_source_are_distinct() {
    let mut manager = AlertManager::new(&AlertsConfig::default());
    manager.add_alert(Alert::new("disk_high", AlertSeverity::Warning, "a", "host-a"));
    manager.add_alert(Alert::new("disk_high", AlertSeverity::Warning, "b", "host-b"));
    assert_eq!(manager.get_alert_summary().total, 2);

    assert!(manager.resolve_alert("disk_high", Some("host-b")));
    let active = manager.get_active_alerts(None);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].source, "host-a");
}

#[test]
fn test_resolve_nonexistent_is_noop() {
    let mut manager = AlertManager::new(&AlertsConfig::default());
    manager.add_alert(Alert::new("cpu_high", AlertSeverity::Error, "hot", ALERT_SOURCE));

    assert!(!manager.resolve_alert("memory_high", None));
    assert!(!manager.resolve_alert("cpu_high", Some("elsewhere")));
    assert_eq!(manager.get_alert_summary().total, 1);
    assert!(manager.history().is_empty());
}

#[test]
fn test_resolved_alert_can_fire_again() {
    let mut manager = manager_with_cpu_threshold(80.0);

    manager.add_alert(manager.check_metric("cpu", 90.0, None).unwrap());
    assert!(manager.resolve_alert("cpu_high", Some(ALERT_SOURCE)));
    manager.add_alert(manager.check_metric("cpu", 99.0, None).unwrap());

    let active = manager.get_active_alerts(None);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].severity, AlertSeverity::Critical);
    assert_eq!(manager.history().len(), 1);
}

#[test]
fn test_summary_totals_match_severity_counts() {
    let mut manager = AlertManager::new(&AlertsConfig::default());
    let severities = [
        AlertSeverity::Critical,
        AlertSeverity::Error,
        AlertSeverity::Error,
        AlertSeverity::Warning,
        AlertSeverity::Info,
    ];
    for (i, severity) in severities.iter().enumerate() {
        manager.add_alert(Alert::new(format!("alert_{}", i), *severity, "m", ALERT_SOURCE));
    }

    let summary = manager.get_alert_summary();
    assert_eq!(summary.total, 5);
    assert_eq!(
        summary.critical + summary.error + summary.warning + summary.info,
        summary.total
    );
    assert_eq!(summary.count(AlertSeverity::Error), 2);
    assert_eq!(
        manager
            .get_active_alerts(Some(AlertSeverity::Error))
            .len(),
        2
    );
}

#[test]
fn test_clear_resolved_moves_in_place_resolutions() {
    let mut manager = AlertManager::new(&AlertsConfig::default());
    manager.add_alert(Alert::new("a", AlertSeverity::Warning, "m", ALERT_SOURCE));
    manager.add_alert(Alert::new("b", AlertSeverity::Warning, "m", ALERT_SOURCE));

    if let Some(alert) = manager.active_alerts_mut().find(|a| a.name == "a") {
        alert.resolve();
    }

    assert_eq!(manager.clear_resolved_alerts(), 1);
    assert_eq!(manager.get_alert_summary().total, 1);
    assert_eq!(manager.history()[0].name, "a");
    assert_eq!(manager.clear_resolved_alerts(), 0);
}

#[test]
fn test_empty_rules_fall_back_to_defaults() {
    let config = AlertsConfig {
        alert_rules: Default::default(),
        ..Default::default()
    };
    let manager = AlertManager::new(&config);
    assert_eq!(manager.rules().get("cpu_threshold"), Some(&80.0));
    assert_eq!(manager.rules().get("disk_threshold"), Some(&90.0));
}

#[test]
fn test_clear_after_resolve_does_not_duplicate_history() {
    let mut manager = manager_with_cpu_threshold(80.0);
    manager.add_alert(manager.check_metric("cpu", 90.0, None).unwrap());

    assert!(manager.resolve_alert("cpu_high", None));
    assert_eq!(manager.clear_resolved_alerts(), 0);

    let history = manager.history();
    assert_eq!(history.len(), 1);
    assert!(history[0].resolved);
    assert!(history[0].resolved_at.is_some());
    assert!(manager.get_active_alerts(None).is_empty());
}
