// Tests for the standard collector set

use auto_monitor::core::collectors::{
    default_collectors, ApplicationCollector, CycleSnapshot, MetricCollector, ServiceCollector,
    Snapshot,
};
use auto_monitor::core::config::{
    ApplicationEntry, CheckKind, MetricsConfig, MonitorConfig, ServiceCheck, ServiceEntry,
    ServicesConfig,
};
use auto_monitor::platform::is_port_listening;
use std::net::TcpListener;

#[test]
fn test_default_collectors_order() {
    let collectors = default_collectors(&MonitorConfig::default());
    let names: Vec<_> = collectors.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["system", "service", "application"]);
}

#[test]
fn test_application_collector_reports_placeholder() {
    let mut collector = ApplicationCollector::new(&MetricsConfig {
        enabled: true,
        applications: vec![
            ApplicationEntry {
                name: "billing".to_string(),
            },
            ApplicationEntry {
                name: "search".to_string(),
            },
        ],
    });

    let Snapshot::Application(snapshot) = collector.collect() else {
        panic!("expected application snapshot");
    };
    assert_eq!(snapshot.applications.len(), 2);
    let billing = &snapshot.applications["billing"];
    assert_eq!(billing.status, "unknown");
    assert_eq!(billing.message, "Application metrics not implemented");
}

#[test]
fn test_port_check_reports_closed_port() {
    // Bind then drop to get a port that is very likely free
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut collector = ServiceCollector::new(&ServicesConfig {
        enabled: true,
        monitored_services: vec![ServiceEntry::Check(ServiceCheck {
            name: "db".to_string(),
            kind: CheckKind::Port,
            process_name: None,
            port: Some(port),
            url: None,
        })],
    });

    let Snapshot::Service(snapshot) = collector.collect() else {
        panic!("expected service snapshot");
    };
    let result = &snapshot.services["db"];
    assert!(!result.healthy);
    assert_eq!(result.status, "not_listening");
    assert_eq!(result.port, Some(port));
}

#[test]
fn test_is_port_listening_tracks_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    assert!(is_port_listening(port).unwrap());

    drop(listener);
    assert!(!is_port_listening(port).unwrap());
}

#[test]
fn test_cycle_snapshot_serializes_by_category() {
    let mut cycle = CycleSnapshot::default();
    for collector in default_collectors(&MonitorConfig {
        services: ServicesConfig {
            enabled: true,
            monitored_services: Vec::new(),
        },
        ..Default::default()
    })
    .iter_mut()
    {
        cycle.merge(collector.collect());
    }

    let value = serde_json::to_value(&cycle).unwrap();
    assert!(value["system"]["timestamp"].is_string());
    assert!(value["system"]["load_average"].is_array());
    assert!(value["services"]["services"].as_object().unwrap().is_empty());
    assert!(value["applications"]["applications"].is_object());
}

#[cfg(target_os = "linux")]
#[test]
fn test_process_check_finds_long_process_name() {
    use std::process::Command;
    use tempfile::TempDir;

    let temp_dir = TempDir::new().unwrap();
    let name = "averyveryverylongprocname";
    let binary = temp_dir.path().join(name);
    std::fs::copy("/bin/sleep", &binary).unwrap();

    let mut child = Command::new(&binary).arg("30").spawn().unwrap();

    let mut collector = ServiceCollector::new(&ServicesConfig {
        enabled: true,
        monitored_services: vec![ServiceEntry::Name(name.to_string())],
    });
    let Snapshot::Service(snapshot) = collector.collect() else {
        panic!("expected service snapshot");
    };

    child.kill().unwrap();
    child.wait().unwrap();

    let result = &snapshot.services[name];
    assert!(result.healthy, "{:?}", result);
    assert_eq!(result.status, "running");
    assert_eq!(result.pid, Some(child.id()));
}
