// Tests for the file-backed metric storage

use auto_monitor::core::config::StorageConfig;
use auto_monitor::core::storage::{create_storage, FileStorage, MetricStorage};
use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_file_storage_writes_daily_files() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(temp_dir.path()).unwrap();

    let day_one = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let day_two = Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap();
    storage
        .store_metric("system", json!({"cpu_percent": 12.5}), Some(day_one))
        .unwrap();
    storage
        .store_metric("system", json!({"cpu_percent": 40.0}), Some(day_one))
        .unwrap();
    storage
        .store_metric("system", json!({"cpu_percent": 7.0}), Some(day_two))
        .unwrap();

    assert!(temp_dir.path().join("system_2024-05-01.json").exists());
    assert!(temp_dir.path().join("system_2024-05-02.json").exists());

    let records = storage
        .retrieve_metrics("system", Some(day_one), Some(day_two))
        .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].value["cpu_percent"], 7.0);
}

#[test]
fn test_file_storage_range_filters_within_day() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(temp_dir.path()).unwrap();

    for hour in [1, 5, 9] {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap();
        storage.store_metric("services", json!(hour), Some(ts)).unwrap();
    }

    let start = Utc.with_ymd_and_hms(2024, 5, 1, 4, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let records = storage
        .retrieve_metrics("services", Some(start), Some(end))
        .unwrap();

    let values: Vec<_> = records.iter().map(|r| r.value.clone()).collect();
    assert_eq!(values, vec![json!(5), json!(9)]);
}

#[test]
fn test_file_storage_default_lookback_sees_recent_data() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(temp_dir.path()).unwrap();

    storage
        .store_metric("system", json!({"ok": true}), Some(Utc::now() - Duration::hours(1)))
        .unwrap();

    assert_eq!(storage.retrieve_metrics("system", None, None).unwrap().len(), 1);
    assert!(storage.retrieve_metrics("other", None, None).unwrap().is_empty());
}

#[test]
fn test_file_storage_delete_old_files() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(temp_dir.path()).unwrap();

    let old = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
    let recent = Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap();
    storage.store_metric("system", json!(1), Some(old)).unwrap();
    storage.store_metric("services", json!(2), Some(old)).unwrap();
    storage.store_metric("system", json!(3), Some(recent)).unwrap();
    fs::write(temp_dir.path().join("notes.json"), "{}").unwrap();

    let cutoff = Utc.with_ymd_and_hms(2024, 4, 10, 0, 0, 0).unwrap();
    assert_eq!(storage.delete_old_metrics(cutoff).unwrap(), 2);

    assert!(!temp_dir.path().join("system_2024-04-01.json").exists());
    assert!(temp_dir.path().join("system_2024-04-20.json").exists());
    assert!(temp_dir.path().join("notes.json").exists());
}

#[test]
fn test_corrupt_file_is_skipped_on_read() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileStorage::new(temp_dir.path()).unwrap();

    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    fs::write(temp_dir.path().join("system_2024-06-01.json"), "not json").unwrap();

    let records = storage
        .retrieve_metrics("system", Some(ts), Some(ts + Duration::hours(1)))
        .unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_corrupt_file_rejects_append() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileStorage::new(temp_dir.path()).unwrap();

    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let path = temp_dir.path().join("system_2024-06-01.json");
    fs::write(&path, "not json").unwrap();

    assert!(storage.store_metric("system", json!(1), Some(ts)).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
}

#[test]
fn test_create_file_storage_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("nested").join("metrics");
    let config = StorageConfig {
        kind: "file".to_string(),
        path: Some(dir.clone()),
        ..Default::default()
    };

    let mut storage = create_storage(&config).unwrap();
    storage.store_metric("system", json!({}), None).unwrap();

    assert!(dir.is_dir());
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
}
