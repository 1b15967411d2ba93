//! Metric persistence backends.
//!
//! The monitor loop only writes; retrieval and pruning are for external tooling.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::config::StorageConfig;
use crate::error::{MonitorError, Result};

const FILE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default lookback for file retrieval when no start time is given
const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// One stored sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub value: Value,
    pub timestamp: DateTime<Utc>,
}

pub trait MetricStorage {
    /// Store `value` under `name`, stamped with `timestamp` or now.
    fn store_metric(
        &mut self,
        name: &str,
        value: Value,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Samples of `name` with `start <= timestamp <= end`.
    fn retrieve_metrics(
        &self,
        name: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<MetricRecord>>;

    /// Drop data older than `older_than`; returns how many units were removed.
    fn delete_old_metrics(&mut self, older_than: DateTime<Utc>) -> Result<usize>;
}

/// Build the backend named by `config.kind`. Unknown kinds fall back to memory.
pub fn create_storage(config: &StorageConfig) -> Result<Box<dyn MetricStorage>> {
    match config.kind.as_str() {
        "memory" => Ok(Box::new(MemoryStorage::new(config.max_size))),
        "file" => {
            let dir = match &config.path {
                Some(path) => path.clone(),
                None => default_storage_dir()?,
            };
            Ok(Box::new(FileStorage::new(dir)?))
        }
        other => {
            log::warn!("Unknown storage type: {}, using memory", other);
            Ok(Box::new(MemoryStorage::new(config.max_size)))
        }
    }
}

fn default_storage_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| MonitorError::config("Could not determine data directory"))?;
    Ok(data_dir.join("auto-monitor").join("metrics"))
}

/// In-memory storage, capped per metric
#[derive(Debug, Default)]
pub struct MemoryStorage {
    metrics: HashMap<String, Vec<MetricRecord>>,
    max_size: usize,
}

impl MemoryStorage {
    pub fn new(max_size: usize) -> Self {
        Self {
            metrics: HashMap::new(),
            max_size: max_size.max(1),
        }
    }

    pub fn len(&self, name: &str) -> usize {
        self.metrics.get(name).map_or(0, Vec::len)
    }
}

impl MetricStorage for MemoryStorage {
    fn store_metric(
        &mut self,
        name: &str,
        value: Value,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let series = self.metrics.entry(name.to_string()).or_default();
        series.push(MetricRecord {
            value,
            timestamp: timestamp.unwrap_or_else(Utc::now),
        });

        if series.len() > self.max_size {
            let excess = series.len() - self.max_size;
            series.drain(..excess);
        }

        log::debug!("Stored metric {}", name);
        Ok(())
    }

    fn retrieve_metrics(
        &self,
        name: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<MetricRecord>> {
        Ok(self
            .metrics
            .get(name)
            .map(|series| {
                series
                    .iter()
                    .filter(|r| in_range(r.timestamp, start, end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn delete_old_metrics(&mut self, older_than: DateTime<Utc>) -> Result<usize> {
        let mut deleted = 0;

        for series in self.metrics.values_mut() {
            let before = series.len();
            series.retain(|r| r.timestamp >= older_than);
            deleted += before - series.len();
        }
        self.metrics.retain(|_, series| !series.is_empty());

        log::info!("Deleted {} old metrics", deleted);
        Ok(deleted)
    }
}

/// JSON files on disk, one file per metric per UTC day (`<metric>_<YYYY-MM-DD>.json`)
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::info!("Initialized file storage at {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn metric_file(&self, name: &str, day: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", name, day.format(FILE_DATE_FORMAT)))
    }

    fn read_file(path: &Path) -> Result<Vec<MetricRecord>> {
        let data = fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&data)?)
    }
}

impl MetricStorage for FileStorage {
    fn store_metric(
        &mut self,
        name: &str,
        value: Value,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let timestamp = timestamp.unwrap_or_else(Utc::now);
        let path = self.metric_file(name, timestamp.date_naive());

        let mut records = if path.exists() {
            Self::read_file(&path).map_err(|e| {
                MonitorError::storage(format!("cannot read {:?}: {}", path, e))
            })?
        } else {
            Vec::new()
        };
        records.push(MetricRecord { value, timestamp });

        fs::write(&path, serde_json::to_string_pretty(&records)?)?;
        log::debug!("Stored metric {} to {:?}", name, path);
        Ok(())
    }

    fn retrieve_metrics(
        &self,
        name: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<MetricRecord>> {
        let end = end.unwrap_or_else(Utc::now);
        let start = start.unwrap_or_else(|| end - Duration::days(DEFAULT_LOOKBACK_DAYS));

        let mut records = Vec::new();
        let mut day = start.date_naive();
        let last_day = end.date_naive();

        while day <= last_day {
            let path = self.metric_file(name, day);
            if path.exists() {
                match Self::read_file(&path) {
                    Ok(daily) => records.extend(
                        daily
                            .into_iter()
                            .filter(|r| in_range(r.timestamp, Some(start), Some(end))),
                    ),
                    Err(e) => log::error!("Error reading metric file {:?}: {}", path, e),
                }
            }

            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        Ok(records)
    }

    fn delete_old_metrics(&mut self, older_than: DateTime<Utc>) -> Result<usize> {
        let cutoff = older_than.date_naive();
        let mut deleted = 0;

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let Some(day) = file_day(&path) else {
                log::warn!("Skipping unrecognized metric file {:?}", path);
                continue;
            };

            if day < cutoff {
                match fs::remove_file(&path) {
                    Ok(()) => {
                        deleted += 1;
                        log::debug!("Deleted old metric file: {:?}", path);
                    }
                    Err(e) => log::error!("Error deleting metric file {:?}: {}", path, e),
                }
            }
        }

        log::info!("Deleted {} old metric files", deleted);
        Ok(deleted)
    }
}

/// Day encoded in a `<metric>_<YYYY-MM-DD>.json` file name.
fn file_day(path: &Path) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    let (_, date) = stem.rsplit_once('_')?;
    NaiveDate::parse_from_str(date, FILE_DATE_FORMAT).ok()
}

fn in_range(ts: DateTime<Utc>, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> bool {
    start.map_or(true, |s| ts >= s) && end.map_or(true, |e| ts <= e)
}
