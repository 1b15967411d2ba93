use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};

use super::{MetricCollector, Snapshot};
use crate::core::config::SystemConfig;
use crate::error::{MonitorError, Result};

/// Host-level readings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkCounters>,
    /// 1, 5 and 15 minute load; zeros where the platform has none
    pub load_average: [f64; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub mount_point: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

/// Network counters summed over all interfaces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub errout: u64,
    /// Bytes since the previous sample
    pub bytes_sent_delta: u64,
    pub bytes_recv_delta: u64,
}

impl SystemSnapshot {
    pub fn empty() -> Self {
        Self {
            timestamp: Utc::now(),
            ..Default::default()
        }
    }
}

/// Collects CPU, memory, disk, network and load readings via `sysinfo`
pub struct SystemCollector {
    enabled: bool,
    system: System,
    disks: Disks,
    networks: Networks,
    primed: bool,
}

impl SystemCollector {
    pub fn new(config: &SystemConfig) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());

        Self {
            enabled: config.enabled,
            system: System::new_with_specifics(refresh_kind),
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            primed: false,
        }
    }

    fn sample(&mut self) -> SystemSnapshot {
        // CPU usage is a difference between two refreshes
        if !self.primed {
            self.system.refresh_cpu_usage();
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            self.primed = true;
        }
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.disks.refresh(true);
        self.networks.refresh(true);

        let mut snapshot = SystemSnapshot::empty();
        snapshot.hostname = System::host_name();
        snapshot.platform = System::name().or_else(|| Some(std::env::consts::OS.to_string()));

        if let Some((count, percent)) = best_effort("cpu", self.sample_cpu()) {
            snapshot.cpu_count = Some(count);
            snapshot.cpu_percent = Some(percent);
        }

        if let Some(memory) = best_effort("memory", self.sample_memory()) {
            snapshot.memory_percent = Some(memory.percent);
            snapshot.memory = Some(memory);
        }

        if let Some(disk) = best_effort("disk", self.sample_disk()) {
            snapshot.disk_percent = Some(disk.percent);
            snapshot.disk = Some(disk);
        }

        snapshot.network = Some(self.sample_network());
        snapshot.load_average = sample_load_average();

        snapshot
    }

    fn sample_cpu(&self) -> Result<(usize, f64)> {
        let count = self.system.cpus().len();
        if count == 0 {
            return Err(MonitorError::collector("no CPU information available"));
        }
        Ok((count, self.system.global_cpu_usage() as f64))
    }

    fn sample_memory(&self) -> Result<MemoryUsage> {
        let total = self.system.total_memory();
        if total == 0 {
            return Err(MonitorError::collector("total memory reported as zero"));
        }
        let used = self.system.used_memory();

        Ok(MemoryUsage {
            total,
            available: self.system.available_memory(),
            used,
            percent: percent_of(used, total),
        })
    }

    /// Usage of the root filesystem, or of the first listed disk when `/` is absent.
    fn sample_disk(&self) -> Result<DiskUsage> {
        let disk = self
            .disks
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"))
            .or_else(|| self.disks.iter().next())
            .ok_or_else(|| MonitorError::collector("no disks reported"))?;

        let total = disk.total_space();
        let free = disk.available_space();
        let used = total.saturating_sub(free);

        Ok(DiskUsage {
            mount_point: disk.mount_point().to_string_lossy().to_string(),
            total,
            used,
            free,
            percent: percent_of(used, total),
        })
    }

    fn sample_network(&self) -> NetworkCounters {
        self.networks
            .values()
            .fold(NetworkCounters::default(), |mut acc, data| {
                acc.bytes_sent += data.total_transmitted();
                acc.bytes_recv += data.total_received();
                acc.packets_sent += data.total_packets_transmitted();
                acc.packets_recv += data.total_packets_received();
                acc.errin += data.total_errors_on_received();
                acc.errout += data.total_errors_on_transmitted();
                acc.bytes_sent_delta += data.transmitted();
                acc.bytes_recv_delta += data.received();
                acc
            })
    }
}

impl MetricCollector for SystemCollector {
    fn name(&self) -> &'static str {
        "system"
    }

    fn collect(&mut self) -> Snapshot {
        if !self.enabled {
            log::debug!("System collection disabled");
            return Snapshot::System(SystemSnapshot::empty());
        }
        Snapshot::System(self.sample())
    }
}

fn sample_load_average() -> [f64; 3] {
    if cfg!(unix) {
        let load = System::load_average();
        [load.one, load.five, load.fifteen]
    } else {
        [0.0, 0.0, 0.0]
    }
}

fn best_effort<T>(section: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Error collecting {} metrics: {}", section, e);
            None
        }
    }
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
