// Core monitoring logic

pub mod alerts;
pub mod collectors;
pub mod config;
pub mod monitor;
pub mod storage;

// Re-export commonly used items
pub use alerts::{Alert, AlertManager, AlertSeverity, AlertSummary, LogNotifier, Notifier};
pub use collectors::{CycleSnapshot, MetricCollector, Snapshot};
pub use config::MonitorConfig;
pub use monitor::{Monitor, MonitorState};
pub use storage::{create_storage, FileStorage, MemoryStorage, MetricRecord, MetricStorage};
