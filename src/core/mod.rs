// Core Module - Foundational types, config, logging, notifications and errors

pub mod types;
pub mod config;
pub mod logger;
pub mod events;
pub mod error;

// Re-export commonly used items for convenience
pub use types::{now_ms, system_clock, Clock, ManualClock, Reading, StageKind, READING_TIME_FORMAT};
pub use config::{
    ConfigError, ConfigSummary, MonitorConfig, MonitoringConfig, RateConfig, SensorConfig,
    StatisticsConfig, ThresholdConfig,
};
pub use logger::setup_logging;
pub use events::{
    Notification, NotificationLog, NotificationLogStatsSnapshot, NotificationRecord, Severity,
};
pub use error::MonitorError;
