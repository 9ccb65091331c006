// Configuration for the Telemetry Monitor
// Built once at startup and handed to the pipeline builder; no global instance

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::types::StageKind;
use crate::layer3::common::statistics::Statistic;

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Configuration Structures
// ============================================================================

/// Beyond f64 precision; larger values also overflow the rounding factor
pub const MAX_DECIMALS: u32 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    pub interval_secs: u64,
    pub base_value: f64,   // lower bound of simulated readings
    pub value_span: f64,   // readings fall in [base, base + span)
    pub decimals: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            base_value: 20.0,
            value_span: 15.0,
            decimals: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsConfig {
    pub retention_secs: u64,
    pub capacity: usize,
    pub statistics: Vec<Statistic>,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            retention_secs: 60,
            capacity: 12,
            statistics: Statistic::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub limit: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self { limit: 30.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    pub retention_secs: u64,
    pub capacity: usize,
    pub delta_threshold: f64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            retention_secs: 30,
            capacity: 6,
            delta_threshold: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub json_logs: bool,
    pub notification_history: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            json_logs: false,
            notification_history: 1000,
        }
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub sensor: SensorConfig,
    pub statistics: StatisticsConfig,
    pub threshold: ThresholdConfig,
    pub rate: RateConfig,
    pub monitoring: MonitoringConfig,
    pub stage_order: Vec<StageKind>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::default(),
            statistics: StatisticsConfig::default(),
            threshold: ThresholdConfig::default(),
            rate: RateConfig::default(),
            monitoring: MonitoringConfig::default(),
            stage_order: vec![StageKind::Statistics, StageKind::Threshold, StageKind::RateOfChange],
        }
    }
}

/// Compact view of the active configuration for startup logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub interval_secs: u64,
    pub stage_order: Vec<StageKind>,
    pub statistics_window: String,
    pub rate_window: String,
    pub threshold: f64,
    pub delta_threshold: f64,
    pub log_level: String,
}

impl MonitorConfig {
    /// Validate configuration, collecting every problem before failing
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.sensor.interval_secs == 0 {
            errors.push("sensor.interval_secs must be positive".to_string());
        }
        if !self.sensor.value_span.is_finite() || self.sensor.value_span < 0.0 {
            errors.push("sensor.value_span must be a non-negative number".to_string());
        }
        if self.sensor.decimals > MAX_DECIMALS {
            errors.push(format!("sensor.decimals must be at most {}", MAX_DECIMALS));
        }
        if self.statistics.capacity == 0 {
            errors.push("statistics.capacity must be at least 1".to_string());
        }
        if self.statistics.statistics.is_empty() {
            errors.push("statistics.statistics must name at least one statistic".to_string());
        }
        if self.rate.capacity == 0 {
            errors.push("rate.capacity must be at least 1".to_string());
        }
        if !self.threshold.limit.is_finite() {
            errors.push("threshold.limit must be finite".to_string());
        }
        if !self.rate.delta_threshold.is_finite() {
            errors.push("rate.delta_threshold must be finite".to_string());
        }
        if self.stage_order.is_empty() {
            errors.push("stage_order must contain at least one stage".to_string());
        }
        for (i, kind) in self.stage_order.iter().enumerate() {
            if self.stage_order[..i].contains(kind) {
                errors.push(format!("stage_order lists '{}' more than once", kind));
            }
        }

        if !errors.is_empty() {
            for error in &errors {
                warn!(error = %error, "Config validation error");
            }
            return Err(ConfigError::Validation(errors.join("; ")));
        }

        info!("Configuration validated successfully");
        Ok(())
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            interval_secs: self.sensor.interval_secs,
            stage_order: self.stage_order.clone(),
            statistics_window: format!("{}s/{}", self.statistics.retention_secs, self.statistics.capacity),
            rate_window: format!("{}s/{}", self.rate.retention_secs, self.rate.capacity),
            threshold: self.threshold.limit,
            delta_threshold: self.rate.delta_threshold,
            log_level: self.monitoring.log_level.clone(),
        }
    }

    /// Summary rendered as a single JSON line
    pub fn summary_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(&self.summary())?)
    }
}
