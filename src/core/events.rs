// Notification System for the Telemetry Monitor
// Stages report through a shared log: every record is traced and kept in bounded history

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use uuid::Uuid;

use crate::core::error::MonitorError;
use crate::core::types::Reading;
use crate::layer3::common::event_types::*;
use crate::layer3::common::statistics::{Statistic, StatisticValue};

// ============================================================================
// Severity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Critical = 1,
    High = 2,     // Rate alerts, pipeline faults
    Medium = 3,   // Threshold breaches
    Low = 4,
    Info = 5,     // Readings and statistics
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// Notification
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    ReadingReceived {
        reading: Reading,
    },
    StatisticComputed {
        statistic: Statistic,
        value: StatisticValue,
        window_secs: u64,
        samples: usize,
    },
    ThresholdBreach {
        value: f64,
        threshold: f64,
    },
    RapidIncrease {
        delta: f64,
        threshold: f64,
        window_secs: u64,
    },
    Fault(MonitorError),
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::ReadingReceived { .. } => READING_RECEIVED,
            Notification::StatisticComputed { .. } => STATISTIC_COMPUTED,
            Notification::ThresholdBreach { .. } => THRESHOLD_BREACH,
            Notification::RapidIncrease { .. } => RAPID_INCREASE,
            Notification::Fault(_) => PIPELINE_FAULT,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Notification::ReadingReceived { .. } | Notification::StatisticComputed { .. } => Severity::Info,
            Notification::ThresholdBreach { .. } => Severity::Medium,
            Notification::RapidIncrease { .. } | Notification::Fault(_) => Severity::High,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::ReadingReceived { reading } => {
                write!(f, "New temperature reading received: {}", reading)
            }
            Notification::StatisticComputed { statistic, value, window_secs, samples } => write!(
                f,
                "Statistic {} over the last {} seconds ({} samples): {}",
                statistic, window_secs, samples, value
            ),
            Notification::ThresholdBreach { value, threshold } => {
                write!(f, "Temperature ({}) above threshold ({})", value, threshold)
            }
            Notification::RapidIncrease { delta, threshold, window_secs } => write!(
                f,
                "Temperature changed by more than {} degrees in the last {} seconds (delta {:.2})",
                threshold, window_secs, delta
            ),
            Notification::Fault(err) => write!(f, "{}", err),
        }
    }
}

/// A notification as stored in the log
#[derive(Debug, Clone)]
pub struct NotificationRecord {
    pub id: String,
    pub source: String,
    pub timestamp: i64,
    pub notification: Notification,
}

impl NotificationRecord {
    pub fn kind(&self) -> &'static str {
        self.notification.kind()
    }

    pub fn message(&self) -> String {
        self.notification.to_string()
    }
}

impl fmt::Display for NotificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Notification(kind={}, source={}, severity={}, id={})",
            self.kind(),
            self.source,
            self.notification.severity(),
            &self.id[..8]
        )
    }
}

// ============================================================================
// Notification Log
// ============================================================================

#[derive(Debug, Clone, Default)]
struct NotificationStats {
    total_recorded: u64,
    by_kind: HashMap<&'static str, u64>,
}

/// Shared sink for everything the pipeline reports
pub struct NotificationLog {
    history: RwLock<VecDeque<NotificationRecord>>,
    max_history: usize,
    stats: RwLock<NotificationStats>,
}

impl NotificationLog {
    pub fn new(max_history: usize) -> Self {
        Self {
            history: RwLock::new(VecDeque::with_capacity(max_history.min(1024))),
            max_history,
            stats: RwLock::new(NotificationStats::default()),
        }
    }

    /// Trace the notification and append it to history
    pub fn record(&self, source: &str, timestamp: i64, notification: Notification) {
        let message = notification.to_string();
        let kind = notification.kind();

        match notification.severity() {
            Severity::Critical => tracing::error!(source = %source, kind = kind, "{}", message),
            Severity::High | Severity::Medium => tracing::warn!(source = %source, kind = kind, "{}", message),
            Severity::Low | Severity::Info => tracing::info!(source = %source, kind = kind, "{}", message),
        }

        {
            let mut stats = self.stats.write();
            stats.total_recorded += 1;
            *stats.by_kind.entry(kind).or_default() += 1;
        }

        if self.max_history == 0 {
            return;
        }
        let mut history = self.history.write();
        history.push_back(NotificationRecord {
            id: Uuid::new_v4().to_string(),
            source: source.to_string(),
            timestamp,
            notification,
        });
        while history.len() > self.max_history {
            history.pop_front();
        }
    }

    /// Report a recovered pipeline error
    pub fn fault(&self, source: &str, timestamp: i64, error: MonitorError) {
        self.record(source, timestamp, Notification::Fault(error));
    }

    /// Recent records, newest first
    pub fn recent(&self, kind: Option<&str>, limit: Option<usize>) -> Vec<NotificationRecord> {
        let history = self.history.read();
        let limit = limit.unwrap_or(100);

        history
            .iter()
            .rev()
            .filter(|r| kind.map_or(true, |k| r.kind() == k))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Rendered messages of one kind, oldest first
    pub fn messages(&self, kind: &str) -> Vec<String> {
        self.history
            .read()
            .iter()
            .filter(|r| r.kind() == kind)
            .map(|r| r.message())
            .collect()
    }

    /// Lifetime count for a kind (not limited by history size)
    pub fn count(&self, kind: &str) -> u64 {
        self.stats.read().by_kind.get(kind).copied().unwrap_or(0)
    }

    pub fn get_stats(&self) -> NotificationLogStatsSnapshot {
        let stats = self.stats.read();
        NotificationLogStatsSnapshot {
            total_recorded: stats.total_recorded,
            faults: stats.by_kind.get(PIPELINE_FAULT).copied().unwrap_or(0),
            // every known kind is listed, including ones never recorded
            by_kind: ALL_KINDS
                .iter()
                .map(|kind| (kind.to_string(), stats.by_kind.get(kind).copied().unwrap_or(0)))
                .collect(),
            history_size: self.history.read().len(),
        }
    }

    pub fn clear_history(&self) {
        self.history.write().clear();
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[derive(Debug, Clone)]
pub struct NotificationLogStatsSnapshot {
    pub total_recorded: u64,
    pub faults: u64,
    pub by_kind: HashMap<String, u64>,
    pub history_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breach(value: f64) -> Notification {
        Notification::ThresholdBreach { value, threshold: 30.0 }
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::High < Severity::Medium);
        assert_eq!(breach(31.0).severity(), Severity::Medium);
    }

    #[test]
    fn test_breach_message_names_value_and_threshold() {
        assert_eq!(breach(31.0).to_string(), "Temperature (31) above threshold (30)");
    }

    #[test]
    fn test_log_history_and_counts() {
        let log = NotificationLog::new(10);
        log.record("threshold", 1, breach(31.0));
        log.record("threshold", 2, breach(32.5));
        log.fault(
            "statistics",
            3,
            MonitorError::EmptyWindowComputation {
                stage: "statistics".to_string(),
                statistic: "mean".to_string(),
            },
        );

        let recent = log.recent(Some(THRESHOLD_BREACH), None);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp, 2);
        assert_eq!(log.messages(THRESHOLD_BREACH)[0], "Temperature (31) above threshold (30)");
        assert_eq!(log.count(PIPELINE_FAULT), 1);

        let stats = log.get_stats();
        assert_eq!(stats.total_recorded, 3);
        assert_eq!(stats.faults, 1);
        assert_eq!(stats.history_size, 3);
        assert_eq!(stats.by_kind.len(), ALL_KINDS.len());
        assert_eq!(stats.by_kind[THRESHOLD_BREACH], 2);
        assert_eq!(stats.by_kind[RAPID_INCREASE], 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let log = NotificationLog::new(2);
        for i in 0..5 {
            log.record("threshold", i, breach(31.0 + i as f64));
        }

        let recent = log.recent(None, None);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].timestamp, 3);
        assert_eq!(log.count(THRESHOLD_BREACH), 5);
    }

    #[test]
    fn test_record_display_and_clear() {
        let log = NotificationLog::default();
        log.record("threshold", 1, breach(31.0));
        let record = &log.recent(None, Some(1))[0];
        assert!(record.to_string().starts_with("Notification(kind=threshold_breach, source=threshold"));

        log.clear_history();
        assert!(log.recent(None, None).is_empty());
    }
}
