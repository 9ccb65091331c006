// Threshold Stage - Flags readings above the fixed limit
// Stateless; malformed readings stop here

use std::sync::Arc;

use crate::core::config::ThresholdConfig;
use crate::core::error::MonitorError;
use crate::core::events::{Notification, NotificationLog};
use crate::core::types::Reading;
use crate::layer3::chain::{StageOutcome, StageStats};

const SOURCE: &str = "threshold";

pub struct ThresholdStage {
    limit: f64,
    log: Arc<NotificationLog>,

    readings_processed: u64,
    notifications_fired: u64,
    faults: u64,
}

impl ThresholdStage {
    pub fn new(config: &ThresholdConfig, log: Arc<NotificationLog>) -> Self {
        Self {
            limit: config.limit,
            log,
            readings_processed: 0,
            notifications_fired: 0,
            faults: 0,
        }
    }

    pub fn handle(&mut self, reading: &Reading) -> StageOutcome {
        self.readings_processed += 1;

        if !reading.is_valid() {
            self.faults += 1;
            self.log.fault(SOURCE, reading.timestamp, MonitorError::InvalidReading {
                stage: SOURCE.to_string(),
                reason: format!("non-finite value {}", reading.value),
            });
            return StageOutcome::Halt;
        }

        if reading.value > self.limit {
            self.notifications_fired += 1;
            self.log.record(SOURCE, reading.timestamp, Notification::ThresholdBreach {
                value: reading.value,
                threshold: self.limit,
            });
        }

        StageOutcome::Forward
    }

    pub fn limit(&self) -> f64 { self.limit }
    pub fn readings_processed(&self) -> u64 { self.readings_processed }
    pub fn notifications_fired(&self) -> u64 { self.notifications_fired }

    pub fn stats(&self) -> StageStats {
        StageStats {
            stage: SOURCE.to_string(),
            readings_processed: self.readings_processed,
            notifications_fired: self.notifications_fired,
            faults: self.faults,
            window_len: None,
        }
    }
}
