// Rate-of-Change Stage - Detects fast temperature movement over 30 seconds
// Sums adjacent differences across the window and alerts past the delta limit

use std::sync::Arc;
use tracing::debug;

use crate::core::config::RateConfig;
use crate::core::error::MonitorError;
use crate::core::events::{Notification, NotificationLog};
use crate::core::types::{system_clock, Clock, Reading};
use crate::layer3::chain::{StageOutcome, StageStats};
use crate::layer3::common::time_windows::SlidingWindow;

const SOURCE: &str = "rate_of_change";

/// Σ (w[i] - w[i+1]) over adjacent pairs in arrival order, evaluated pair by pair
pub fn pairwise_change(values: &[f64]) -> f64 {
    values.windows(2).map(|pair| pair[0] - pair[1]).sum()
}

pub struct RateOfChangeStage {
    window: SlidingWindow,
    delta_threshold: f64,
    log: Arc<NotificationLog>,
    clock: Clock,

    last_delta: Option<f64>,

    readings_processed: u64,
    notifications_fired: u64,
    faults: u64,
}

impl RateOfChangeStage {
    pub fn new(config: &RateConfig, log: Arc<NotificationLog>) -> Self {
        Self {
            window: SlidingWindow::new(config.retention_secs, config.capacity),
            delta_threshold: config.delta_threshold,
            log,
            clock: system_clock(),
            last_delta: None,
            readings_processed: 0,
            notifications_fired: 0,
            faults: 0,
        }
    }

    /// Measure sample age against `clock` instead of the wall clock
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn handle(&mut self, reading: &Reading) -> StageOutcome {
        self.readings_processed += 1;

        if !reading.is_valid() {
            self.faults += 1;
            self.log.fault(SOURCE, reading.timestamp, MonitorError::InvalidReading {
                stage: SOURCE.to_string(),
                reason: format!("non-finite value {}", reading.value),
            });
            return StageOutcome::Forward;
        }

        let now = (self.clock)();
        if !self.window.push(reading.timestamp, reading.value, now) {
            debug!(reading = %reading, now, "Reading older than the window, not admitted");
        }

        let delta = pairwise_change(&self.window.snapshot());
        self.last_delta = Some(delta);

        if delta > self.delta_threshold {
            self.notifications_fired += 1;
            self.log.record(SOURCE, reading.timestamp, Notification::RapidIncrease {
                delta,
                threshold: self.delta_threshold,
                window_secs: self.window.retention_secs(),
            });
        }

        StageOutcome::Forward
    }

    pub fn window(&self) -> &SlidingWindow { &self.window }
    pub fn last_delta(&self) -> Option<f64> { self.last_delta }
    pub fn readings_processed(&self) -> u64 { self.readings_processed }
    pub fn notifications_fired(&self) -> u64 { self.notifications_fired }

    pub fn stats(&self) -> StageStats {
        StageStats {
            stage: SOURCE.to_string(),
            readings_processed: self.readings_processed,
            notifications_fired: self.notifications_fired,
            faults: self.faults,
            window_len: Some(self.window.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ManualClock;
    use crate::layer3::common::event_types::*;

    fn stage() -> (RateOfChangeStage, Arc<NotificationLog>, ManualClock) {
        let log = Arc::new(NotificationLog::new(100));
        let clock = ManualClock::default();
        let stage = RateOfChangeStage::new(&RateConfig::default(), log.clone()).with_clock(clock.as_clock());
        (stage, log, clock)
    }

    /// Readings 5s apart, each processed as soon as it is taken
    fn feed(stage: &mut RateOfChangeStage, clock: &ManualClock, values: &[f64]) {
        for (i, value) in values.iter().enumerate() {
            let timestamp = i as i64 * 5_000;
            clock.set(timestamp);
            stage.handle(&Reading::new(timestamp, *value));
        }
    }

    #[test]
    fn test_pairwise_change() {
        assert_eq!(pairwise_change(&[]), 0.0);
        assert_eq!(pairwise_change(&[25.0]), 0.0);
        assert_eq!(pairwise_change(&[25.0, 27.0, 30.0]), -5.0);
        assert_eq!(pairwise_change(&[40.0, 35.0, 38.0, 26.0]), 14.0);
    }

    #[test]
    fn test_rising_run_yields_negative_delta() {
        let (mut stage, log, clock) = stage();
        let readings = [
            Reading::from_formatted("2024-05-11 12:00:00", 25.0).unwrap(),
            Reading::from_formatted("2024-05-11 12:00:05", 27.0).unwrap(),
            Reading::from_formatted("2024-05-11 12:00:10", 30.0).unwrap(),
        ];
        for reading in &readings {
            clock.set(reading.timestamp);
            stage.handle(reading);
        }

        assert_eq!(stage.window().len(), 3);
        assert_eq!(stage.last_delta(), Some(-5.0));
        assert_eq!(log.count(RAPID_INCREASE), 0);
    }

    #[test]
    fn test_alert_when_delta_exceeds_limit() {
        let (mut stage, log, clock) = stage();
        feed(&mut stage, &clock, &[40.0, 35.0, 38.0, 26.0]);

        assert_eq!(stage.last_delta(), Some(14.0));
        assert_eq!(log.count(RAPID_INCREASE), 1);
        let message = &log.messages(RAPID_INCREASE)[0];
        assert!(message.contains("more than 10 degrees"));
        assert!(message.contains("last 30 seconds"));
        assert!(message.contains("delta 14.00"));
    }

    #[test]
    fn test_delta_of_exactly_ten_does_not_alert() {
        let (mut stage, log, clock) = stage();
        feed(&mut stage, &clock, &[30.0, 20.0]);
        assert_eq!(stage.last_delta(), Some(10.0));
        assert_eq!(log.count(RAPID_INCREASE), 0);
    }

    #[test]
    fn test_window_holds_six_samples() {
        let (mut stage, _log, clock) = stage();
        feed(&mut stage, &clock, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(stage.window().snapshot(), vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_stale_samples_do_not_count() {
        let (mut stage, log, clock) = stage();
        stage.handle(&Reading::new(0, 45.0));
        clock.set(31_000);
        stage.handle(&Reading::new(31_000, 30.0)); // first sample has aged out
        assert_eq!(stage.window().len(), 1);
        assert_eq!(log.count(RAPID_INCREASE), 0);
    }

    #[test]
    fn test_backdated_reading_adds_no_change() {
        let (mut stage, log, clock) = stage();
        clock.set(100_000);
        stage.handle(&Reading::new(100_000, 45.0));

        // would make a 15 degree drop if it were admitted
        clock.set(105_000);
        stage.handle(&Reading::new(60_000, 30.0));

        assert_eq!(stage.window().snapshot(), vec![45.0]);
        assert_eq!(stage.last_delta(), Some(0.0));
        assert_eq!(log.count(RAPID_INCREASE), 0);
    }

    #[test]
    fn test_invalid_value_is_skipped() {
        let (mut stage, log, _clock) = stage();
        assert_eq!(stage.handle(&Reading::new(0, f64::NAN)), StageOutcome::Forward);
        assert!(stage.window().is_empty());
        assert_eq!(log.count(PIPELINE_FAULT), 1);
    }
}
