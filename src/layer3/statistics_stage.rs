// Statistics Stage - Rolling summaries over the last 60 seconds
// Pushes each reading into its window, then reports every configured statistic

use std::sync::Arc;
use tracing::debug;

use crate::core::config::StatisticsConfig;
use crate::core::error::MonitorError;
use crate::core::events::{Notification, NotificationLog};
use crate::core::types::{system_clock, Clock, Reading};
use crate::layer3::chain::{StageOutcome, StageStats};
use crate::layer3::common::statistics::Statistic;
use crate::layer3::common::time_windows::SlidingWindow;

const SOURCE: &str = "statistics";

pub struct StatisticsStage {
    window: SlidingWindow,
    statistics: Vec<Statistic>,
    log: Arc<NotificationLog>,
    clock: Clock,

    // Statistics
    readings_processed: u64,
    notifications_fired: u64,
    faults: u64,
}

impl StatisticsStage {
    pub fn new(config: &StatisticsConfig, log: Arc<NotificationLog>) -> Self {
        Self {
            window: SlidingWindow::new(config.retention_secs, config.capacity),
            statistics: config.statistics.clone(),
            log,
            clock: system_clock(),
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

    /// Never halts the chain; problems are reported and the reading moves on
    pub fn handle(&mut self, reading: &Reading) -> StageOutcome {
        self.readings_processed += 1;

        if !reading.is_valid() {
            self.report_fault(reading.timestamp, MonitorError::InvalidReading {
                stage: SOURCE.to_string(),
                reason: format!("non-finite value {}", reading.value),
            });
            return StageOutcome::Forward;
        }

        let now = (self.clock)();
        if !self.window.push(reading.timestamp, reading.value, now) {
            debug!(reading = %reading, now, "Reading older than the window, not admitted");
        }
        self.compute_statistics(reading.timestamp);

        StageOutcome::Forward
    }

    fn compute_statistics(&mut self, timestamp: i64) {
        let snapshot = self.window.snapshot();

        if snapshot.is_empty() {
            let requested: Vec<&str> = self.statistics.iter().map(|s| s.name()).collect();
            self.report_fault(timestamp, MonitorError::EmptyWindowComputation {
                stage: SOURCE.to_string(),
                statistic: requested.join(", "),
            });
            return;
        }

        let results: Vec<_> = self
            .statistics
            .iter()
            .map(|statistic| (*statistic, statistic.compute(&snapshot)))
            .collect();

        for (statistic, result) in results {
            match result {
                Ok(value) => {
                    self.notifications_fired += 1;
                    self.log.record(SOURCE, timestamp, Notification::StatisticComputed {
                        statistic,
                        value,
                        window_secs: self.window.retention_secs(),
                        samples: snapshot.len(),
                    });
                }
                Err(e) => {
                    debug!(statistic = %statistic, error = %e, "Statistic skipped");
                    self.report_fault(timestamp, MonitorError::EmptyWindowComputation {
                        stage: SOURCE.to_string(),
                        statistic: statistic.name().to_string(),
                    });
                }
            }
        }
    }

    fn report_fault(&mut self, timestamp: i64, error: MonitorError) {
        self.faults += 1;
        self.log.fault(SOURCE, timestamp, error);
    }

    pub fn window(&self) -> &SlidingWindow { &self.window }
    pub fn statistics(&self) -> &[Statistic] { &self.statistics }
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

    struct Harness {
        stage: StatisticsStage,
        log: Arc<NotificationLog>,
        clock: ManualClock,
    }

    impl Harness {
        fn new(config: StatisticsConfig) -> Self {
            let log = Arc::new(NotificationLog::new(100));
            let clock = ManualClock::default();
            let stage = StatisticsStage::new(&config, log.clone()).with_clock(clock.as_clock());
            Self { stage, log, clock }
        }

        /// Deliver a reading the moment it was taken
        fn live(&mut self, timestamp: i64, value: f64) -> StageOutcome {
            self.clock.set(timestamp);
            self.stage.handle(&Reading::new(timestamp, value))
        }
    }

    #[test]
    fn test_reports_all_four_statistics() {
        let mut h = Harness::new(StatisticsConfig::default());

        for (i, value) in [20.0, 21.0, 22.0, 23.0, 24.0, 25.0].iter().enumerate() {
            assert_eq!(h.live(i as i64 * 5_000, *value), StageOutcome::Forward);
        }

        let messages = h.log.messages(STATISTIC_COMPUTED);
        assert_eq!(messages.len(), 24);
        let last_four = &messages[20..];
        assert_eq!(last_four[0], "Statistic mean over the last 60 seconds (6 samples): 22.50");
        assert!(last_four[1].starts_with("Statistic std_dev"));
        assert_eq!(last_four[2], "Statistic quantiles over the last 60 seconds (6 samples): [21, 22, 23]");
        assert_eq!(last_four[3], "Statistic max_min over the last 60 seconds (6 samples): {max: 25, min: 20}");
        assert_eq!(h.stage.notifications_fired(), 24);
    }

    #[test]
    fn test_window_is_capped_at_twelve() {
        let mut h = Harness::new(StatisticsConfig::default());
        for i in 0..15 {
            h.live(i * 1_000, 20.0 + i as f64);
        }
        assert_eq!(h.stage.window().len(), 12);
        assert_eq!(h.stage.window().first().map(|(_, v)| *v), Some(23.0));
    }

    #[test]
    fn test_old_samples_leave_the_window() {
        let mut h = Harness::new(StatisticsConfig::default());
        h.live(0, 20.0);
        h.live(30_000, 21.0);
        h.live(61_000, 22.0);
        assert_eq!(h.stage.window().snapshot(), vec![21.0, 22.0]);
    }

    #[test]
    fn test_backdated_reading_is_not_reported_as_current() {
        let mut h = Harness::new(StatisticsConfig::default());
        h.clock.set(200_000);

        // taken 120s before processing
        h.stage.handle(&Reading::new(80_000, 45.0));
        assert!(h.stage.window().is_empty());
        assert_eq!(h.log.count(STATISTIC_COMPUTED), 0);
        assert!(h.log.messages(PIPELINE_FAULT)[0].contains("window is empty"));

        h.live(205_000, 22.0);
        h.clock.set(210_000);
        h.stage.handle(&Reading::new(100_000, 45.0));
        assert_eq!(h.stage.window().snapshot(), vec![22.0]);
        let last = h.log.messages(STATISTIC_COMPUTED).pop();
        assert_eq!(
            last.as_deref(),
            Some("Statistic max_min over the last 60 seconds (1 samples): {max: 22, min: 22}")
        );
    }

    #[test]
    fn test_idle_gap_expires_earlier_samples() {
        let mut h = Harness::new(StatisticsConfig::default());
        h.live(0, 20.0);
        h.live(5_000, 21.0);

        h.live(70_000, 30.0);
        assert_eq!(h.stage.window().snapshot(), vec![30.0]);
    }

    #[test]
    fn test_invalid_value_is_reported_and_forwarded() {
        let mut h = Harness::new(StatisticsConfig::default());
        assert_eq!(h.live(0, f64::NAN), StageOutcome::Forward);
        assert!(h.stage.window().is_empty());
        assert_eq!(h.log.count(PIPELINE_FAULT), 1);
        assert_eq!(h.log.count(STATISTIC_COMPUTED), 0);
    }

    #[test]
    fn test_empty_window_guard() {
        let mut h = Harness::new(StatisticsConfig {
            capacity: 0,
            ..StatisticsConfig::default()
        });

        assert_eq!(h.live(0, 22.0), StageOutcome::Forward);
        assert_eq!(h.log.count(STATISTIC_COMPUTED), 0);
        let faults = h.log.messages(PIPELINE_FAULT);
        assert_eq!(faults.len(), 1);
        assert!(faults[0].contains("window is empty"));
        assert_eq!(h.stage.stats().faults, 1);
    }

    #[test]
    fn test_configured_subset() {
        let mut h = Harness::new(StatisticsConfig {
            statistics: vec![Statistic::MaxMin],
            ..StatisticsConfig::default()
        });
        h.live(0, 22.0);
        assert_eq!(h.log.count(STATISTIC_COMPUTED), 1);
        assert_eq!(h.stage.statistics(), &[Statistic::MaxMin]);
    }
}
