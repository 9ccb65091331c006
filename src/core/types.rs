// Core Type Definitions for the Telemetry Monitor
// Readings, stage identifiers and the clocks windows are measured against

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::core::error::MonitorError;

/// Textual timestamp layout used by the sensor feed
pub const READING_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current wall-clock time in epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Source of "now" in epoch milliseconds, consulted by the windowed stages
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(now_ms)
}

/// Clock that only moves when told to, for replaying recorded readings
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self(Arc::new(AtomicI64::new(start_ms)))
    }

    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.0.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Shareable handle; every copy observes later `set`/`advance` calls
    pub fn as_clock(&self) -> Clock {
        let inner = self.0.clone();
        Arc::new(move || inner.load(Ordering::SeqCst))
    }
}

// ============================================================================
// Reading
// ============================================================================

/// One timestamped sensor sample. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Epoch milliseconds (UTC)
    pub timestamp: i64,
    /// Temperature in degrees Celsius
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Stamp a value with the current wall-clock time
    pub fn now(value: f64) -> Self {
        Self::new(now_ms(), value)
    }

    /// Build a reading from the `YYYY-MM-DD HH:MM:SS` text the sensor feed uses
    pub fn from_formatted(timestamp: &str, value: f64) -> Result<Self, MonitorError> {
        let parsed = NaiveDateTime::parse_from_str(timestamp, READING_TIME_FORMAT).map_err(|e| {
            MonitorError::InvalidReading {
                stage: "parser".to_string(),
                reason: format!("bad timestamp '{}': {}", timestamp, e),
            }
        })?;
        Ok(Self::new(parsed.and_utc().timestamp_millis(), value))
    }

    /// Non-finite values (NaN, ±inf) are treated as malformed
    pub fn is_valid(&self) -> bool {
        self.value.is_finite()
    }

    pub fn formatted_time(&self) -> String {
        match DateTime::<Utc>::from_timestamp_millis(self.timestamp) {
            Some(dt) => dt.format(READING_TIME_FORMAT).to_string(),
            None => self.timestamp.to_string(),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.formatted_time(), self.value)
    }
}

// ============================================================================
// Stage Kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    Statistics,
    Threshold,
    RateOfChange,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Statistics => "statistics",
            StageKind::Threshold => "threshold",
            StageKind::RateOfChange => "rate_of_change",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_round_trip() {
        let reading = Reading::from_formatted("2024-05-11 12:00:05", 27.5).unwrap();
        assert_eq!(reading.formatted_time(), "2024-05-11 12:00:05");
        assert_eq!(reading.to_string(), "(2024-05-11 12:00:05, 27.5)");
    }

    #[test]
    fn test_formatted_spacing_is_millis() {
        let a = Reading::from_formatted("2024-05-11 12:00:00", 25.0).unwrap();
        let b = Reading::from_formatted("2024-05-11 12:00:05", 27.0).unwrap();
        assert_eq!(b.timestamp - a.timestamp, 5_000);
    }

    #[test]
    fn test_bad_timestamp_is_invalid_reading() {
        let err = Reading::from_formatted("11/05/2024", 25.0).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidReading { .. }));
    }

    #[test]
    fn test_validity() {
        assert!(Reading::now(21.3).is_valid());
        assert!(!Reading::now(f64::NAN).is_valid());
        assert!(!Reading::now(f64::INFINITY).is_valid());
    }

    #[test]
    fn test_manual_clock_handles_share_time() {
        let clock = ManualClock::new(1_000);
        let now = clock.as_clock();
        assert_eq!(now(), 1_000);

        clock.advance(5_000);
        assert_eq!(now(), 6_000);
        clock.set(0);
        assert_eq!(now(), 0);
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_system_clock_tracks_wall_time() {
        let before = now_ms();
        let observed = system_clock()();
        assert!(observed >= before && observed - before < 60_000);
    }
}
