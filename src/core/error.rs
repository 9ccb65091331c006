// Pipeline Error Taxonomy
// Every variant is recovered locally and reported; none stop the reading loop

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// Non-numeric or malformed reading
    #[error("Invalid reading at {stage}: {reason}")]
    InvalidReading { stage: String, reason: String },

    /// Statistic requested over zero samples
    #[error("Cannot compute {statistic} at {stage}: window is empty")]
    EmptyWindowComputation { stage: String, statistic: String },

    /// A dispatcher consumer returned an error or panicked
    #[error("Consumer '{consumer}' failed: {reason}")]
    ConsumerFailure { consumer: String, reason: String },
}

impl MonitorError {
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorError::InvalidReading { .. } => "invalid_reading",
            MonitorError::EmptyWindowComputation { .. } => "empty_window_computation",
            MonitorError::ConsumerFailure { .. } => "consumer_failure",
        }
    }
}
