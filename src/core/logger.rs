// Structured Logging for the Telemetry Monitor
// tracing + tracing-subscriber, installed once per process

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::config::MonitoringConfig;

static INIT: Once = Once::new();

/// Map a textual level to a tracing level, defaulting to INFO
pub fn parse_level(log_level: &str) -> Level {
    match log_level.to_uppercase().as_str() {
        "TRACE" => Level::TRACE,
        "DEBUG" => Level::DEBUG,
        "INFO" => Level::INFO,
        "WARN" | "WARNING" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Setup structured logging for the monitor. Later calls are no-ops.
pub fn setup_logging(config: &MonitoringConfig) {
    let level = parse_level(&config.log_level);
    let json_format = config.json_logs;

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive(level.into());

        if json_format {
            tracing_subscriber::fmt()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_env_filter(filter)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_target(true)
                .with_env_filter(filter)
                .init();
        }

        tracing::info!(log_level = %level, json = json_format, "Logging initialized");
    });
}
