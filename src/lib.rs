// Thermo Monitor - Streaming temperature telemetry
//
// core    → readings, config, logging, notifications, errors
// layer1  → simulated sensor (reading source)
// layer2  → dispatcher (fan-out to consumers)
// layer3  → analysis chain (statistics → threshold → rate of change)

pub mod core;
pub mod layer1;
pub mod layer2;
pub mod layer3;

use std::sync::Arc;

use crate::core::config::{ConfigError, MonitorConfig};
use crate::core::events::NotificationLog;
use crate::layer1::sensor::{ReadingGenerator, TemperatureSensor};
use crate::layer2::dispatcher::Dispatcher;
use crate::layer3::chain::AnalysisChain;

/// Fully wired pipeline: sensor → dispatcher → analysis chain.
///
/// The chain is shared with the dispatcher so its statistics stay readable
/// while the sensor runs.
pub struct Monitor {
    pub sensor: TemperatureSensor,
    pub dispatcher: Dispatcher,
    pub chain: Arc<parking_lot::Mutex<AnalysisChain>>,
    pub log: Arc<NotificationLog>,
}

impl Monitor {
    /// Validate the configuration and wire every component from it
    pub fn build(config: &MonitorConfig, generator: Box<dyn ReadingGenerator>) -> Result<Self, ConfigError> {
        config.validate()?;

        let log = Arc::new(NotificationLog::new(config.monitoring.notification_history));
        let chain = Arc::new(parking_lot::Mutex::new(AnalysisChain::from_config(config, log.clone())));

        let mut dispatcher = Dispatcher::new(log.clone());
        dispatcher.subscribe("analysis_chain", Box::new(chain.clone()));

        let sensor = TemperatureSensor::new(&config.sensor, generator);

        Ok(Self { sensor, dispatcher, chain, log })
    }

    pub async fn run(&mut self, shutdown: tokio::sync::watch::Receiver<bool>) -> layer1::sensor::SensorStats {
        self.sensor.run(&mut self.dispatcher, shutdown).await
    }
}
