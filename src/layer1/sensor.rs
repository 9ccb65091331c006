// Temperature Sensor - Simulated reading source on a fixed cadence
// Emits one reading per tick into the dispatcher; the tick delay is the only suspension point

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::core::config::SensorConfig;
use crate::core::types::Reading;
use crate::layer2::dispatcher::Dispatcher;

/// Produces the numeric part of each reading
pub trait ReadingGenerator: Send {
    fn next_value(&mut self) -> f64;
}

/// `base + U[0, 1) * span`, rounded to the configured number of decimals
pub struct UniformGenerator {
    rng: StdRng,
    base: f64,
    span: f64,
    decimals: u32,
}

impl UniformGenerator {
    pub fn new(config: &SensorConfig) -> Self {
        Self::from_rng(config, StdRng::from_entropy())
    }

    /// Deterministic sequence, for reproducible runs
    pub fn with_seed(config: &SensorConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: &SensorConfig, rng: StdRng) -> Self {
        Self {
            rng,
            base: config.base_value,
            span: config.value_span,
            decimals: config.decimals,
        }
    }
}

impl ReadingGenerator for UniformGenerator {
    fn next_value(&mut self) -> f64 {
        let raw = self.base + self.rng.gen::<f64>() * self.span;
        let factor = 10f64.powi(self.decimals as i32);
        (raw * factor).round() / factor
    }
}

/// Replays a fixed list of values, wrapping around at the end.
/// An empty script yields NaN, which downstream stages treat as malformed.
pub struct ScriptedGenerator {
    values: Vec<f64>,
    position: usize,
}

impl ScriptedGenerator {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, position: 0 }
    }
}

impl ReadingGenerator for ScriptedGenerator {
    fn next_value(&mut self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

#[derive(Debug, Clone, Default)]
pub struct SensorStats {
    pub readings_emitted: u64,
    pub shutdown_requested: bool,
}

pub struct TemperatureSensor {
    generator: Box<dyn ReadingGenerator>,
    interval: Duration,
    max_readings: Option<u64>,
    stats: SensorStats,
}

impl TemperatureSensor {
    pub fn new(config: &SensorConfig, generator: Box<dyn ReadingGenerator>) -> Self {
        Self {
            generator,
            interval: Duration::from_secs(config.interval_secs),
            max_readings: None,
            stats: SensorStats::default(),
        }
    }

    /// Stop on its own after `max` readings
    pub fn with_max_readings(mut self, max: u64) -> Self {
        self.max_readings = Some(max);
        self
    }

    /// Stamp the next generated value with the current time
    pub fn next_reading(&mut self) -> Reading {
        Reading::now(self.generator.next_value())
    }

    /// Emit readings until shutdown is signalled or the reading budget runs out.
    /// The shutdown flag is checked before every emission and also cuts the
    /// inter-reading delay short.
    pub async fn run(&mut self, dispatcher: &mut Dispatcher, mut shutdown: watch::Receiver<bool>) -> SensorStats {
        info!(interval_secs = self.interval.as_secs(), max_readings = ?self.max_readings, "Sensor started");

        loop {
            if *shutdown.borrow() {
                info!("Shutdown signal received, sensor stopping");
                self.stats.shutdown_requested = true;
                break;
            }

            let reading = self.next_reading();
            self.stats.readings_emitted += 1;
            debug!(reading = %reading, "Reading emitted");
            dispatcher.broadcast(&reading);

            if self.max_readings.is_some_and(|max| self.stats.readings_emitted >= max) {
                break;
            }

            wait_interval(self.interval, &mut shutdown).await;
        }

        info!(readings_emitted = self.stats.readings_emitted, "Sensor stopped");
        self.stats.clone()
    }

    pub fn stats(&self) -> &SensorStats {
        &self.stats
    }
}

/// Sleep out the interval; only a change to `true` cuts it short
async fn wait_interval(interval: Duration, shutdown: &mut watch::Receiver<bool>) {
    let delay = tokio::time::sleep(interval);
    tokio::pin!(delay);

    loop {
        tokio::select! {
            _ = &mut delay => return,
            Ok(()) = shutdown.changed() => {
                if *shutdown.borrow_and_update() {
                    return;
                }
            }
        }
    }
}
