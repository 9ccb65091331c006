// Reading Dispatcher - Fan-out from the sensor to registered consumers
// Synchronous, registration-ordered delivery with per-consumer failure isolation

use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::MonitorError;
use crate::core::events::NotificationLog;
use crate::core::types::Reading;

const SOURCE: &str = "dispatcher";

/// Anything that can take readings off the dispatcher
pub trait ReadingConsumer: Send {
    fn on_reading(&mut self, reading: &Reading) -> Result<(), MonitorError>;
}

/// Keeps a consumer observable from outside while the dispatcher holds a handle
impl<C: ReadingConsumer> ReadingConsumer for Arc<Mutex<C>> {
    fn on_reading(&mut self, reading: &Reading) -> Result<(), MonitorError> {
        self.lock().on_reading(reading)
    }
}

/// Adapter turning a closure into a consumer
pub struct FnConsumer<F>(pub F);

impl<F> ReadingConsumer for FnConsumer<F>
where
    F: FnMut(&Reading) -> Result<(), MonitorError> + Send,
{
    fn on_reading(&mut self, reading: &Reading) -> Result<(), MonitorError> {
        (self.0)(reading)
    }
}

struct Registration {
    name: String,
    consumer: Box<dyn ReadingConsumer>,
}

#[derive(Debug, Clone, Default)]
struct DispatcherStats {
    total_broadcast: u64,
    total_delivered: u64,
    failures: u64,
}

pub struct Dispatcher {
    consumers: Vec<Registration>,
    log: Arc<NotificationLog>,
    stats: DispatcherStats,
}

impl Dispatcher {
    pub fn new(log: Arc<NotificationLog>) -> Self {
        Self {
            consumers: Vec::new(),
            log,
            stats: DispatcherStats::default(),
        }
    }

    /// Register a consumer. Duplicate names are not rejected.
    pub fn subscribe(&mut self, name: &str, consumer: Box<dyn ReadingConsumer>) {
        info!(consumer = %name, position = self.consumers.len(), "Consumer subscribed");
        self.consumers.push(Registration { name: name.to_string(), consumer });
    }

    /// Register a closure as a consumer
    pub fn subscribe_fn<F>(&mut self, name: &str, callback: F)
    where
        F: FnMut(&Reading) -> Result<(), MonitorError> + Send + 'static,
    {
        self.subscribe(name, Box::new(FnConsumer(callback)));
    }

    /// Remove every registration with this name; returns how many were removed
    pub fn unsubscribe(&mut self, name: &str) -> usize {
        let before = self.consumers.len();
        self.consumers.retain(|r| r.name != name);
        let removed = before - self.consumers.len();
        info!(consumer = %name, removed = removed, "Consumer unsubscribed");
        removed
    }

    /// Deliver a reading to every consumer in registration order.
    /// Returns the number of consumers that accepted it.
    pub fn broadcast(&mut self, reading: &Reading) -> usize {
        self.stats.total_broadcast += 1;
        let mut delivered = 0;

        for registration in self.consumers.iter_mut() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                registration.consumer.on_reading(reading)
            }));

            let reason = match outcome {
                Ok(Ok(())) => {
                    delivered += 1;
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };

            self.stats.failures += 1;
            self.log.fault(SOURCE, reading.timestamp, MonitorError::ConsumerFailure {
                consumer: registration.name.clone(),
                reason,
            });
        }

        self.stats.total_delivered += delivered as u64;
        debug!(delivered = delivered, consumers = self.consumers.len(), "Reading broadcast");
        delivered
    }

    pub fn consumer_names(&self) -> Vec<String> {
        self.consumers.iter().map(|r| r.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    pub fn get_stats(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            total_broadcast: self.stats.total_broadcast,
            total_delivered: self.stats.total_delivered,
            failures: self.stats.failures,
            consumer_count: self.consumers.len(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct DispatcherStatsSnapshot {
    pub total_broadcast: u64,
    pub total_delivered: u64,
    pub failures: u64,
    pub consumer_count: usize,
}
