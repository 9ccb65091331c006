// Layer 2 - Distribution
// Fans each sensor reading out to the registered consumers

pub mod dispatcher;

pub use dispatcher::{Dispatcher, DispatcherStatsSnapshot, FnConsumer, ReadingConsumer};
