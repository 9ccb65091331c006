// Layer3 Common Module - Windows, statistics and notification names shared by stages

pub mod time_windows;
pub mod statistics;
pub mod event_types;

pub use time_windows::SlidingWindow;
pub use statistics::{Statistic, StatisticValue, StatsError};
pub use event_types::*;
