// Sliding Window - Rolling time-based sample buffer
// Bounded by sample age against a caller-supplied clock and by count

use std::collections::VecDeque;

/// Rolling window of (timestamp_ms, value) pairs in arrival order
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    retention_ms: i64,               // Maximum sample age in milliseconds
    capacity: usize,                 // Maximum number of samples
    data: VecDeque<(i64, f64)>,
}

impl SlidingWindow {
    /// retention_secs: how long a sample stays in the window
    /// capacity: hard cap on sample count
    pub fn new(retention_secs: u64, capacity: usize) -> Self {
        Self {
            retention_ms: (retention_secs as i64).saturating_mul(1000),
            capacity,
            data: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Append a sample, then evict by age relative to `now` and by count.
    /// Returns false when the new sample itself did not survive eviction.
    pub fn push(&mut self, timestamp: i64, value: f64, now: i64) -> bool {
        self.data.push_back((timestamp, value));
        self.prune(now);

        while self.data.len() > self.capacity {
            self.data.pop_front();
        }

        now - timestamp <= self.retention_ms && self.capacity > 0
    }

    /// Remove samples older than the retention interval measured from `now`
    pub fn prune(&mut self, now: i64) {
        let retention_ms = self.retention_ms;
        // Arrival order is not guaranteed to be timestamp order, so scan everything
        self.data.retain(|(ts, _)| now - ts <= retention_ms);
    }

    /// Current values in arrival order
    pub fn snapshot(&self) -> Vec<f64> {
        self.data.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(i64, f64)> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Most recent sample
    pub fn last(&self) -> Option<&(i64, f64)> {
        self.data.back()
    }

    /// Oldest sample
    pub fn first(&self) -> Option<&(i64, f64)> {
        self.data.front()
    }

    pub fn retention_secs(&self) -> u64 {
        (self.retention_ms / 1000) as u64
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
