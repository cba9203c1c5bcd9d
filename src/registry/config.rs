//! Registry configuration

use std::time::Duration;

/// Shortest accepted cleanup interval; `tokio::time::interval` rejects zero
pub(crate) const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for the broadcast registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Initial capacity of the listener map
    pub listener_capacity: usize,

    /// Number of tombstoned slots that triggers inline compaction (0 = never inline)
    pub tombstone_threshold: usize,

    /// Interval between background cleanup runs
    pub cleanup_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            listener_capacity: 64,
            tombstone_threshold: 256,
            cleanup_interval: Duration::from_secs(30),
        }
    }
}

impl RegistryConfig {
    /// Set the initial listener map capacity
    pub fn listener_capacity(mut self, capacity: usize) -> Self {
        self.listener_capacity = capacity;
        self
    }

    /// Set the tombstone count that triggers inline compaction
    ///
    /// Zero leaves compaction to [`cleanup`](super::BroadcastRegistry::cleanup)
    /// and the background cleanup task.
    pub fn tombstone_threshold(mut self, threshold: usize) -> Self {
        self.tombstone_threshold = threshold;
        self
    }

    /// Set the background cleanup interval
    ///
    /// Clamped to at least 1ms.
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval.max(MIN_CLEANUP_INTERVAL);
        self
    }
}
