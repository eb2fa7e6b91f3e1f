//! Backpressure configuration and metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub use contracts::DropPolicy;
use contracts::InputRepresentation;

/// Inbound queue depth
///
/// Only the most recent sample matters to the converter, so the queue
/// holds at most one.
pub const INBOUND_QUEUE_DEPTH: usize = 1;

/// Backpressure configuration
#[derive(Debug, Clone)]
pub struct BackpressureConfig {
    /// Drop policy when the queued slot is occupied
    pub drop_policy: DropPolicy,

    /// Orientation representation accepted by this deployment
    pub representation: InputRepresentation,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            drop_policy: DropPolicy::DropOldest,
            representation: InputRepresentation::Quaternion,
        }
    }
}

impl BackpressureConfig {
    /// Create new backpressure configuration
    pub fn new(drop_policy: DropPolicy, representation: InputRepresentation) -> Self {
        Self {
            drop_policy,
            representation,
        }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total samples received
    pub samples_received: AtomicU64,

    /// Samples displaced or rejected by a full queue
    pub samples_dropped: AtomicU64,

    /// Current queue length
    pub queue_len: AtomicUsize,

    /// Samples whose orientation variant did not match
    pub representation_mismatches: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record sample received
    pub fn record_received(&self) {
        self.samples_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record sample dropped
    pub fn record_dropped(&self) {
        self.samples_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record representation mismatch
    pub fn record_mismatch(&self) {
        self.representation_mismatches
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Update queue length
    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_received: self.samples_received.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
            representation_mismatches: self.representation_mismatches.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Total samples received
    pub samples_received: u64,

    /// Samples displaced or rejected by a full queue
    pub samples_dropped: u64,

    /// Current queue length
    pub queue_len: usize,

    /// Samples whose orientation variant did not match
    pub representation_mismatches: u64,
}
