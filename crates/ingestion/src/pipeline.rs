//! Ingestion Pipeline main entry

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use contracts::{RawStateSample, StateSource};
use tracing::{debug, info, instrument};

use crate::adapter::SourceAdapter;
use crate::config::{BackpressureConfig, IngestionMetrics, INBOUND_QUEUE_DEPTH};

/// Ingestion Pipeline
///
/// Feeds every registered state source into one depth-1 queue. With the
/// default `DropOldest` policy the consumer always sees the most recent
/// sample.
pub struct IngestionPipeline {
    /// Registered sources
    adapters: Vec<SourceAdapter>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Sample sender (shared by all adapters)
    tx: Sender<RawStateSample>,

    /// Sample receiver
    rx: Option<Receiver<RawStateSample>>,

    /// Backpressure configuration
    config: BackpressureConfig,
}

impl IngestionPipeline {
    /// Create new Ingestion Pipeline
    pub fn new(config: BackpressureConfig) -> Self {
        let (tx, rx) = bounded(INBOUND_QUEUE_DEPTH);

        Self {
            adapters: Vec::new(),
            metrics: Arc::new(IngestionMetrics::new()),
            tx,
            rx: Some(rx),
            config,
        }
    }

    /// Register a state source
    #[instrument(
        name = "ingestion_register_source",
        skip(self, source),
        fields(source_id = %source.source_id())
    )]
    pub fn register_source(&mut self, source: Box<dyn StateSource>) {
        debug!(representation = %source.representation(), "registered state source");
        self.adapters
            .push(SourceAdapter::new(source, self.config.clone()));
    }

    /// Start all registered sources
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.adapters.len(), "starting all state sources");
        for adapter in &self.adapters {
            if !adapter.is_listening() {
                adapter.start(self.tx.clone(), self.metrics.clone());
            }
        }
    }

    /// Stop all sources
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.adapters.len(), "stopping all state sources");
        for adapter in &self.adapters {
            if adapter.is_listening() {
                adapter.stop();
            }
        }
    }

    /// Get sample stream receiver
    ///
    /// Note: Can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<RawStateSample>> {
        self.rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Get registered source count
    pub fn source_count(&self) -> usize {
        self.adapters.len()
    }

    /// Check if specified source is listening
    pub fn is_source_listening(&self, source_id: &str) -> bool {
        self.adapters
            .iter()
            .find(|a| a.source_id() == source_id)
            .map(|a| a.is_listening())
            .unwrap_or(false)
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}
