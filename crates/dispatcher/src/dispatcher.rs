//! Dispatcher - fan-out of publications to sinks

use std::sync::Arc;

use tracing::{debug, info, instrument};

use contracts::{Publication, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, LogSink, NetworkSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// Build the dispatcher and start every sink worker
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub async fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = Self::initialize_handles(&self.config).await?;
        Ok(Dispatcher { handles })
    }

    #[instrument(
        name = "dispatcher_initialize_handles",
        skip(config),
        fields(sink_count = config.sinks.len())
    )]
    async fn initialize_handles(
        config: &DispatcherConfig,
    ) -> Result<Vec<SinkHandle>, DispatcherError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            match create_sink_handle(sink_config).await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Workers already spawned must not outlive a failed build
                    Dispatcher::shutdown_handles(handles).await;
                    return Err(e);
                }
            }
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
async fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Fans every publication out to all sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self { handles }
    }

    /// Number of sinks
    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Hand the same publication to every sink
    ///
    /// Never blocks. Returns the number of sinks that accepted it; the
    /// rest dropped it and counted the drop.
    pub fn dispatch(&self, publication: &Arc<Publication>) -> usize {
        let accepted = self
            .handles
            .iter()
            .filter(|handle| handle.try_send(Arc::clone(publication)).is_ok())
            .count();

        if accepted < self.handles.len() {
            debug!(
                sequence = publication.sequence,
                accepted,
                sinks = self.handles.len(),
                "Publication not accepted by every sink"
            );
        }
        accepted
    }

    /// Drain every sink queue, then flush and close the sinks
    ///
    /// Returns the final per-sink metrics.
    #[instrument(name = "dispatcher_shutdown", skip(self), fields(sinks = self.handles.len()))]
    pub async fn shutdown(self) -> Vec<(String, MetricsSnapshot)> {
        let metrics: Vec<_> = self
            .handles
            .iter()
            .map(|h| (h.name().to_string(), Arc::clone(h.metrics())))
            .collect();

        Self::shutdown_handles(self.handles).await;
        info!("Dispatcher shutdown complete");

        metrics
            .into_iter()
            .map(|(name, m)| (name, m.snapshot()))
            .collect()
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs))]
pub async fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
    };
    DispatcherBuilder::new(config).build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use crate::test_support::publication;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_dispatcher_fanout() {
        let first = MemorySink::new("first");
        let second = MemorySink::new("second");

        let dispatcher = Dispatcher::with_handles(vec![
            SinkHandle::spawn(first.clone(), 10),
            SinkHandle::spawn(second.clone(), 10),
        ]);

        for i in 0..5 {
            assert_eq!(dispatcher.dispatch(&Arc::new(publication(i))), 2);
        }
        dispatcher.shutdown().await;

        assert_eq!(first.len(), 5);
        assert_eq!(first.publications(), second.publications());
        assert!(first.is_closed() && second.is_closed());
    }

    #[tokio::test]
    async fn test_full_sink_does_not_affect_others() {
        let roomy = MemorySink::new("roomy");
        let tight = MemorySink::new("tight");

        let dispatcher = Dispatcher::with_handles(vec![
            SinkHandle::spawn(roomy.clone(), 8),
            SinkHandle::spawn(tight.clone(), 1),
        ]);

        let accepted: Vec<usize> = (0..3)
            .map(|i| dispatcher.dispatch(&Arc::new(publication(i))))
            .collect();
        assert_eq!(accepted, vec![2, 1, 1]);

        let metrics: HashMap<String, MetricsSnapshot> = dispatcher.metrics().into_iter().collect();
        assert_eq!(metrics["tight"].dropped_count, 2);
        assert_eq!(metrics["roomy"].dropped_count, 0);

        dispatcher.shutdown().await;
        assert_eq!(roomy.len(), 3);
        assert_eq!(tight.len(), 1);
    }

    #[tokio::test]
    async fn test_create_dispatcher_from_config() {
        let configs = vec![SinkConfig::log("test_log")];

        let dispatcher = create_dispatcher(configs).await.unwrap();
        assert_eq!(dispatcher.sink_count(), 1);
        assert_eq!(dispatcher.dispatch(&Arc::new(publication(1))), 1);
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_bad_network_sink_fails_build() {
        let configs = vec![
            SinkConfig::log("ok"),
            SinkConfig {
                name: "net".to_string(),
                sink_type: SinkType::Network,
                queue_capacity: 4,
                params: HashMap::from([("addr".to_string(), "not-an-addr".to_string())]),
            },
        ];

        let err = create_dispatcher(configs).await.err().unwrap();
        assert!(matches!(err, DispatcherError::SinkCreation { ref name, .. } if name == "net"));
    }
}
