//! Pipeline orchestrator - wires state source, publisher and sinks.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{BridgeBlueprint, InputRepresentation, SourceConfig, SourceKind, StateSource};
use dispatcher::StatePublisher;
use ingestion::{BackpressureConfig, IngestionPipeline, MockStateSource, UdpStateSource};
use tracing::{info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The bridge blueprint configuration
    pub blueprint: BridgeBlueprint,

    /// Maximum number of publications (None = unlimited)
    pub max_samples: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Why the processing loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEnd {
    /// Input closed or the publication limit was reached
    Finished,
    TimedOut,
    Interrupted,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves, the limit, the timeout or the end of
    /// input, whichever comes first
    ///
    /// Sinks are always drained and closed before returning.
    pub async fn run_until<F>(self, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;
        let representation = blueprint.conversion.input;

        if let Some(port) = self.config.metrics_port {
            observability::install_metrics_exporter(port)?;
        }

        // Ingestion
        let source = build_source(&blueprint.source, representation).await?;
        let mut ingestion = IngestionPipeline::new(BackpressureConfig::new(
            blueprint.source.drop_policy,
            representation,
        ));
        ingestion.register_source(source);

        info!(
            source = %blueprint.source.id,
            kind = ?blueprint.source.kind,
            representation = %representation,
            drop_policy = ?blueprint.source.drop_policy,
            "Ingestion pipeline configured"
        );

        // Publisher + sinks
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - publications will only be counted");
        }
        let mut publisher = StatePublisher::from_blueprint(blueprint)
            .await
            .context("Failed to create sinks")?;

        info!(active_sinks = blueprint.sinks.len(), "Publisher ready");

        ingestion.start_all();
        let rx = ingestion
            .take_receiver()
            .context("Failed to get ingestion receiver")?;

        info!(max_samples = ?self.config.max_samples, "Bridge running");

        let timeout = self.config.timeout;
        let drive = publisher.drive(&rx, self.config.max_samples);
        let bounded = async move {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, drive).await {
                    Ok(_) => RunEnd::Finished,
                    Err(_) => RunEnd::TimedOut,
                },
                None => {
                    drive.await;
                    RunEnd::Finished
                }
            }
        };

        let end = tokio::select! {
            end = bounded => end,
            _ = shutdown => RunEnd::Interrupted,
        };

        match end {
            RunEnd::Finished => info!("Processing loop finished"),
            RunEnd::TimedOut => warn!(timeout_secs = ?timeout.map(|t| t.as_secs_f64()), "Pipeline timed out"),
            RunEnd::Interrupted => warn!("Received shutdown signal, stopping bridge..."),
        }

        // Shutdown
        info!("Shutting down pipeline...");
        ingestion.stop_all();
        let publisher_stats = publisher.shutdown().await;
        let ingest = ingestion.metrics().snapshot();

        let stats = PipelineStats {
            samples_received: ingest.samples_received,
            samples_dropped: ingest.samples_dropped,
            representation_mismatches: ingest.representation_mismatches,
            duration: start_time.elapsed(),
            timed_out: end == RunEnd::TimedOut,
            publisher: publisher_stats,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            publications = stats.publications(),
            rate_hz = format!("{:.2}", stats.rate_hz()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

/// Open the configured state source
async fn build_source(
    config: &SourceConfig,
    representation: InputRepresentation,
) -> Result<Box<dyn StateSource>, CliError> {
    match config.kind {
        SourceKind::Mock => {
            info!(rate_hz = config.rate_hz, "Running with MOCK state source");
            Ok(Box::new(MockStateSource::with_rate(
                &config.id,
                config.rate_hz,
                representation,
            )))
        }
        SourceKind::Udp => {
            let source =
                UdpStateSource::bind(&config.id, config.bind_addr, config.format, representation)
                    .await
                    .map_err(|e| CliError::source_setup(&config.id, e.to_string()))?;
            Ok(Box::new(source))
        }
    }
}
