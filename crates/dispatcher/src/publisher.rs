//! StatePublisher - per-sample conversion and full fan-out

use std::sync::Arc;
use std::time::Instant;

use async_channel::Receiver;
use contracts::{
    BridgeBlueprint, FrameIds, Publication, RawStateSample, SensorHealthFlags, Stamp, TopicMap,
};
use frame_convert::{transform_pair, FrameConverter};
use observability::{BridgeMetricsAggregator, MetricsSummary};
use tracing::{debug, info, instrument};

use crate::dispatcher::{create_dispatcher, Dispatcher};
use crate::error::DispatcherError;
use crate::metrics::MetricsSnapshot;

/// Statistics returned when a publisher shuts down
#[derive(Debug, Clone, Default)]
pub struct PublisherStats {
    /// Publications assembled and handed to the sinks
    pub publications: u64,
    /// Conversion statistics
    pub summary: MetricsSummary,
    /// Final per-sink counters
    pub sinks: Vec<(String, MetricsSnapshot)>,
}

/// Converter, channel names, frame ids and sinks for one bridge
///
/// Every processed sample yields exactly one [`Publication`] carrying every
/// channel; the same `Arc` goes to each sink.
pub struct StatePublisher {
    converter: FrameConverter,
    topics: TopicMap,
    frames: FrameIds,
    dispatcher: Dispatcher,
    sequence: u64,
    aggregator: BridgeMetricsAggregator,
}

impl StatePublisher {
    pub fn new(
        converter: FrameConverter,
        topics: TopicMap,
        frames: FrameIds,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            converter,
            topics,
            frames,
            dispatcher,
            sequence: 0,
            aggregator: BridgeMetricsAggregator::new(),
        }
    }

    /// Build converter and sinks from a validated blueprint
    #[instrument(name = "state_publisher_from_blueprint", skip(blueprint), fields(sinks = blueprint.sinks.len()))]
    pub async fn from_blueprint(blueprint: &BridgeBlueprint) -> Result<Self, DispatcherError> {
        let dispatcher = create_dispatcher(blueprint.sinks.clone()).await?;
        Ok(Self::new(
            FrameConverter::new(blueprint.conversion),
            blueprint.topics.clone(),
            blueprint.frames.clone(),
            dispatcher,
        ))
    }

    pub fn converter(&self) -> &FrameConverter {
        &self.converter
    }

    pub fn topics(&self) -> &TopicMap {
        &self.topics
    }

    /// Publications emitted so far
    pub fn published(&self) -> u64 {
        self.sequence
    }

    pub fn summary(&self) -> MetricsSummary {
        self.aggregator.summary()
    }

    pub fn sink_metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.dispatcher.metrics()
    }

    /// Convert one sample and publish it, stamped now
    pub fn publish(&mut self, sample: &RawStateSample) -> Arc<Publication> {
        self.publish_at(sample, Stamp::now())
    }

    /// Convert one sample and publish it with the given broadcast stamp
    ///
    /// Both transforms of the pair share `stamp`. Samples are never
    /// rejected: non-finite input yields non-finite channel values.
    pub fn publish_at(&mut self, sample: &RawStateSample, stamp: Stamp) -> Arc<Publication> {
        let started = Instant::now();
        let state = self.converter.convert(sample);
        let pair = transform_pair(&state, &self.frames, stamp);
        let latency_us = started.elapsed().as_secs_f64() * 1e6;

        let sequence = self.sequence;
        self.sequence += 1;

        let publication = Arc::new(Publication::assemble(
            sequence,
            &state,
            SensorHealthFlags::fresh(),
            &pair,
            &self.topics,
        ));

        observability::record_publication(&state, sequence);
        observability::record_conversion_latency_us(latency_us);
        self.aggregator.update(&state, latency_us);

        let accepted = self.dispatcher.dispatch(&publication);
        debug!(
            sequence,
            sample_sequence = ?sample.sequence,
            accepted,
            "Publication dispatched"
        );

        publication
    }

    /// Publish samples from `rx` until it closes or `limit` publications
    /// have been made in this call
    ///
    /// Cancelling the returned future between samples loses nothing: the
    /// publisher stays usable and can still be shut down.
    pub async fn drive(&mut self, rx: &Receiver<RawStateSample>, limit: Option<u64>) -> u64 {
        let mut count: u64 = 0;

        while limit.is_none_or(|max| count < max) {
            let Ok(sample) = rx.recv().await else {
                debug!("Sample channel closed");
                break;
            };
            self.publish(&sample);
            count += 1;

            if count.is_multiple_of(500) {
                debug!(publications = count, "Publisher progress");
            }
        }

        count
    }

    /// Publish every sample until the input closes, then shut down
    #[instrument(name = "state_publisher_run", skip(self, rx))]
    pub async fn run(mut self, rx: Receiver<RawStateSample>) -> PublisherStats {
        info!(sinks = self.dispatcher.sink_count(), "State publisher started");
        self.drive(&rx, None).await;
        self.shutdown().await
    }

    /// Drain and close every sink
    #[instrument(name = "state_publisher_shutdown", skip(self), fields(publications = self.sequence))]
    pub async fn shutdown(self) -> PublisherStats {
        let summary = self.aggregator.summary();
        let sinks = self.dispatcher.shutdown().await;

        info!(publications = self.sequence, "State publisher stopped");

        PublisherStats {
            publications: self.sequence,
            summary,
            sinks,
        }
    }
}
