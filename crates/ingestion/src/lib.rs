//! # Ingestion Pipeline
//!
//! State sample ingestion module.
//!
//! Responsibilities:
//! - Register state sources (Mock trajectory or UDP)
//! - Decode datagrams into `RawStateSample`
//! - Reject samples carrying the wrong orientation representation
//! - Depth-1 inbound queue, most-recent-wins by default
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{BackpressureConfig, IngestionPipeline, UdpStateSource};
//!
//! let mut pipeline = IngestionPipeline::new(BackpressureConfig::default());
//!
//! let source = UdpStateSource::bind("unity", addr, WireFormat::Json, representation).await?;
//! pipeline.register_source(Box::new(source));
//!
//! pipeline.start_all();
//! let rx = pipeline.take_receiver().unwrap();
//! while let Ok(sample) = rx.recv().await {
//!     // Convert and publish
//! }
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::MockStateSource;
//!
//! let source = MockStateSource::with_rate("mock", 50.0, InputRepresentation::Quaternion);
//! ```

mod adapter;
mod config;
mod decode;
mod error;
mod mock;
mod pipeline;
mod queue;
mod udp;

// Re-exports
pub use config::{
    BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot, INBOUND_QUEUE_DEPTH,
};
pub use contracts::RawStateSample;
pub use decode::{check_representation, decode_sample, encode_sample};
pub use error::{IngestionError, Result};
pub use mock::{MockStateConfig, MockStateSource};
pub use pipeline::IngestionPipeline;
pub use udp::UdpStateSource;
