//! # Dispatcher
//!
//! 状态发布与分发模块。
//!
//! 负责：
//! - `StatePublisher`：转换样本、打时间戳、组装完整 `Publication`
//! - Fan-out 到多个 sinks
//! - 隔离慢 sink，不阻塞主链路

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod publisher;
pub mod sinks;

pub use contracts::{DataSink, Publication};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use publisher::{PublisherStats, StatePublisher};
pub use sinks::{FileSink, LogSink, MemorySink, NetworkSink};
