//! Sink implementations
//!
//! Contains LogSink, FileSink, NetworkSink and the in-process MemorySink.

mod file;
mod log;
mod memory;
mod network;

pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::memory::MemorySink;
pub use self::network::{NetworkFormat, NetworkSink, NetworkSinkConfig};
