//! StateSource trait - State sample source abstraction
//!
//! Decouples the ingestion pipeline from the concrete transport delivering
//! simulator state (UDP, mock trajectory, ...).

use std::sync::Arc;

use crate::{InputRepresentation, RawStateSample};

/// State sample callback type
///
/// Invoked once per sample; `Arc` lets the callback be shared with the
/// source's worker task.
pub type StateSampleCallback = Arc<dyn Fn(RawStateSample) + Send + Sync>;

/// State sample source trait
///
/// Real and mock sources implement this trait for use by the ingestion
/// pipeline.
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn StateSource> = get_state_source();
/// source.listen(Arc::new(|sample| {
///     println!("Received sample: {:?}", sample.sequence);
/// }));
/// // ... use source ...
/// source.stop();
/// ```
pub trait StateSource: Send + Sync {
    /// Source identifier
    fn source_id(&self) -> &str;

    /// Orientation representation this source delivers
    fn representation(&self) -> InputRepresentation;

    /// Register the sample callback
    ///
    /// Repeated calls while listening are ignored.
    fn listen(&self, callback: StateSampleCallback);

    /// Stop delivering samples
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
