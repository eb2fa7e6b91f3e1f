//! SinkHandle - manages a sink with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{DataSink, Publication};

use crate::error::DispatcherError;
use crate::metrics::SinkMetrics;

/// Handle to a running sink worker
///
/// Publications are shared by `Arc`: every sink sees the same rendered
/// fan-out without copying its messages.
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send publications to worker
    tx: mpsc::Sender<Arc<Publication>>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: DataSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue a publication for the sink (non-blocking)
    ///
    /// A full queue drops the publication for this sink only.
    pub fn try_send(&self, publication: Arc<Publication>) -> Result<(), DispatcherError> {
        match self.tx.try_send(publication) {
            Ok(()) => {
                let depth = self.tx.max_capacity() - self.tx.capacity();
                self.metrics.set_queue_len(depth);
                observability::record_sink_queue_depth(&self.name, depth);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(p)) => {
                self.metrics.inc_dropped_count();
                observability::record_publication_dropped(&self.name);
                warn!(
                    sink = %self.name,
                    sequence = p.sequence,
                    "Queue full, publication dropped"
                );
                Err(DispatcherError::QueueFull {
                    sink_name: self.name.clone(),
                    sequence: p.sequence,
                })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                Err(DispatcherError::WorkerClosed {
                    sink_name: self.name.clone(),
                })
            }
        }
    }

    /// Shutdown the sink worker gracefully
    ///
    /// Queued publications are written before the sink is flushed and closed.
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

/// Worker task that consumes publications and writes to sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: DataSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<Arc<Publication>>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(publication) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&publication).await {
            Ok(()) => {
                metrics.inc_write_count();
                observability::record_publication_dispatched(&name, true);
            }
            Err(e) => {
                metrics.inc_failure_count();
                observability::record_publication_dispatched(&name, false);
                error!(
                    sink = %name,
                    sequence = publication.sequence,
                    error = %e,
                    "Write failed"
                );
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}
