//! Inbound queue insertion

use std::sync::Arc;

use async_channel::{Sender, TrySendError};
use contracts::{DropPolicy, RawStateSample};
use tracing::{trace, warn};

use crate::config::IngestionMetrics;

/// Offer a sample to the inbound queue, applying the drop policy
///
/// Returns `false` once the receiving side is gone.
#[inline]
pub fn offer_sample(
    tx: &Sender<RawStateSample>,
    sample: RawStateSample,
    metrics: &Arc<IngestionMetrics>,
    source_id: &str,
    drop_policy: DropPolicy,
) -> bool {
    let open = match drop_policy {
        DropPolicy::DropOldest => match tx.force_send(sample) {
            Ok(None) => {
                trace!(source_id = %source_id, "sample queued");
                true
            }
            Ok(Some(displaced)) => {
                metrics.record_dropped();
                observability::record_sample_dropped(source_id);
                trace!(
                    source_id = %source_id,
                    displaced_sequence = ?displaced.sequence,
                    "sample dropped (oldest)"
                );
                true
            }
            Err(_) => false,
        },
        DropPolicy::DropNewest => match tx.try_send(sample) {
            Ok(()) => {
                trace!(source_id = %source_id, "sample queued");
                true
            }
            Err(TrySendError::Full(rejected)) => {
                metrics.record_dropped();
                observability::record_sample_dropped(source_id);
                trace!(
                    source_id = %source_id,
                    rejected_sequence = ?rejected.sequence,
                    "sample dropped (newest)"
                );
                true
            }
            Err(TrySendError::Closed(_)) => false,
        },
    };

    if open {
        metrics.update_queue_len(tx.len());
    } else {
        warn!(source_id = %source_id, "channel closed");
    }
    open
}
