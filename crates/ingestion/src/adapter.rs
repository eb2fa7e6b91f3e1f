//! 状态源适配器
//!
//! 将 `StateSource` 回调接入入口队列：校验姿态表示、计数并按丢弃策略入队。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::Sender;
use contracts::{RawStateSample, StateSampleCallback, StateSource};
use tracing::{debug, trace, warn};

use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::decode::check_representation;
use crate::queue::offer_sample;

/// 状态源适配器
pub struct SourceAdapter {
    source: Box<dyn StateSource>,
    config: BackpressureConfig,
    listening: Arc<AtomicBool>,
}

impl SourceAdapter {
    /// 创建新的适配器
    pub fn new(source: Box<dyn StateSource>, config: BackpressureConfig) -> Self {
        Self {
            source,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn source_id(&self) -> &str {
        self.source.source_id()
    }

    /// 启动数据采集
    pub fn start(&self, tx: Sender<RawStateSample>, metrics: Arc<IngestionMetrics>) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source.source_id().to_string();
        let config = self.config.clone();
        let listening = self.listening.clone();

        if self.source.representation() != config.representation {
            warn!(
                source_id = %source_id,
                source = %self.source.representation(),
                expected = %config.representation,
                "source representation differs from deployment, samples will be rejected"
            );
        }

        debug!(source_id = %source_id, "starting source adapter");

        let callback: StateSampleCallback = Arc::new(move |sample| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }

            metrics.record_received();
            observability::record_sample_received(&source_id);

            if let Err(e) = check_representation(&sample, config.representation, &source_id) {
                metrics.record_mismatch();
                observability::record_decode_error(&source_id, "representation");
                trace!(source_id = %source_id, error = %e, "sample rejected");
                return;
            }

            if !offer_sample(&tx, sample, &metrics, &source_id, config.drop_policy) {
                listening.store(false, Ordering::SeqCst);
            }
        });

        self.source.listen(callback);
    }

    /// 停止数据采集
    pub fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(source_id = %self.source.source_id(), "stopping source adapter");
            self.source.stop();
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
