//! # Observability
//!
//! 桥接进程的日志与指标出口。
//!
//! - [`init_tracing`]: 安装全局 tracing subscriber，`RUST_LOG` 优先于默认级别
//! - [`install_metrics_exporter`]: 按需开启 Prometheus 抓取端点 (`run --metrics-port`)
//! - [`metrics`]: `unity_bridge_*` 指标记录与发布统计
//!
//! 日志与指标分开初始化：`validate` / `info` 只需要日志，
//! `run` 在启动数据源之前才决定是否导出指标。
//!
//! ```ignore
//! observability::init_tracing(&TracingConfig::from_verbosity(LogFormat::Json, false, 1))?;
//! observability::install_metrics_exporter(9100)?;
//! ```

pub mod metrics;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

// Re-exports
pub use crate::metrics::{
    record_conversion_latency_us, record_decode_error, record_publication,
    record_publication_dispatched, record_publication_dropped, record_sample_dropped,
    record_sample_received, record_sink_queue_depth, BridgeMetricsAggregator, MetricsSummary,
    RunningStats, StatsSummary,
};

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志，带当前 span
    Json,
    /// 多行人类可读格式
    #[default]
    Pretty,
    /// 紧凑单行格式
    Compact,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub format: LogFormat,
    /// `RUST_LOG` 未设置时使用的过滤指令
    pub default_directive: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            default_directive: "info".to_string(),
        }
    }
}

impl TracingConfig {
    /// 由 `-q` / `-v` 计数推出默认级别 (`-q` 优先)
    pub fn from_verbosity(format: LogFormat, quiet: bool, verbose: u8) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        Self {
            format,
            default_directive: level.to_string(),
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn format_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_thread_names(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    }
}

/// 安装全局 tracing subscriber
///
/// 进程内只能成功一次，重复调用返回错误。
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    tracing_subscriber::registry()
        .with(format_layer(config.format))
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        format = ?config.format,
        default_directive = %config.default_directive,
        "Tracing initialized"
    );
    Ok(())
}

/// 在 `0.0.0.0:<port>` 上开启 Prometheus 抓取端点
///
/// 需要运行中的 tokio runtime；全局 recorder 同样只能安装一次。
pub fn install_metrics_exporter(port: u16) -> Result<SocketAddr> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .with_context(|| format!("Failed to install Prometheus recorder on {addr}"))?;

    tracing::info!(%addr, "Prometheus metrics endpoint initialized");
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_cli_default() {
        let config = TracingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.default_directive, "info");
    }

    #[test]
    fn test_verbosity_levels() {
        let level = |quiet, verbose| {
            TracingConfig::from_verbosity(LogFormat::Compact, quiet, verbose).default_directive
        };
        assert_eq!(level(false, 0), "info");
        assert_eq!(level(false, 1), "debug");
        assert_eq!(level(false, 4), "trace");
        assert_eq!(level(true, 3), "warn");
    }

    #[test]
    fn test_every_format_builds_a_layer() {
        for format in [LogFormat::Json, LogFormat::Pretty, LogFormat::Compact] {
            let _layer = format_layer(format);
        }
    }

    #[test]
    fn test_tracing_installs_once() {
        let config = TracingConfig::default();
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
