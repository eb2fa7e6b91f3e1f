//! 桥接指标收集模块
//!
//! 记录采样接收、坐标转换与分发的运行指标，并在内存中聚合运行摘要。

use contracts::ConvertedState;
use metrics::{counter, gauge, histogram};

/// 记录一次完整发布
///
/// 每产生一个 Publication 调用一次。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_publication;
///
/// let publication = publisher.publish(&sample);
/// record_publication(&state, publication.sequence);
/// ```
pub fn record_publication(state: &ConvertedState, sequence: u64) {
    // 发布计数器
    counter!("unity_bridge_publications_total").increment(1);

    // 序号 (用于检测跳号)
    gauge!("unity_bridge_last_sequence").set(sequence as f64);

    // 最新位置 (目标坐标系)
    gauge!("unity_bridge_position", "axis" => "x").set(state.position.x);
    gauge!("unity_bridge_position", "axis" => "y").set(state.position.y);
    gauge!("unity_bridge_position", "axis" => "z").set(state.position.z);

    // 最新姿态读数 (度)
    let euler = &state.orientation_euler_degrees;
    gauge!("unity_bridge_orientation_degrees", "axis" => "x").set(euler.x);
    gauge!("unity_bridge_orientation_degrees", "axis" => "y").set(euler.y);
    gauge!("unity_bridge_orientation_degrees", "axis" => "z").set(euler.z);

    if !is_finite_state(state) {
        counter!("unity_bridge_non_finite_publications_total").increment(1);
    }
}

/// 记录采样接收
pub fn record_sample_received(source_id: &str) {
    counter!(
        "unity_bridge_samples_received_total",
        "source_id" => source_id.to_string()
    )
    .increment(1);
}

/// 记录采样被入口队列丢弃
pub fn record_sample_dropped(source_id: &str) {
    counter!(
        "unity_bridge_samples_dropped_total",
        "source_id" => source_id.to_string()
    )
    .increment(1);
}

/// 记录采样解码失败
///
/// `reason` 取值: `decode` / `representation`
pub fn record_decode_error(source_id: &str, reason: &'static str) {
    counter!(
        "unity_bridge_decode_errors_total",
        "source_id" => source_id.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// 记录 sink 分发结果
pub fn record_publication_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "unity_bridge_publications_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录 sink 队列满导致的丢弃
pub fn record_publication_dropped(sink_name: &str) {
    counter!(
        "unity_bridge_publications_dropped_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// 记录单次转换耗时 (微秒)
pub fn record_conversion_latency_us(latency_us: f64) {
    histogram!("unity_bridge_conversion_latency_us").record(latency_us);
}

/// 记录 sink 队列深度
pub fn record_sink_queue_depth(sink_name: &str, depth: usize) {
    gauge!(
        "unity_bridge_sink_queue_depth",
        "sink" => sink_name.to_string()
    )
    .set(depth as f64);
}

fn is_finite_state(state: &ConvertedState) -> bool {
    let q = &state.orientation;
    state
        .position
        .to_array()
        .iter()
        .chain(state.linear_velocity.to_array().iter())
        .chain(state.angular_velocity.to_array().iter())
        .chain([q.x, q.y, q.z, q.w].iter())
        .all(|v| v.is_finite())
}

/// 桥接指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct BridgeMetricsAggregator {
    /// 发布总数
    pub total_publications: u64,

    /// 含 NaN/inf 的发布数
    pub non_finite_publications: u64,

    /// 转换耗时统计 (微秒)
    pub latency_stats: RunningStats,

    /// 线速度模长统计
    pub speed_stats: RunningStats,

    /// 深度 (NED z) 统计
    pub depth_stats: RunningStats,
}

impl BridgeMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, state: &ConvertedState, latency_us: f64) {
        self.total_publications += 1;
        self.latency_stats.push(latency_us);

        if !is_finite_state(state) {
            self.non_finite_publications += 1;
            return;
        }

        let v = state.linear_velocity;
        self.speed_stats
            .push((v.x * v.x + v.y * v.y + v.z * v.z).sqrt());
        self.depth_stats.push(state.position.z);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_publications: self.total_publications,
            non_finite_publications: self.non_finite_publications,
            non_finite_rate: if self.total_publications > 0 {
                self.non_finite_publications as f64 / self.total_publications as f64 * 100.0
            } else {
                0.0
            },
            conversion_latency_us: StatsSummary::from(&self.latency_stats),
            speed: StatsSummary::from(&self.speed_stats),
            depth: StatsSummary::from(&self.depth_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_publications: u64,
    pub non_finite_publications: u64,
    pub non_finite_rate: f64,
    pub conversion_latency_us: StatsSummary,
    pub speed: StatsSummary,
    pub depth: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Bridge Metrics Summary ===")?;
        writeln!(f, "Total publications: {}", self.total_publications)?;
        writeln!(
            f,
            "Non-finite publications: {} ({:.2}%)",
            self.non_finite_publications, self.non_finite_rate
        )?;
        writeln!(f, "Conversion latency (us): {}", self.conversion_latency_us)?;
        writeln!(f, "Speed (m/s): {}", self.speed)?;
        writeln!(f, "Depth (m): {}", self.depth)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
