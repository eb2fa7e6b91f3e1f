//! Mock 状态源
//!
//! 用于无模拟器环境的运行和测试：沿水平圆周匀速航行的载体。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::{
    InputRepresentation, Orientation, Quaternion, RawStateSample, StateSampleCallback,
    StateSource, Vector3,
};
use tracing::{debug, trace, warn};

/// Mock 状态源配置
#[derive(Debug, Clone)]
pub struct MockStateConfig {
    /// 数据源 ID
    pub source_id: String,

    /// 发送频率 (Hz)
    pub rate_hz: f64,

    /// 姿态表示
    pub representation: InputRepresentation,

    /// 圆周半径 (m)
    pub radius: f64,

    /// 角速度 (rad/s)
    pub angular_speed: f64,

    /// 深度 (m, 模拟器 Y 轴向下)
    pub depth: f64,

    /// 最大采样数 (None = 不限)
    pub max_samples: Option<u64>,
}

impl Default for MockStateConfig {
    fn default() -> Self {
        Self {
            source_id: "mock_state".to_string(),
            rate_hz: 50.0,
            representation: InputRepresentation::Quaternion,
            radius: 10.0,
            angular_speed: 0.2,
            depth: 5.0,
            max_samples: None,
        }
    }
}

/// Mock 状态源
///
/// 以模拟器原生坐标系 (左手, Y 轴向上) 生成采样。
pub struct MockStateSource {
    config: MockStateConfig,
    running: Arc<AtomicBool>,
}

impl MockStateSource {
    /// 创建新的 Mock 状态源
    pub fn new(config: MockStateConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 以默认轨迹创建
    pub fn with_rate(source_id: &str, rate_hz: f64, representation: InputRepresentation) -> Self {
        Self::new(MockStateConfig {
            source_id: source_id.to_string(),
            rate_hz,
            representation,
            ..Default::default()
        })
    }

    /// 第 `tick` 个采样 (纯函数, 时间 = tick / rate_hz)
    pub fn sample_at(config: &MockStateConfig, tick: u64) -> RawStateSample {
        let t = tick as f64 / config.rate_hz;
        let heading = config.angular_speed * t;
        let (sin, cos) = heading.sin_cos();
        let speed = config.radius * config.angular_speed;

        let orientation = match config.representation {
            InputRepresentation::Euler => Orientation::Euler {
                degrees: Vector3::new(0.0, heading.to_degrees(), 0.0),
            },
            InputRepresentation::Quaternion => {
                let (s, c) = (heading / 2.0).sin_cos();
                Orientation::Quaternion(Quaternion::new(0.0, s, 0.0, c))
            }
        };

        RawStateSample {
            position: Vector3::new(config.radius * cos, -config.depth, config.radius * sin),
            orientation,
            linear_velocity: Vector3::new(-speed * sin, 0.0, speed * cos),
            angular_velocity: Vector3::new(0.0, config.angular_speed, 0.0),
            sequence: Some(tick),
        }
    }
}

impl StateSource for MockStateSource {
    fn source_id(&self) -> &str {
        &self.config.source_id
    }

    fn representation(&self) -> InputRepresentation {
        self.config.representation
    }

    fn listen(&self, callback: StateSampleCallback) {
        let Some(period) = contracts::sample_period(self.config.rate_hz) else {
            warn!(
                source_id = %self.config.source_id,
                rate_hz = self.config.rate_hz,
                "mock state source not started: unusable rate"
            );
            return;
        };
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = self.config.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut tick: u64 = 0;

            debug!(
                source_id = %config.source_id,
                representation = %config.representation,
                rate_hz = config.rate_hz,
                "mock state source started"
            );

            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }

                callback(Self::sample_at(&config, tick));
                trace!(source_id = %config.source_id, tick, "mock sample emitted");

                tick += 1;
                if config.max_samples.is_some_and(|max| tick >= max) {
                    running.store(false, Ordering::SeqCst);
                }
            }

            debug!(source_id = %config.source_id, samples = tick, "mock state source stopped");
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn test_trajectory_is_on_circle() {
        let config = MockStateConfig::default();
        for tick in [0, 13, 250] {
            let s = MockStateSource::sample_at(&config, tick);
            let r = (s.position.x.powi(2) + s.position.z.powi(2)).sqrt();
            assert!((r - config.radius).abs() < 1e-9);
            assert_eq!(s.position.y, -config.depth);
            assert_eq!(s.sequence, Some(tick));
        }
    }

    #[test]
    fn test_representation_is_respected() {
        let mut config = MockStateConfig::default();
        config.representation = InputRepresentation::Euler;
        let s = MockStateSource::sample_at(&config, 5);
        assert_eq!(s.orientation.representation(), InputRepresentation::Euler);

        config.representation = InputRepresentation::Quaternion;
        let s = MockStateSource::sample_at(&config, 5);
        if let Orientation::Quaternion(q) = s.orientation {
            assert!((q.norm() - 1.0).abs() < 1e-12);
        } else {
            panic!("expected quaternion orientation");
        }
    }

    #[tokio::test]
    async fn test_unusable_rate_does_not_start() {
        for rate_hz in [0.0, 1e-300, 1e300] {
            let source = MockStateSource::new(MockStateConfig {
                rate_hz,
                ..Default::default()
            });
            source.listen(Arc::new(|_| {}));
            assert!(!source.is_listening(), "rate {rate_hz} started");
        }
    }

    #[tokio::test]
    async fn test_mock_source_stops_after_max_samples() {
        let source = MockStateSource::new(MockStateConfig {
            rate_hz: 200.0,
            max_samples: Some(3),
            ..Default::default()
        });
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();

        source.listen(Arc::new(move |sample| {
            sink.lock().unwrap().push(sample.sequence);
        }));
        assert!(source.is_listening());

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!source.is_listening());
        assert_eq!(*received.lock().unwrap(), vec![Some(0), Some(1), Some(2)]);
    }
}
