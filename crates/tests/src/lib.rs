//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（无需 Unity）
//! - UDP 链路与文件输出测试

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{BridgeBlueprint, ConversionConfig, PUBLICATION_MESSAGE_COUNT};

    #[test]
    fn test_default_blueprint_survives_toml() {
        let blueprint = BridgeBlueprint::default();
        let toml = ConfigLoader::to_toml(&blueprint).unwrap();
        let parsed = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        assert_eq!(parsed.conversion, ConversionConfig::default());
        assert_eq!(parsed.topics, blueprint.topics);
        assert_eq!(parsed.frames, blueprint.frames);
        assert_eq!(ConfigLoader::to_toml(&parsed).unwrap(), toml);
    }

    #[test]
    fn test_channel_set_size() {
        let topics = BridgeBlueprint::default().topics;
        // Thirteen channels; the tf channel carries the pair as one message.
        assert_eq!(topics.entries().len() + 1, PUBLICATION_MESSAGE_COUNT);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use approx::assert_relative_eq;
    use contracts::{
        BridgeBlueprint, ConversionConfig, DropPolicy, FrameIds, InputRepresentation,
        MessagePayload, Orientation, Publication, Quaternion, RawStateSample, SinkConfig,
        SinkType, Stamp, TopicMap, Vector3, WireFormat, PUBLICATION_MESSAGE_COUNT,
    };
    use dispatcher::{Dispatcher, MemorySink, SinkHandle, StatePublisher};
    use frame_convert::FrameConverter;
    use ingestion::{
        encode_sample, BackpressureConfig, IngestionPipeline, MockStateConfig, MockStateSource,
        UdpStateSource,
    };
    use tokio::net::UdpSocket;

    fn memory_publisher(config: ConversionConfig, sink: &MemorySink) -> StatePublisher {
        StatePublisher::new(
            FrameConverter::new(config),
            TopicMap::default(),
            FrameIds::default(),
            Dispatcher::with_handles(vec![SinkHandle::spawn(sink.clone(), 64)]),
        )
    }

    fn resting_sample(position: Vector3) -> RawStateSample {
        RawStateSample {
            position,
            orientation: Orientation::Quaternion(Quaternion::IDENTITY),
            linear_velocity: Vector3::ZERO,
            angular_velocity: Vector3::ZERO,
            sequence: Some(1),
        }
    }

    fn float(publication: &Publication, topic: &str) -> f64 {
        match publication.message(topic) {
            Some(MessagePayload::Float64(v)) => *v,
            other => panic!("expected float on {topic}, got {other:?}"),
        }
    }

    /// Resting vehicle at (1, 2, 3) with identity attitude
    #[tokio::test]
    async fn test_resting_vehicle_scenario() {
        let sink = MemorySink::new("capture");
        let mut publisher = memory_publisher(ConversionConfig::default(), &sink);

        let stamp = Stamp {
            sec: 1_700_000_000,
            nanosec: 250,
        };
        let publication = publisher.publish_at(&resting_sample(Vector3::new(1.0, 2.0, 3.0)), stamp);

        assert_eq!(publication.messages.len(), PUBLICATION_MESSAGE_COUNT);
        assert_eq!(float(&publication, "/state/x"), 1.0);
        assert_eq!(float(&publication, "/state/y"), -2.0);
        assert_eq!(float(&publication, "/state/z"), -3.0);

        match publication.message("/state/pose") {
            Some(MessagePayload::Pose(pose)) => {
                assert_eq!(pose.position, Vector3::new(1.0, -2.0, -3.0));
                assert_relative_eq!(pose.orientation.x, 0.0, epsilon = 1e-12);
                assert_relative_eq!(pose.orientation.y, 0.0, epsilon = 1e-12);
                assert_relative_eq!(pose.orientation.z, 0.0, epsilon = 1e-12);
                assert_relative_eq!(pose.orientation.w.abs(), 1.0, epsilon = 1e-12);
            }
            other => panic!("expected pose, got {other:?}"),
        }

        for topic in ["/state/linear_velocity", "/state/angular_velocity"] {
            match publication.message(topic) {
                Some(MessagePayload::Vector3(v)) => {
                    assert_eq!(v.x.abs() + v.y.abs() + v.z.abs(), 0.0)
                }
                other => panic!("expected vector on {topic}, got {other:?}"),
            }
        }

        for topic in ["/sensors/imu/status", "/sensors/depth/status", "/sensors/dvl/status"] {
            assert_eq!(publication.message(topic), Some(&MessagePayload::Bool(true)));
        }

        match publication.message("/tf") {
            Some(MessagePayload::Tf(pair)) => {
                assert_eq!(pair.len(), 2);
                assert_eq!(pair[0].stamp, stamp);
                assert_eq!(pair[1].stamp, stamp);
                assert_eq!(pair[0].transform.translation, Vector3::new(1.0, -2.0, -3.0));
                assert_eq!(pair[1].transform.translation, Vector3::ZERO);
                assert_eq!(pair[0].transform.rotation, pair[1].transform.rotation);
                assert_eq!(pair[0].frame_id, "world");
                assert_eq!(pair[1].frame_id, "world_rotation");
            }
            other => panic!("expected tf pair, got {other:?}"),
        }

        publisher.shutdown().await;
        assert_eq!(sink.publications(), vec![(*publication).clone()]);
    }

    /// End-to-end: MockStateSource -> IngestionPipeline -> StatePublisher -> sink
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let source = MockStateSource::new(MockStateConfig {
            source_id: "mock".to_string(),
            rate_hz: 200.0,
            ..Default::default()
        });

        let mut ingestion = IngestionPipeline::new(BackpressureConfig::new(
            DropPolicy::DropOldest,
            InputRepresentation::Quaternion,
        ));
        ingestion.register_source(Box::new(source));
        ingestion.start_all();
        let rx = ingestion.take_receiver().unwrap();

        let sink = MemorySink::new("capture");
        let mut publisher = memory_publisher(ConversionConfig::default(), &sink);

        let published = tokio::time::timeout(Duration::from_secs(5), publisher.drive(&rx, Some(5)))
            .await
            .expect("pipeline timed out");
        assert_eq!(published, 5);

        ingestion.stop_all();
        let stats = publisher.shutdown().await;
        assert_eq!(stats.publications, 5);

        let publications = sink.publications();
        let sequences: Vec<u64> = publications.iter().map(|p| p.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3, 4]);

        for publication in &publications {
            assert_eq!(publication.messages.len(), PUBLICATION_MESSAGE_COUNT);
            // Mock vehicle holds native y = -5; the position map negates y.
            match publication.message("/state/pose") {
                Some(MessagePayload::Pose(pose)) => {
                    assert_relative_eq!(pose.orientation.norm(), 1.0, epsilon = 1e-6);
                    assert_relative_eq!(pose.position.y, 5.0, epsilon = 1e-9);
                }
                other => panic!("expected pose, got {other:?}"),
            }
        }
    }

    /// UDP datagrams -> UdpStateSource -> StatePublisher
    #[tokio::test]
    async fn test_e2e_udp_samples() {
        let source = UdpStateSource::bind(
            "unity",
            "127.0.0.1:0".parse().unwrap(),
            WireFormat::Json,
            InputRepresentation::Quaternion,
        )
        .await
        .unwrap();
        let target = source.local_addr().unwrap();

        let mut ingestion = IngestionPipeline::new(BackpressureConfig::new(
            DropPolicy::DropOldest,
            InputRepresentation::Quaternion,
        ));
        ingestion.register_source(Box::new(source));
        ingestion.start_all();
        let rx = ingestion.take_receiver().unwrap();

        let sink = MemorySink::new("capture");
        let mut publisher = memory_publisher(ConversionConfig::default(), &sink);

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        // Wrong representation first: counted and skipped
        let euler = RawStateSample {
            orientation: Orientation::Euler {
                degrees: Vector3::new(10.0, 0.0, 0.0),
            },
            ..resting_sample(Vector3::ZERO)
        };
        client
            .send_to(&encode_sample(&euler, WireFormat::Json).unwrap(), target)
            .await
            .unwrap();
        client.send_to(b"not a sample", target).await.unwrap();

        let sample = resting_sample(Vector3::new(4.0, 5.0, 6.0));
        client
            .send_to(&encode_sample(&sample, WireFormat::Json).unwrap(), target)
            .await
            .unwrap();

        let published = tokio::time::timeout(Duration::from_secs(5), publisher.drive(&rx, Some(1)))
            .await
            .expect("no sample arrived");
        assert_eq!(published, 1);

        ingestion.stop_all();
        let metrics = ingestion.metrics().snapshot();
        assert_eq!(metrics.representation_mismatches, 1);

        publisher.shutdown().await;
        let publications = sink.publications();
        assert_eq!(publications.len(), 1);
        assert_eq!(float(&publications[0], "/state/x"), 4.0);
        assert_eq!(float(&publications[0], "/state/y"), -5.0);
        assert_eq!(float(&publications[0], "/state/z"), -6.0);
    }

    /// Euler-input deployment publishes the same attitude it was given
    #[tokio::test]
    async fn test_euler_deployment_roll_only() {
        let config = ConversionConfig {
            input: InputRepresentation::Euler,
            ..ConversionConfig::default()
        };
        let sink = MemorySink::new("capture");
        let mut publisher = memory_publisher(config, &sink);

        let sample = RawStateSample {
            orientation: Orientation::Euler {
                degrees: Vector3::new(30.0, 0.0, 0.0),
            },
            ..resting_sample(Vector3::ZERO)
        };
        let publication = publisher.publish(&sample);

        // Native +x roll is mirrored onto the NED x axis
        assert_relative_eq!(float(&publication, "/state/theta/x").abs(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(float(&publication, "/state/theta/y"), 0.0, epsilon = 1e-9);
        assert_relative_eq!(float(&publication, "/state/theta/z"), 0.0, epsilon = 1e-9);

        publisher.shutdown().await;
    }

    /// Blueprint-built publisher writing through the file sink
    #[tokio::test]
    async fn test_file_sink_from_blueprint() {
        let dir = tempfile::tempdir().unwrap();

        let mut blueprint = BridgeBlueprint::default();
        blueprint.sinks = vec![
            SinkConfig::log("log"),
            SinkConfig {
                name: "files".to_string(),
                sink_type: SinkType::File,
                queue_capacity: 16,
                params: HashMap::from([(
                    "base_path".to_string(),
                    dir.path().display().to_string(),
                )]),
            },
        ];

        let mut publisher = StatePublisher::from_blueprint(&blueprint).await.unwrap();
        for i in 0..3 {
            publisher.publish(&resting_sample(Vector3::new(i as f64, 0.0, 0.0)));
        }
        let stats = publisher.shutdown().await;

        assert_eq!(stats.publications, 3);
        assert!(stats.sinks.iter().all(|(_, m)| m.write_count == 3));

        let content = std::fs::read_to_string(dir.path().join("state_x.jsonl")).unwrap();
        let xs: Vec<f64> = content
            .lines()
            .map(|line| {
                let record: serde_json::Value = serde_json::from_str(line).unwrap();
                record["payload"]["float64"].as_f64().unwrap()
            })
            .collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        assert!(dir.path().join("tf.jsonl").exists());
    }

    /// Publishing never waits on a sink that cannot keep up
    #[tokio::test]
    async fn test_shared_publication_across_sinks() {
        let first = MemorySink::new("a");
        let second = MemorySink::new("b");
        let mut publisher = StatePublisher::new(
            FrameConverter::new(ConversionConfig::default()),
            TopicMap::default(),
            FrameIds::default(),
            Dispatcher::with_handles(vec![
                SinkHandle::spawn(first.clone(), 16),
                SinkHandle::spawn(second.clone(), 16),
            ]),
        );

        let publication: Arc<Publication> = publisher.publish(&resting_sample(Vector3::ZERO));
        publisher.shutdown().await;

        assert_eq!(first.publications(), vec![(*publication).clone()]);
        assert_eq!(second.publications(), first.publications());
    }
}
