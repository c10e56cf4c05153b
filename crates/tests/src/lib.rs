//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟设备 e2e 测试（无需真实传感器）

#[cfg(test)]
mod contract_tests {
    use contracts::{ForwardPolicy, PoseUpdate, TrackerBlueprint};

    #[test]
    fn test_blueprint_defaults() {
        let blueprint: TrackerBlueprint =
            serde_json::from_str(r#"{ "sinks": [] }"#).unwrap();
        assert_eq!(blueprint.tracker.max_missed_frames, 100);
        assert_eq!(blueprint.tracker.forward_policy, ForwardPolicy::FreshOnly);
        assert_eq!(blueprint.device.initial_elevation, 0);
    }

    #[test]
    fn test_pose_update_field_names() {
        let json = serde_json::to_value(PoseUpdate::default()).unwrap();
        for field in ["x", "y", "z", "pitch", "roll", "yaw"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use bytes::Bytes;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ColorFormat, DepthFormat, PoseSink, PoseUpdate, SensingDevice, SkeletonEstimate,
        SubjectId, TrackerConfig, Vector3,
    };
    use ingestion::{
        frame_gate, FrameAssembler, IngestionMetrics, RawColorFrame, RawDepthFrame, RawFrameSet,
        SimulatedDevice, SimulatedDeviceConfig, SyntheticEstimatorFactory,
    };
    use session_registry::SessionRegistry;

    /// Sink that keeps every update for inspection
    #[derive(Clone, Default)]
    struct RecordingSink {
        updates: Arc<Mutex<Vec<PoseUpdate>>>,
    }

    impl RecordingSink {
        fn len(&self) -> usize {
            self.updates.lock().unwrap().len()
        }
    }

    impl PoseSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        fn update(&mut self, pose: PoseUpdate) {
            self.updates.lock().unwrap().push(pose);
        }
    }

    fn device_config(subjects: usize, frames: u64) -> SimulatedDeviceConfig {
        SimulatedDeviceConfig {
            frame_rate_hz: 200.0,
            subjects,
            frame_limit: Some(frames),
            ..SimulatedDeviceConfig::default()
        }
    }

    fn raw(sequence: u64, depth_format: DepthFormat, subjects: &[u32]) -> RawFrameSet {
        let color_format = ColorFormat::Rgb640x480Fps30;
        RawFrameSet {
            sequence,
            color: Some(RawColorFrame {
                format: color_format,
                data: Bytes::from(vec![0u8; color_format.buffer_len()]),
            }),
            depth: Some(RawDepthFrame {
                format: depth_format,
                data: vec![1000; depth_format.pixel_count()],
            }),
            skeletons: Some(
                subjects
                    .iter()
                    .map(|&id| SkeletonEstimate::tracked(id, Vector3::new(0.0, 0.0, 2.0)))
                    .collect(),
            ),
        }
    }

    /// End-to-end: SimulatedDevice -> FrameGate -> FrameAssembler -> SessionRegistry -> sink
    #[tokio::test]
    async fn test_e2e_simulated_device() {
        let metrics = Arc::new(IngestionMetrics::new());
        let (gate, frames) = frame_gate(metrics.clone());
        let mut device = SimulatedDevice::new(device_config(2, 20), gate, metrics.clone());
        let mut assembler = FrameAssembler::new(metrics.clone());

        let factory = SyntheticEstimatorFactory::new();
        let sink = RecordingSink::default();
        let mut registry =
            SessionRegistry::new(TrackerConfig::default(), factory.clone(), sink.clone());

        device.start().await.unwrap();

        let run = async {
            let mut processed = 0;
            while let Some(delivery) = frames.recv().await {
                let bundle = assembler.assemble(&delivery).unwrap();
                let report = registry.process_bundle(&bundle).report().cloned().unwrap();
                // Slot 1 is always the first observed subject
                assert_eq!(report.selected, Some(SubjectId(1)));
                processed += 1;
            }
            processed
        };
        let processed = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("device did not close the stream");
        device.stop().await.unwrap();

        assert!(processed > 0);
        assert_eq!(registry.session_count(), 2);
        assert_eq!(factory.live(), 2);
        // Synthetic faces are always found at 1.8 m
        assert_eq!(sink.len(), processed);

        assert_eq!(registry.shutdown(), 2);
        assert_eq!(factory.live(), 0);
    }

    /// A slow consumer makes the device skip frames instead of queueing them
    #[tokio::test]
    async fn test_e2e_slow_consumer_skips_frames() {
        let metrics = Arc::new(IngestionMetrics::new());
        let (gate, frames) = frame_gate(metrics.clone());
        let mut device = SimulatedDevice::new(device_config(1, 40), gate, metrics.clone());
        let mut assembler = FrameAssembler::new(metrics.clone());
        let mut registry = SessionRegistry::new(
            TrackerConfig::default(),
            SyntheticEstimatorFactory::new(),
            RecordingSink::default(),
        );

        device.start().await.unwrap();

        let run = async {
            let mut last = 0;
            while let Some(delivery) = frames.recv().await {
                let bundle = assembler.assemble(&delivery).unwrap();
                let outcome = registry.process_bundle(&bundle);
                assert!(outcome.report().is_some(), "bundle {} rejected", bundle.sequence);
                assert!(bundle.sequence > last);
                last = bundle.sequence;
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), run)
            .await
            .expect("device did not close the stream");
        device.stop().await.unwrap();

        let snapshot = metrics.snapshot();
        assert!(snapshot.frames_skipped > 0);
        assert_eq!(
            snapshot.frames_delivered + snapshot.frames_skipped,
            snapshot.frames_produced
        );
    }

    /// A depth format change invalidates every session before the subject scan
    #[test]
    fn test_e2e_format_change_through_assembler() {
        let metrics = Arc::new(IngestionMetrics::new());
        let mut assembler = FrameAssembler::new(metrics.clone());
        let factory = SyntheticEstimatorFactory::new();
        let mut registry =
            SessionRegistry::new(TrackerConfig::default(), factory.clone(), RecordingSink::default());

        let bundle = assembler
            .assemble(&raw(1, DepthFormat::Depth320x240Fps30, &[1, 2]))
            .unwrap();
        registry.process_bundle(&bundle);
        assert_eq!(factory.live(), 2);

        let bundle = assembler
            .assemble(&raw(2, DepthFormat::Depth80x60Fps30, &[2]))
            .unwrap();
        let report = registry.process_bundle(&bundle).report().cloned().unwrap();

        assert!(report.format_changed);
        assert_eq!(report.invalidated, 2);
        assert_eq!(report.created, 1);
        assert_eq!(registry.subject_ids(), vec![SubjectId(2)]);
        assert_eq!(factory.live(), 1);
        assert_eq!(metrics.snapshot().buffer_reallocations, 4);
    }

    /// Config file -> registry policy -> fan-out sinks on disk
    #[tokio::test]
    async fn test_e2e_config_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("poses.jsonl");
        let content = format!(
            r#"
[tracker]
max_missed_frames = 2

[[sinks]]
name = "file"
sink_type = "file"
params = {{ path = "{}" }}
"#,
            path.display()
        );
        let blueprint = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();

        let (fanout, workers) = dispatcher::create_sink(&blueprint.sinks).await.unwrap();
        let mut registry = SessionRegistry::new(
            blueprint.tracker.clone(),
            SyntheticEstimatorFactory::new(),
            fanout,
        );
        let mut assembler = FrameAssembler::new(Arc::new(IngestionMetrics::new()));

        let mut forwarded = 0;
        for sequence in 1..=3 {
            let bundle = assembler
                .assemble(&raw(sequence, DepthFormat::Depth80x60Fps30, &[7]))
                .unwrap();
            if registry.process_bundle(&bundle).forwarded().is_some() {
                forwarded += 1;
            }
        }
        // Subject 7 leaves; last seen at 3, stale once more than 2 frames pass
        let bundle = assembler
            .assemble(&raw(6, DepthFormat::Depth80x60Fps30, &[]))
            .unwrap();
        let report = registry.process_bundle(&bundle).report().cloned().unwrap();
        assert_eq!(report.evicted, vec![SubjectId(7)]);
        assert!(report.forwarded.is_none());

        drop(registry);
        let results = workers.join().await;
        assert_eq!(results[0].1.write_count, forwarded);

        let lines = std::fs::read_to_string(&path).unwrap();
        let records: Vec<dispatcher::PoseRecord> = lines
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len() as u64, forwarded);
        assert_eq!(records.last().map(|r| r.sequence), Some(forwarded));
    }
}
