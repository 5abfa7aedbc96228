//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 文件 -> Chunker -> Dispatcher -> 设备 的端到端测试
//! - 聊天事件 -> ChatRelay -> 设备 的端到端测试
//! - Memobird HTTP 设备的端到端测试 (httpmock)

#[cfg(test)]
mod contract_tests {
    use contracts::{DeliveryOutcome, PrintStatus};

    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_printed_flag_is_one() {
        assert!(PrintStatus(1).is_printed());
        assert_eq!(DeliveryOutcome::NoDevices.label(), "no_devices");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ChatMessage, ChunkPolicy, DeliveryMode, DeliveryOutcome, MessageConsumer};
    use device_factory::{DeviceRegistry, MockDevice, MockDeviceConfig, MockDeviceFactory};
    use dispatcher::{ChatRelay, Chunker, ChunkerConfig, DeliveryConfig, Dispatcher};
    use ingestion::{FileLineSource, JsonLinesChatSource, LineSourceConfig, MemoryLineSource};
    use tokio::io::BufReader;

    const CONFIG: &str = r#"
[memobird]
access_key = "ak-test"

[chat]
room = true
pattern = "^Book Club$"

[print]
chunk_read_lines = 2
settle_delay_ms = 1000
chunk_policy = "concurrent"

[[devices]]
device_id = "bird-1"

[[devices]]
device_id = "bird-2"
"#;

    /// Build a dispatcher over mock devices from the `[[devices]]` of `CONFIG`
    fn mock_fleet(print_mode: DeliveryMode) -> (Dispatcher<MockDevice>, Vec<MockDevice>) {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let mut registry = DeviceRegistry::new();
        registry
            .register_all(&MockDeviceFactory::default(), &blueprint.devices)
            .unwrap();
        let devices = registry.list().to_vec();

        let mut delivery = DeliveryConfig::from(&blueprint.print);
        delivery.mode = print_mode;
        (Dispatcher::new(registry, delivery), devices)
    }

    /// End-to-end test: FileLineSource -> Chunker (concurrent) -> Dispatcher -> MockDevice
    #[tokio::test(start_paused = true)]
    async fn test_e2e_file_to_devices_concurrent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Chapter 1\n\n  l1  \nl2\nl3\n\nl4\nl5").unwrap();

        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        assert_eq!(blueprint.print.chunk_policy, ChunkPolicy::Concurrent);

        let (dispatcher, devices) = mock_fleet(DeliveryMode::BestEffort);
        let chunker = Chunker::new(&dispatcher, ChunkerConfig::from_print(&blueprint.print, 1));
        let mut source = FileLineSource::open(file.path(), LineSourceConfig::new(2))
            .await
            .unwrap();

        let report = chunker.run(&mut source).await.unwrap();

        assert_eq!(devices[0].printed(), vec!["l1\nl2"]);
        assert_eq!(devices[1].printed(), vec!["l3\nl4"]);
        assert_eq!(report.lines_skipped, 1);
        assert_eq!(report.blank_lines, 2);
        assert_eq!(report.chunks_flushed, 1);
        assert_eq!(report.trailing_dropped, 1);
        assert_eq!(dispatcher.summary().succeeded, 2);
    }

    /// A non-UTF-8 line (GBK text) does not stop printing the rest of the file
    #[tokio::test(start_paused = true)]
    async fn test_e2e_file_with_non_utf8_line_keeps_printing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"l1\nl2\ncaf\xe9\nl3\nl4\nl5\n").unwrap();

        let bird = MockDevice::new("bird");
        let dispatcher = Dispatcher::new(
            [bird.clone()].into_iter().collect(),
            DeliveryConfig::default(),
        );
        let chunker = Chunker::new(
            &dispatcher,
            ChunkerConfig {
                policy: ChunkPolicy::Pipeline,
                chunk_lines: 2,
                ..Default::default()
            },
        );
        let mut source = FileLineSource::open(file.path(), LineSourceConfig::default())
            .await
            .unwrap();

        let report = chunker.run(&mut source).await.unwrap();

        assert_eq!(
            bird.printed(),
            vec!["l1\nl2", "caf\u{FFFD}\nl3", "l4\nl5"]
        );
        assert_eq!(report.chunks_flushed, 3);
        assert_eq!(source.metrics().snapshot().lossy_lines, 1);
    }

    /// Round-robin continues across runs and ignores failures
    #[tokio::test(start_paused = true)]
    async fn test_e2e_rotation_survives_failures() {
        let flaky = MockDevice::with_config(
            "flaky",
            MockDeviceConfig {
                fail_print: true,
                ..Default::default()
            },
        );
        let steady = MockDevice::new("steady");
        let registry = [flaky, steady.clone()].into_iter().collect();
        let dispatcher = Dispatcher::new(registry, DeliveryConfig::default());

        let config = ChunkerConfig {
            policy: ChunkPolicy::Pipeline,
            chunk_lines: 1,
            settle_delay: Duration::from_secs(20),
            ..Default::default()
        };
        let chunker = Chunker::new(&dispatcher, config);

        let first = chunker
            .run(&mut MemoryLineSource::new(["a", "b", "c"]))
            .await
            .unwrap();
        let second = chunker
            .run(&mut MemoryLineSource::new(["d"]))
            .await
            .unwrap();

        assert_eq!(first.deliveries_failed, 2);
        assert_eq!(first.deliveries_succeeded, 1);
        // counter = 3 -> steady
        assert_eq!(second.deliveries_succeeded, 1);
        assert_eq!(steady.printed(), vec!["b", "d"]);
        assert_eq!(dispatcher.dispatch_count(), 4);
    }

    /// End-to-end test: chat events -> ChatRelay -> MockDevice
    #[tokio::test]
    async fn test_e2e_chat_events_to_devices() {
        let events = [
            r#"{"event":"scan","url":"https://login.example/qrcode/abc","code":0}"#,
            r#"{"event":"login","user":"relay-bot"}"#,
            r#"{"event":"message","sender":"alice","room_topic":"Book Club","content":"<b>page 1</b>","kind":1,"received_at":"2020-01-02T03:04:05+08:00"}"#,
            r#"not json"#,
            r#"{"event":"message","sender":"bob","room_topic":"Book Club","content":"[image]","kind":3}"#,
            r#"{"event":"message","sender":"carol","room_topic":"Gossip","content":"hi","kind":1}"#,
            r#"{"event":"message","sender":"dave","room_topic":"Book Club","content":"page 2","kind":1}"#,
            r#"{"event":"logout","user":"relay-bot"}"#,
        ]
        .join("\n");

        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let (dispatcher, devices) = mock_fleet(DeliveryMode::BestEffort);
        let mut relay = ChatRelay::from_config(&dispatcher, &blueprint.chat).unwrap();
        let mut source = JsonLinesChatSource::new("bridge", BufReader::new(events.as_bytes()));

        let source_stats = source.run(&mut relay).await.unwrap();

        assert_eq!(source_stats.messages, 4);
        assert_eq!(source_stats.invalid, 1);
        assert_eq!(relay.stats().relayed, 2);
        assert_eq!(relay.stats().ignored, 2);

        let first = &devices[0].printed()[0];
        assert!(first.starts_with("alice  ("), "got: {first}");
        assert!(first.ends_with("):\npage 1"), "got: {first}");
        assert!(devices[1].printed()[0].starts_with("dave  ("));
    }

    /// Complete mode: a device that never reports printed times out, the next one confirms
    #[tokio::test(start_paused = true)]
    async fn test_e2e_complete_mode_timeout_and_confirm() {
        let stuck = MockDevice::with_config(
            "stuck",
            MockDeviceConfig {
                statuses: vec![0],
                ..Default::default()
            },
        );
        let quick = MockDevice::new("quick");
        let registry = [stuck.clone(), quick.clone()].into_iter().collect();
        let dispatcher = Dispatcher::new(
            registry,
            DeliveryConfig {
                mode: DeliveryMode::Complete,
                poll_interval: Duration::from_secs(20),
                timeout: Duration::from_secs(60),
            },
        );
        let mut relay = ChatRelay::new(
            &dispatcher,
            ingestion::MessageFilter::new("^alice$", false).unwrap(),
        );

        relay.on_message(ChatMessage::text("alice", None, "one")).await;
        relay.on_message(ChatMessage::text("alice", None, "two")).await;

        let outcomes = relay.outcomes();
        assert!(matches!(outcomes[0], DeliveryOutcome::Failed { .. }));
        assert!(matches!(outcomes[1], DeliveryOutcome::Confirmed { .. }));
        assert_eq!(stuck.status_calls(), 3);
        assert_eq!(quick.status_calls(), 1);
    }

    /// Empty registry: nothing is dispatched and nothing fails
    #[tokio::test(start_paused = true)]
    async fn test_e2e_without_devices() {
        let dispatcher: Dispatcher<MockDevice> =
            Dispatcher::new(DeviceRegistry::new(), DeliveryConfig::default());
        let chunker = Chunker::new(
            &dispatcher,
            ChunkerConfig {
                chunk_lines: 2,
                ..Default::default()
            },
        );

        let report = chunker
            .run(&mut MemoryLineSource::new(["a", "b", "c", "d"]))
            .await
            .unwrap();

        assert_eq!(report.chunks_flushed, 2);
        assert_eq!(report.deliveries_succeeded + report.deliveries_failed, 0);
        assert_eq!(dispatcher.summary().no_devices, 2);
    }
}

#[cfg(test)]
mod memobird_e2e_tests {
    use contracts::{DeviceConfig, MemobirdConfig};
    use device_factory::MemobirdFactory;
    use dispatcher::{Chunker, ChunkerConfig, DeliveryConfig, Dispatcher};
    use httpmock::prelude::*;
    use ingestion::MemoryLineSource;
    use serde_json::json;

    /// MemoryLineSource -> Chunker -> Dispatcher -> MemobirdDevice -> HTTP
    #[tokio::test]
    async fn test_e2e_memobird_http_round_trip() {
        let server = MockServer::start_async().await;
        let bind = server.mock(|when, then| {
            when.method(POST).path("/setuserbind");
            then.status(200)
                .json_body(json!({"showapi_res_code": 1, "showapi_userid": 42}));
        });
        let print = server.mock(|when, then| {
            // "l1\nl2" in GBK, base64 encoded
            when.method(POST).path("/printpaper").is_true(|req| {
                let body = String::from_utf8_lossy(req.body().as_ref());
                body.contains(r#""printcontent":"T:bDEKbDI=""#) && body.contains(r#""userID":"42""#)
            });
            then.status(200)
                .json_body(json!({"showapi_res_code": 1, "printcontentid": 9}));
        });

        let factory = MemobirdFactory::new(&MemobirdConfig {
            access_key: "ak-test".into(),
            api_base: server.base_url(),
            request_timeout_ms: 2_000,
        })
        .unwrap();

        let mut dispatcher = Dispatcher::new(Default::default(), DeliveryConfig::default());
        dispatcher
            .register(&factory, &DeviceConfig::new("bird-1"))
            .unwrap();

        let chunker = Chunker::new(
            &dispatcher,
            ChunkerConfig {
                chunk_lines: 2,
                settle_delay: std::time::Duration::ZERO,
                ..Default::default()
            },
        );
        let report = chunker
            .run(&mut MemoryLineSource::new(["l1", "l2", "l1", "l2"]))
            .await
            .unwrap();

        assert_eq!(report.deliveries_succeeded, 2);
        bind.assert_calls(1);
        print.assert_calls(2);
    }
}
