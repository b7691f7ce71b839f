use heimdall_core::dashboard::{SnapshotBroadcaster, TopologyView};
use heimdall_core::render::MemorySink;
use heimdall_core::{Lane, RenderEngine, ReportKind, SnapshotFeed, StreamStats};

fn payload(seq: u64, devices: &[(&str, &str, f64)]) -> String {
    let devices: Vec<serde_json::Value> = devices
        .iter()
        .map(|(name, connection, cpu)| {
            serde_json::json!({
                "name": name,
                "connection": connection,
                "cpu_usage": cpu,
                "mem_usage": 0.0,
                "capabilities": ["ping"],
            })
        })
        .collect();
    serde_json::json!({ "seq": seq, "devices": devices }).to_string()
}

#[tokio::test]
async fn consumer_applies_in_arrival_order_and_publishes_view() {
    let view = TopologyView::new();
    let (feed, consumer) = SnapshotFeed::channel(4, RenderEngine::new(MemorySink::new()));
    let consumer = consumer.with_view(view.clone());
    let handle = tokio::spawn(consumer.run());

    feed.push(payload(1, &[("ap", "Wireless", 1.0), ("nas", "Wired", 2.0)]))
        .await
        .unwrap();
    feed.push(payload(2, &[("ap", "Wireless", 3.0)])).await.unwrap();
    feed.push("garbage").await.unwrap();
    feed.push(payload(1, &[])).await.unwrap();
    feed.push(payload(3, &[("ap", "Wired", 3.0)])).await.unwrap();
    drop(feed);

    let (engine, stats) = handle.await.unwrap();
    assert_eq!(
        stats,
        StreamStats {
            received: 5,
            applied: 3,
            stale: 1,
            decode_errors: 1,
            rejected_devices: 0,
        }
    );
    assert_eq!(engine.sink().lane_names(Lane::Wired), vec!["ap"]);
    assert!(engine.sink().lane(Lane::Wireless).is_empty());
    assert_eq!(engine.topology().last_seq(), Some(3));

    let report = view.snapshot().await;
    assert_eq!(report.devices.len(), 1);
    assert_eq!(report.devices[0].name, "ap");
    assert_eq!(report.overlays, 1);
    assert_eq!(report.lanes[2].devices, 1);
    assert!(report.timestamp.is_some());
}

#[tokio::test]
async fn push_fails_once_consumer_is_gone() {
    let (feed, consumer) = SnapshotFeed::channel(1, RenderEngine::new(MemorySink::new()));
    drop(consumer);
    assert!(feed.is_closed());
    assert!(feed.push("[]").await.is_err());
}

#[test]
fn process_counts_rejected_devices() {
    let (_feed, mut consumer) = SnapshotFeed::channel(1, RenderEngine::new(MemorySink::new()));
    let report = consumer
        .process(r#"[{"name":"","connection":"Wired","cpu_usage":0,"mem_usage":0}]"#)
        .unwrap();
    assert_eq!(report.kind, ReportKind::FullRender);
    assert_eq!(consumer.stats().rejected_devices, 1);
    assert!(consumer.engine().is_live());
}

#[test]
fn only_accepted_payloads_are_fanned_out() {
    let broadcaster = SnapshotBroadcaster::new(8);
    let mut rx = broadcaster.subscribe();
    let (_feed, consumer) = SnapshotFeed::channel(1, RenderEngine::new(MemorySink::new()));
    let mut consumer = consumer.with_broadcaster(broadcaster);

    let first = payload(2, &[("ap", "Wireless", 1.0)]);
    let next = payload(3, &[("ap", "Wireless", 2.0)]);
    consumer.process(&first);
    consumer.process("garbage");
    consumer.process(r#"{"devices": 3}"#);
    consumer.process(&payload(1, &[]));
    consumer.process(&payload(2, &[]));
    consumer.process(&next);

    let relayed: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(|frame| frame.payload)
        .collect();
    assert_eq!(relayed, vec![first, next]);
    assert_eq!(consumer.stats().stale, 2);
    assert_eq!(consumer.stats().decode_errors, 2);
}
