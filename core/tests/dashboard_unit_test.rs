//! Dashboard Unit Tests
//!
//! Unit tests for the relay components:
//! - SnapshotBroadcaster: payload fan-out
//! - TopologyView: committed topology publishing
//! - DashboardConfig: Configuration management

use heimdall_core::dashboard::{DashboardConfig, DashboardServer, SnapshotBroadcaster, TopologyView};
use heimdall_core::{ConnectionKind, Device};
use tokio::time::{sleep, Duration};

// =============================================================================
// SnapshotBroadcaster Tests
// =============================================================================

#[tokio::test]
async fn broadcaster_creates_with_capacity() {
    let broadcaster = SnapshotBroadcaster::new(100);
    assert_eq!(broadcaster.subscriber_count(), 0);
}

#[tokio::test]
async fn broadcaster_delivers_to_all_subscribers() {
    let broadcaster = SnapshotBroadcaster::new(16);

    let mut rx1 = broadcaster.subscribe();
    let mut rx2 = broadcaster.subscribe();
    assert_eq!(broadcaster.subscriber_count(), 2);

    let seq = broadcaster.broadcast(r#"[{"name":"ap"}]"#);

    let f1 = rx1.try_recv().expect("rx1 should receive frame");
    let f2 = rx2.try_recv().expect("rx2 should receive frame");
    assert_eq!(f1.relay_seq, seq);
    assert_eq!(f2.payload, r#"[{"name":"ap"}]"#);
}

#[tokio::test]
async fn broadcaster_handles_no_subscribers() {
    let broadcaster = SnapshotBroadcaster::new(8);
    // Should not panic with no subscribers
    let first = broadcaster.broadcast("[]");
    let second = broadcaster.broadcast("[]");
    assert!(second > first);
}

#[tokio::test]
async fn broadcaster_preserves_order() {
    let broadcaster = SnapshotBroadcaster::new(16);
    let mut rx = broadcaster.subscribe();

    for i in 0..5 {
        broadcaster.broadcast(format!("payload {}", i));
    }

    for i in 0..5 {
        let frame = rx.try_recv().expect("should receive frame");
        assert_eq!(frame.payload, format!("payload {}", i));
    }
}

#[tokio::test]
async fn broadcaster_subscriber_drop_reduces_count() {
    let broadcaster = SnapshotBroadcaster::new(8);

    let rx1 = broadcaster.subscribe();
    let rx2 = broadcaster.subscribe();
    assert_eq!(broadcaster.subscriber_count(), 2);

    drop(rx1);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(broadcaster.subscriber_count(), 1);

    drop(rx2);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(broadcaster.subscriber_count(), 0);
}

// =============================================================================
// TopologyView Tests
// =============================================================================

#[tokio::test]
async fn view_starts_empty() {
    let view = TopologyView::new();
    let report = view.snapshot().await;
    assert!(report.devices.is_empty());
    assert!(report.timestamp.is_none());
}

#[tokio::test]
async fn view_publish_summarizes_lanes() {
    let view = TopologyView::new();
    let devices = vec![
        Device::new("ap1", ConnectionKind::Wireless, 0.0, 0.0, vec![]).unwrap(),
        Device::new("ap2", ConnectionKind::Wireless, 0.0, 0.0, vec![]).unwrap(),
        Device::new("nas", ConnectionKind::Wired, 3.0, 4.0, vec![]).unwrap(),
    ];
    view.publish(&devices, 1).await;

    let report = view.snapshot().await;
    let counts: Vec<(ConnectionKind, usize)> =
        report.lanes.iter().map(|l| (l.lane, l.devices)).collect();
    assert_eq!(
        counts,
        vec![
            (ConnectionKind::Wireless, 2),
            (ConnectionKind::Origin, 0),
            (ConnectionKind::Wired, 1),
        ]
    );
    assert_eq!(report.overlays, 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["devices"][2]["connection"], "Wired");
    assert_eq!(json["devices"][2]["cpu_usage"], 3.0);
}

// =============================================================================
// DashboardConfig Tests
// =============================================================================

#[test]
fn config_defaults() {
    let config = DashboardConfig::default();
    assert_eq!(config.port, 7032);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.addr(), "127.0.0.1:7032");
    assert!(config.queue_capacity > 0);
}

#[tokio::test]
async fn server_builds_router() {
    let server = DashboardServer::new(
        DashboardConfig::default(),
        SnapshotBroadcaster::default(),
        TopologyView::new(),
    );
    let _router = server.router();
}
