mod config;
use config::ReplayConfig;
use heimdall_core::dashboard::{DashboardServer, SnapshotBroadcaster, TopologyView};
use heimdall_core::render::LoggingSink;
use heimdall_core::{RenderEngine, SnapshotFeed};
use tokio::signal;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    heimdall_core::telemetry::init_logging("info,heimdall_core=info,replay=info");

    let cfg = ReplayConfig::load();
    info!(
        target: "replay",
        input = %cfg.input.display(),
        interval_ms = cfg.interval_ms,
        repeat = cfg.repeat,
        "Starting snapshot replay"
    );

    let payloads: Vec<String> = tokio::fs::read_to_string(&cfg.input)
        .await?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect();
    if payloads.is_empty() {
        warn!(target: "replay", "Capture file has no payloads");
    }

    let broadcaster = SnapshotBroadcaster::new(cfg.dashboard.broadcast_capacity);
    let view = TopologyView::new();

    let server_handle = if cfg.serve {
        let server = DashboardServer::new(cfg.dashboard.clone(), broadcaster.clone(), view.clone());
        Some(tokio::spawn(async move {
            if let Err(e) = server.serve().await {
                error!(target: "replay", error = %e, "Dashboard relay stopped");
            }
        }))
    } else {
        None
    };

    let (feed, consumer) =
        SnapshotFeed::channel(cfg.dashboard.queue_capacity, RenderEngine::new(LoggingSink::new()));
    let consumer = consumer.with_view(view).with_broadcaster(broadcaster);
    let consumer_handle = tokio::spawn(consumer.run());

    let mut ticker = interval(Duration::from_millis(cfg.interval_ms.max(1)));
    'replay: loop {
        for payload in &payloads {
            ticker.tick().await;
            if feed.push(payload.clone()).await.is_err() {
                warn!(target: "replay", "Snapshot consumer gone; stopping replay");
                break 'replay;
            }
        }
        if !cfg.repeat || payloads.is_empty() {
            break;
        }
    }
    drop(feed);

    let (engine, stats) = consumer_handle.await?;
    info!(
        target: "replay",
        received = stats.received,
        applied = stats.applied,
        stale = stats.stale,
        decode_errors = stats.decode_errors,
        rejected_devices = stats.rejected_devices,
        devices = engine.topology().len(),
        overlays = engine.overlays().len(),
        sink_mutations = engine.sink().mutations(),
        "Replay finished"
    );

    if let Some(handle) = server_handle {
        info!(target: "replay", "Relay still serving; press Ctrl-C to exit");
        tokio::select! {
            _ = signal::ctrl_c() => {}
            _ = handle => {}
        }
    }

    Ok(())
}
