// Stream client boundary
//
// Payloads from the transport are queued on a bounded channel and drained by
// exactly one consumer that owns the render engine, so snapshots are diffed
// strictly in arrival order.

use crate::dashboard::{SnapshotBroadcaster, TopologyView};
use crate::render::{RenderEngine, RenderReport, RenderSink, ReportKind};
use crate::{HeimdallError, Result};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Counters kept by the consumer
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub received: u64,
    pub applied: u64,
    pub stale: u64,
    pub decode_errors: u64,
    pub rejected_devices: u64,
}

/// Producer side of the snapshot queue
#[derive(Clone, Debug)]
pub struct SnapshotFeed {
    tx: mpsc::Sender<String>,
}

impl SnapshotFeed {
    /// Create a feed and the consumer that will own `engine`
    pub fn channel<S: RenderSink>(
        capacity: usize,
        engine: RenderEngine<S>,
    ) -> (SnapshotFeed, SnapshotConsumer<S>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            SnapshotFeed { tx },
            SnapshotConsumer {
                engine,
                rx,
                stats: StreamStats::default(),
                view: None,
                broadcaster: None,
            },
        )
    }

    /// Queue a payload, waiting while the queue is full
    pub async fn push(&self, payload: impl Into<String>) -> Result<()> {
        self.tx
            .send(payload.into())
            .await
            .map_err(|_| HeimdallError::FeedClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct SnapshotConsumer<S: RenderSink> {
    engine: RenderEngine<S>,
    rx: mpsc::Receiver<String>,
    stats: StreamStats,
    view: Option<TopologyView>,
    broadcaster: Option<SnapshotBroadcaster>,
}

impl<S: RenderSink> SnapshotConsumer<S> {
    /// Publish the committed topology here after every applied snapshot
    pub fn with_view(mut self, view: TopologyView) -> Self {
        self.view = Some(view);
        self
    }

    /// Relay accepted payloads to live subscribers. Undecodable and stale
    /// payloads are never fanned out.
    pub fn with_broadcaster(mut self, broadcaster: SnapshotBroadcaster) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub fn engine(&self) -> &RenderEngine<S> {
        &self.engine
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Handle one payload. Decode failures are logged and leave state as is.
    pub fn process(&mut self, payload: &str) -> Option<RenderReport> {
        self.stats.received += 1;
        match self.engine.apply_payload(payload) {
            Ok(report) => {
                self.stats.rejected_devices += report.rejected as u64;
                if report.kind == ReportKind::Stale {
                    self.stats.stale += 1;
                } else {
                    self.stats.applied += 1;
                    if let Some(broadcaster) = &self.broadcaster {
                        broadcaster.broadcast(payload);
                    }
                }
                Some(report)
            }
            Err(e) => {
                self.stats.decode_errors += 1;
                warn!(target: "stream", error = %e, "Discarding undecodable snapshot");
                None
            }
        }
    }

    /// Drain the queue until every feed handle is dropped
    pub async fn run(mut self) -> (RenderEngine<S>, StreamStats) {
        info!(target: "stream", "Snapshot consumer started");

        while let Some(payload) = self.rx.recv().await {
            let Some(report) = self.process(&payload) else {
                continue;
            };
            if report.kind == ReportKind::Stale {
                continue;
            }
            if let Some(view) = &self.view {
                view.publish(self.engine.topology().devices(), self.engine.overlays().len())
                    .await;
            }
            debug!(target: "stream", kind = ?report.kind, mutations = report.mutations, "Snapshot applied");
        }

        info!(
            target: "stream",
            received = self.stats.received,
            applied = self.stats.applied,
            stale = self.stats.stale,
            decode_errors = self.stats.decode_errors,
            "Snapshot consumer stopped"
        );
        (self.engine, self.stats)
    }
}
