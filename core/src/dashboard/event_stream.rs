// Snapshot streaming for Dashboard
//
// Uses tokio broadcast channel to push every producer payload to all
// connected WebSocket and SSE clients

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// One relayed payload
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotFrame {
    /// Relay-assigned, increasing per broadcaster
    pub relay_seq: u64,
    /// Timestamp (ISO 8601)
    pub received_at: String,
    /// Payload exactly as the producer sent it
    pub payload: String,
}

/// Snapshot broadcaster for Dashboard
#[derive(Clone)]
pub struct SnapshotBroadcaster {
    sender: broadcast::Sender<SnapshotFrame>,
    next_seq: Arc<AtomicU64>,
}

impl SnapshotBroadcaster {
    /// Create a new broadcaster with buffer size
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            next_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Broadcast a payload to all subscribers; returns the frame's relay_seq
    pub fn broadcast(&self, payload: impl Into<String>) -> u64 {
        let relay_seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        // Ignore error if no subscribers
        let _ = self.sender.send(SnapshotFrame {
            relay_seq,
            received_at: chrono::Utc::now().to_rfc3339(),
            payload: payload.into(),
        });
        relay_seq
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SnapshotFrame> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SnapshotBroadcaster {
    fn default() -> Self {
        Self::new(16)
    }
}
