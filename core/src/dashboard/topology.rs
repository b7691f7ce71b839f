// Committed topology view for Dashboard
//
// The snapshot consumer publishes a copy after each commit; HTTP handlers
// only ever read it.

use crate::device::{ConnectionKind, Device};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TopologyReport {
    pub devices: Vec<Device>,
    /// Device counts per lane, in render order
    pub lanes: Vec<LaneSummary>,
    pub overlays: usize,
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LaneSummary {
    pub lane: ConnectionKind,
    pub devices: usize,
}

#[derive(Clone, Default)]
pub struct TopologyView {
    inner: Arc<RwLock<TopologyReport>>,
}

impl TopologyView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn publish(&self, devices: &[Device], overlays: usize) {
        let lanes = ConnectionKind::ALL
            .into_iter()
            .map(|lane| LaneSummary {
                lane,
                devices: devices.iter().filter(|d| d.connection_kind == lane).count(),
            })
            .collect();

        let mut report = self.inner.write().await;
        *report = TopologyReport {
            devices: devices.to_vec(),
            lanes,
            overlays,
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        };
    }

    pub async fn snapshot(&self) -> TopologyReport {
        self.inner.read().await.clone()
    }
}
