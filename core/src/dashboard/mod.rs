// Dashboard relay - Live snapshot fan-out
//
// Serves the snapshot stream to browser clients over WebSocket and SSE, and
// the last committed topology as JSON.

mod api;
mod event_stream;
mod topology;

pub use api::DashboardServer;
pub use event_stream::{SnapshotBroadcaster, SnapshotFrame};
pub use topology::{TopologyReport, TopologyView};

/// Dashboard configuration
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub port: u16,
    pub host: String,
    /// Bound of the single-consumer snapshot queue
    pub queue_capacity: usize,
    /// Frames buffered per relay subscriber before it starts lagging
    pub broadcast_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: 7032,
            host: "127.0.0.1".to_string(),
            queue_capacity: 64,
            broadcast_capacity: 16,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            port: std::env::var("HEIMDALL_DASHBOARD_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(default.port),
            host: std::env::var("HEIMDALL_DASHBOARD_HOST").unwrap_or(default.host),
            queue_capacity: std::env::var("HEIMDALL_QUEUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.queue_capacity),
            broadcast_capacity: std::env::var("HEIMDALL_BROADCAST_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.broadcast_capacity),
        }
    }

    pub fn enabled() -> bool {
        std::env::var("HEIMDALL_DASHBOARD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
