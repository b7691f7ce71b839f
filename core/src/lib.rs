// Heimdall Core Library
// Live device dashboard: topology sync and render-decision engine

pub mod dashboard;
pub mod device;
pub mod overlay;
pub mod render;
pub mod snapshot;
pub mod stream;
pub mod telemetry;
pub mod topology;

// Export core types
pub use device::{ConnectionKind, Device, TelemetryField, ValidationError};
pub use overlay::{HandleId, OverlayController, OverlayHandle};
pub use render::{Lane, NodeRef, Phase, RenderEngine, RenderReport, RenderSink, ReportKind};
pub use snapshot::{DecodeError, TopologySnapshot};
pub use stream::{SnapshotConsumer, SnapshotFeed, StreamStats};
pub use topology::{TopologyDiff, TopologyStore};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeimdallError {
    #[error("Snapshot feed closed")]
    FeedClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HeimdallError>;
