// Render layer
//
// The engine decides what to draw; a `RenderSink` does the drawing.

mod engine;
mod logging;
mod memory;

pub use engine::{Phase, RenderEngine, RenderReport, ReportKind};
pub use logging::LoggingSink;
pub use memory::{MemorySink, RenderOp, RenderedNode};

use crate::device::{ConnectionKind, Device, TelemetryField};
use serde::Serialize;

/// Display lanes are the three connection kinds
pub type Lane = ConnectionKind;

/// Logical address of a rendered device node
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
    pub lane: Lane,
    pub name: String,
}

impl NodeRef {
    pub fn new(lane: Lane, name: impl Into<String>) -> Self {
        Self {
            lane,
            name: name.into(),
        }
    }

    pub fn of(device: &Device) -> Self {
        Self::new(device.connection_kind, device.name.clone())
    }
}

/// Operations the surrounding UI implements. The engine never touches
/// presentation markup directly.
pub trait RenderSink {
    /// Append nodes for `devices`, in order, to the end of `lane`
    fn render_lane(&mut self, lane: Lane, devices: &[Device]);

    /// Replace the text of one telemetry label on an existing node
    fn patch_device_text(&mut self, name: &str, field: TelemetryField, value: f64);

    /// Remove a device's node; unknown names are ignored
    fn remove_device(&mut self, name: &str);
}
