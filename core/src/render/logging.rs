use super::{Lane, RenderSink};
use crate::device::{Device, TelemetryField};
use tracing::debug;

/// Sink that only logs each mutation. Useful headless, e.g. when replaying a
/// capture to check what a browser client would have been asked to do.
#[derive(Debug, Default)]
pub struct LoggingSink {
    mutations: u64,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mutations(&self) -> u64 {
        self.mutations
    }
}

impl RenderSink for LoggingSink {
    fn render_lane(&mut self, lane: Lane, devices: &[Device]) {
        for device in devices {
            debug!(
                target: "render",
                lane = %lane,
                device = %device.name,
                cpu = device.cpu_usage,
                mem = device.mem_usage,
                "render node"
            );
        }
        self.mutations += devices.len() as u64;
    }

    fn patch_device_text(&mut self, name: &str, field: TelemetryField, value: f64) {
        debug!(target: "render", device = %name, field = %field, value, "patch text");
        self.mutations += 1;
    }

    fn remove_device(&mut self, name: &str) {
        debug!(target: "render", device = %name, "remove node");
        self.mutations += 1;
    }
}
