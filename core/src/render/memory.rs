// In-memory render sink
//
// Models the three lanes as ordered node lists with stable node ids, and
// records every call so tests and tools can assert on exact mutations.

use super::{Lane, RenderSink};
use crate::device::{Device, TelemetryField};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RenderOp {
    RenderLane { lane: Lane, names: Vec<String> },
    PatchText {
        name: String,
        field: TelemetryField,
        value: f64,
    },
    Remove { name: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedNode {
    /// Stable for the lifetime of the node
    pub node_id: u64,
    pub name: String,
    pub cpu_text: String,
    pub mem_text: String,
}

#[derive(Debug, Default)]
pub struct MemorySink {
    lanes: [Vec<RenderedNode>; 3],
    ops: Vec<RenderOp>,
    next_node_id: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lane(&self, lane: Lane) -> &[RenderedNode] {
        &self.lanes[lane.lane_index()]
    }

    pub fn lane_names(&self, lane: Lane) -> Vec<&str> {
        self.lane(lane).iter().map(|n| n.name.as_str()).collect()
    }

    /// Lane and index within the lane
    pub fn position(&self, name: &str) -> Option<(Lane, usize)> {
        Lane::ALL.into_iter().find_map(|lane| {
            self.lane(lane)
                .iter()
                .position(|n| n.name == name)
                .map(|i| (lane, i))
        })
    }

    pub fn node(&self, name: &str) -> Option<&RenderedNode> {
        self.lanes.iter().flatten().find(|n| n.name == name)
    }

    pub fn node_count(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    /// Take the recorded ops, leaving the node state in place
    pub fn drain_ops(&mut self) -> Vec<RenderOp> {
        std::mem::take(&mut self.ops)
    }

    fn node_mut(&mut self, name: &str) -> Option<&mut RenderedNode> {
        self.lanes.iter_mut().flatten().find(|n| n.name == name)
    }
}

impl RenderSink for MemorySink {
    fn render_lane(&mut self, lane: Lane, devices: &[Device]) {
        for device in devices {
            self.next_node_id += 1;
            self.lanes[lane.lane_index()].push(RenderedNode {
                node_id: self.next_node_id,
                name: device.name.clone(),
                cpu_text: device.cpu_usage.to_string(),
                mem_text: device.mem_usage.to_string(),
            });
        }
        self.ops.push(RenderOp::RenderLane {
            lane,
            names: devices.iter().map(|d| d.name.clone()).collect(),
        });
    }

    fn patch_device_text(&mut self, name: &str, field: TelemetryField, value: f64) {
        if let Some(node) = self.node_mut(name) {
            let text = value.to_string();
            match field {
                TelemetryField::Cpu => node.cpu_text = text,
                TelemetryField::Mem => node.mem_text = text,
            }
        }
        self.ops.push(RenderOp::PatchText {
            name: name.to_string(),
            field,
            value,
        });
    }

    fn remove_device(&mut self, name: &str) {
        for lane in self.lanes.iter_mut() {
            lane.retain(|n| n.name != name);
        }
        self.ops.push(RenderOp::Remove {
            name: name.to_string(),
        });
    }
}
