// Render decision engine
//
// Uninitialized -> Live, exactly once. The first snapshot is drawn in full;
// every later one is diffed against the committed topology and patched.

use super::{Lane, NodeRef, RenderSink};
use crate::device::{Device, TelemetryField};
use crate::overlay::OverlayController;
use crate::snapshot::{self, DecodeError, TopologySnapshot};
use crate::topology::{TopologyDiff, TopologyStore};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    Live,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    FullRender,
    Patch,
    /// Dropped: sequence number not newer than the committed one
    Stale,
}

/// What one snapshot application did
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub kind: ReportKind,
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
    /// Device entries the decoder dropped from this message
    pub rejected: usize,
    /// Nodes rendered + labels patched + nodes removed
    pub mutations: usize,
}

impl RenderReport {
    fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            added: 0,
            removed: 0,
            changed: 0,
            unchanged: 0,
            rejected: 0,
            mutations: 0,
        }
    }
}

pub struct RenderEngine<S: RenderSink> {
    phase: Phase,
    store: TopologyStore,
    overlays: OverlayController,
    sink: S,
}

impl<S: RenderSink> RenderEngine<S> {
    pub fn new(sink: S) -> Self {
        Self {
            phase: Phase::Uninitialized,
            store: TopologyStore::new(),
            overlays: OverlayController::new(),
            sink,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_live(&self) -> bool {
        self.phase == Phase::Live
    }

    pub fn topology(&self) -> &TopologyStore {
        &self.store
    }

    pub fn overlays(&self) -> &OverlayController {
        &self.overlays
    }

    /// Interactive access (open/close popups); bindings stay engine-owned
    pub fn overlays_mut(&mut self) -> &mut OverlayController {
        &mut self.overlays
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Decode and apply one stream payload. On a decode error nothing changes.
    pub fn apply_payload(&mut self, payload: &str) -> Result<RenderReport, DecodeError> {
        let decoded = snapshot::decode(payload)?;
        let mut report = self.apply(decoded.snapshot);
        report.rejected = decoded.rejected.len();
        Ok(report)
    }

    pub fn apply(&mut self, mut snapshot: TopologySnapshot) -> RenderReport {
        for name in snapshot.dedup_names() {
            warn!(target: "render", device = %name, "Dropping repeated device name");
        }

        if self.store.is_stale(&snapshot) {
            debug!(
                target: "render",
                seq = ?snapshot.seq,
                last_seq = ?self.store.last_seq(),
                "Dropping stale snapshot"
            );
            return RenderReport::new(ReportKind::Stale);
        }

        match self.phase {
            Phase::Uninitialized => self.full_render(snapshot),
            Phase::Live => self.patch(snapshot),
        }
    }

    fn full_render(&mut self, snapshot: TopologySnapshot) -> RenderReport {
        let mut report = RenderReport::new(ReportKind::FullRender);

        for lane in Lane::ALL {
            let members = lane_members(&snapshot.devices, lane);
            self.sink.render_lane(lane, &members);
            report.mutations += members.len();
        }

        for device in snapshot.devices.iter().filter(|d| d.wants_overlay()) {
            self.overlays.bind(device, NodeRef::of(device));
        }

        report.added = snapshot.devices.len();
        info!(
            target: "render",
            devices = report.added,
            overlays = self.overlays.len(),
            "Initial render complete"
        );

        self.store.commit(snapshot);
        self.phase = Phase::Live;
        report
    }

    fn patch(&mut self, snapshot: TopologySnapshot) -> RenderReport {
        let diff = self.store.diff(&snapshot);
        let mut report = RenderReport::new(ReportKind::Patch);
        report.added = diff.added.len();
        report.removed = diff.removed.len();
        report.changed = diff.changed.len();
        report.unchanged = diff.unchanged.len();

        if !diff.is_noop() {
            report.mutations = self.apply_diff(&diff);
            debug!(
                target: "render",
                added = report.added,
                removed = report.removed,
                changed = report.changed,
                mutations = report.mutations,
                "Patched topology"
            );
        }

        self.store.commit(snapshot);
        report
    }

    // Removals go first so a lane migration never removes its own new node.
    fn apply_diff(&mut self, diff: &TopologyDiff) -> usize {
        let mut mutations = 0;

        for name in &diff.removed {
            self.overlays.unbind(name);
            self.sink.remove_device(name);
            mutations += 1;
        }

        for lane in Lane::ALL {
            let members = lane_members(&diff.added, lane);
            if members.is_empty() {
                continue;
            }
            self.sink.render_lane(lane, &members);
            mutations += members.len();
            for device in members.iter().filter(|d| d.wants_overlay()) {
                self.overlays.bind(device, NodeRef::of(device));
            }
        }

        for device in &diff.changed {
            if let Some(old) = self.store.get(&device.name) {
                for field in [TelemetryField::Cpu, TelemetryField::Mem] {
                    let value = device.usage(field);
                    if old.usage(field) != value {
                        self.sink.patch_device_text(&device.name, field, value);
                        mutations += 1;
                    }
                }
            }
            if self.overlays.contains(&device.name) {
                self.overlays.update_telemetry_text(
                    &device.name,
                    device.cpu_usage,
                    device.mem_usage,
                );
            }
        }

        mutations
    }
}

fn lane_members(devices: &[Device], lane: Lane) -> Vec<Device> {
    devices
        .iter()
        .filter(|d| d.connection_kind == lane)
        .cloned()
        .collect()
}
