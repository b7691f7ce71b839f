// Topology store
//
// Holds the most recently rendered device set and classifies new snapshots
// against it. Nothing changes until `commit`.

use crate::device::Device;
use crate::snapshot::TopologySnapshot;
use serde::Serialize;
use std::collections::HashMap;

/// Classification of a new snapshot against the committed one
#[derive(Clone, Debug, Default, Serialize)]
pub struct TopologyDiff {
    /// New names, plus names whose lane changed
    pub added: Vec<Device>,
    /// Names gone from the new snapshot, plus the old side of lane changes
    pub removed: Vec<String>,
    /// Same lane, different cpu/mem
    pub changed: Vec<Device>,
    pub unchanged: Vec<Device>,
}

impl TopologyDiff {
    /// True when applying the snapshot would mutate nothing
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct TopologyStore {
    // snapshot order is kept so lanes can be rebuilt in arrival order
    devices: Vec<Device>,
    index: HashMap<String, usize>,
    last_seq: Option<u64>,
}

impl TopologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Device> {
        self.index.get(name).map(|&i| &self.devices[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Committed devices in snapshot order
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn last_seq(&self) -> Option<u64> {
        self.last_seq
    }

    /// Whether a snapshot is older than (or a replay of) what is committed
    pub fn is_stale(&self, snapshot: &TopologySnapshot) -> bool {
        matches!((snapshot.seq, self.last_seq), (Some(new), Some(old)) if new <= old)
    }

    pub fn diff(&self, snapshot: &TopologySnapshot) -> TopologyDiff {
        let mut diff = TopologyDiff::default();
        let mut present: HashMap<&str, &Device> = HashMap::with_capacity(snapshot.devices.len());

        for device in &snapshot.devices {
            present.insert(device.name.as_str(), device);
            match self.get(&device.name) {
                None => diff.added.push(device.clone()),
                Some(old) if !old.same_structure(device) => diff.added.push(device.clone()),
                Some(old) if !old.telemetry_eq(device) => diff.changed.push(device.clone()),
                Some(_) => diff.unchanged.push(device.clone()),
            }
        }

        for old in &self.devices {
            match present.get(old.name.as_str()) {
                None => diff.removed.push(old.name.clone()),
                Some(new) if !old.same_structure(new) => diff.removed.push(old.name.clone()),
                Some(_) => {}
            }
        }

        diff
    }

    /// Replace the committed set. Repeated names keep their first entry.
    pub fn commit(&mut self, mut snapshot: TopologySnapshot) {
        snapshot.dedup_names();
        self.index = snapshot
            .devices
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        self.devices = snapshot.devices;
        if snapshot.seq.is_some() {
            self.last_seq = snapshot.seq;
        }
    }
}
