// Overlay controller
//
// Owns the interactive detail popups attached to rendered device nodes.
// Handles are created once per node and only their label text is touched by
// telemetry ticks, so open/closed state survives updates.

use crate::device::Device;
use crate::render::NodeRef;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Identity of one overlay instance; never reused within a controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandleId(u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay-{}", self.0)
    }
}

/// Body of the popup
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlayContent {
    pub cpu_label: String,
    pub mem_label: String,
}

impl OverlayContent {
    fn new(cpu: f64, mem: f64) -> Self {
        Self {
            cpu_label: cpu.to_string(),
            mem_label: mem.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct OverlayHandle {
    pub id: HandleId,
    pub anchor: NodeRef,
    pub title: String,
    pub content: OverlayContent,
    pub open: bool,
}

#[derive(Debug, Default)]
pub struct OverlayController {
    bindings: HashMap<String, OverlayHandle>,
    next_id: u64,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a popup to a device's node. A name that is already bound keeps
    /// its existing handle.
    pub fn bind(&mut self, device: &Device, anchor: NodeRef) -> HandleId {
        if let Some(existing) = self.bindings.get(&device.name) {
            return existing.id;
        }

        self.next_id += 1;
        let id = HandleId(self.next_id);
        let handle = OverlayHandle {
            id,
            anchor,
            title: format!("{} Actions", device.name),
            content: OverlayContent::new(device.cpu_usage, device.mem_usage),
            open: false,
        };
        debug!(target: "overlay", device = %device.name, handle = %id, "Bound overlay");
        self.bindings.insert(device.name.clone(), handle);
        id
    }

    /// Rewrite label text in place. Returns false for unknown names.
    pub fn update_telemetry_text(&mut self, name: &str, cpu: f64, mem: f64) -> bool {
        match self.bindings.get_mut(name) {
            Some(handle) => {
                handle.content.cpu_label = cpu.to_string();
                handle.content.mem_label = mem.to_string();
                true
            }
            None => {
                debug!(target: "overlay", device = %name, "Telemetry update for unbound device ignored");
                false
            }
        }
    }

    pub fn unbind(&mut self, name: &str) -> Option<OverlayHandle> {
        let removed = self.bindings.remove(name);
        match &removed {
            Some(handle) => {
                debug!(target: "overlay", device = %name, handle = %handle.id, "Unbound overlay")
            }
            None => debug!(target: "overlay", device = %name, "Unbind for unknown device ignored"),
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<&OverlayHandle> {
        self.bindings.get(name)
    }

    pub fn handle_id(&self, name: &str) -> Option<HandleId> {
        self.bindings.get(name).map(|h| h.id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn open(&mut self, name: &str) -> bool {
        self.set_open(name, true)
    }

    pub fn close(&mut self, name: &str) -> bool {
        self.set_open(name, false)
    }

    /// Flip open/closed; returns the new state, or None for unknown names
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let handle = self.bindings.get_mut(name)?;
        handle.open = !handle.open;
        Some(handle.open)
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.bindings.get(name).map(|h| h.open).unwrap_or(false)
    }

    fn set_open(&mut self, name: &str, open: bool) -> bool {
        match self.bindings.get_mut(name) {
            Some(handle) => {
                handle.open = open;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ConnectionKind;

    fn device(name: &str, cpu: f64, mem: f64) -> Device {
        Device::new(name, ConnectionKind::Origin, cpu, mem, vec!["reboot".into()]).unwrap()
    }

    fn anchor(name: &str) -> NodeRef {
        NodeRef::new(ConnectionKind::Origin, name)
    }

    #[test]
    fn bind_builds_title_and_labels() {
        let mut overlays = OverlayController::new();
        overlays.bind(&device("gw", 12.5, 40.0), anchor("gw"));
        let handle = overlays.get("gw").unwrap();
        assert_eq!(handle.title, "gw Actions");
        assert_eq!(handle.content.cpu_label, "12.5");
        assert_eq!(handle.content.mem_label, "40");
        assert!(!handle.open);
    }

    #[test]
    fn bind_is_idempotent() {
        let mut overlays = OverlayController::new();
        let first = overlays.bind(&device("gw", 1.0, 1.0), anchor("gw"));
        let second = overlays.bind(&device("gw", 2.0, 2.0), anchor("gw"));
        assert_eq!(first, second);
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays.get("gw").unwrap().content.cpu_label, "1");
    }

    #[test]
    fn text_update_keeps_open_state() {
        let mut overlays = OverlayController::new();
        let id = overlays.bind(&device("gw", 1.0, 1.0), anchor("gw"));
        assert!(overlays.open("gw"));
        assert!(overlays.update_telemetry_text("gw", 55.0, 60.5));
        let handle = overlays.get("gw").unwrap();
        assert!(handle.open);
        assert_eq!(handle.id, id);
        assert_eq!(handle.content.cpu_label, "55");
        assert_eq!(handle.content.mem_label, "60.5");
    }

    #[test]
    fn unknown_names_are_noops() {
        let mut overlays = OverlayController::new();
        assert!(!overlays.update_telemetry_text("ghost", 1.0, 1.0));
        assert!(overlays.unbind("ghost").is_none());
        assert_eq!(overlays.toggle("ghost"), None);
        assert!(!overlays.is_open("ghost"));
    }

    #[test]
    fn rebinding_after_unbind_gets_fresh_identity() {
        let mut overlays = OverlayController::new();
        let old = overlays.bind(&device("gw", 1.0, 1.0), anchor("gw"));
        overlays.unbind("gw");
        let new = overlays.bind(&device("gw", 1.0, 1.0), anchor("gw"));
        assert_ne!(old, new);
    }
}
