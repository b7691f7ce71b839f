// Snapshot decoding
//
// Turns one stream payload into a validated topology snapshot. A payload that
// is not a device list is rejected whole; a bad device entry is rejected alone.

use crate::device::{Device, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload must be a device array or a {{seq, devices}} envelope, got {0}")]
    Shape(&'static str),
}

/// Full device set reported by one stream message
#[derive(Clone, Debug, Default, Serialize)]
pub struct TopologySnapshot {
    /// Producer sequence number, when the producer sends one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    pub devices: Vec<Device>,
}

impl TopologySnapshot {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { seq: None, devices }
    }

    pub fn with_seq(seq: u64, devices: Vec<Device>) -> Self {
        Self {
            seq: Some(seq),
            devices,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Drop later entries that reuse an earlier name; returns the dropped names
    pub fn dedup_names(&mut self) -> Vec<String> {
        let mut seen = HashSet::with_capacity(self.devices.len());
        let mut dropped = Vec::new();
        self.devices.retain(|d| {
            if seen.insert(d.name.clone()) {
                true
            } else {
                dropped.push(d.name.clone());
                false
            }
        });
        dropped
    }
}

/// Decoder output: the usable snapshot plus the entries that were dropped
#[derive(Debug, Default)]
pub struct Decoded {
    pub snapshot: TopologySnapshot,
    pub rejected: Vec<ValidationError>,
}

// Wire shape of a device before validation
#[derive(Deserialize)]
struct WireDevice {
    name: String,
    connection: String,
    cpu_usage: f64,
    mem_usage: f64,
    #[serde(default)]
    capabilities: Vec<String>,
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Decode a text payload
pub fn decode(payload: &str) -> Result<Decoded, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    decode_value(value)
}

/// Decode an already-parsed JSON value
pub fn decode_value(value: serde_json::Value) -> Result<Decoded, DecodeError> {
    let (seq, entries) = match value {
        serde_json::Value::Array(entries) => (None, entries),
        serde_json::Value::Object(mut map) => {
            let seq = match map.remove("seq") {
                None | Some(serde_json::Value::Null) => None,
                Some(v) => Some(v.as_u64().ok_or(DecodeError::Shape("a non-integer seq"))?),
            };
            match map.remove("devices") {
                Some(serde_json::Value::Array(entries)) => (seq, entries),
                Some(other) => return Err(DecodeError::Shape(kind_of(&other))),
                None => return Err(DecodeError::Shape("an object without devices")),
            }
        }
        other => return Err(DecodeError::Shape(kind_of(&other))),
    };

    let mut devices = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();
    let mut seen = HashSet::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let result = serde_json::from_value::<WireDevice>(entry)
            .map_err(|e| ValidationError::Malformed {
                index,
                reason: e.to_string(),
            })
            .and_then(|w| {
                Device::parse(w.name, &w.connection, w.cpu_usage, w.mem_usage, w.capabilities)
            })
            .and_then(|device| {
                if seen.insert(device.name.clone()) {
                    Ok(device)
                } else {
                    Err(ValidationError::DuplicateName(device.name))
                }
            });

        match result {
            Ok(device) => devices.push(device),
            Err(e) => {
                warn!(target: "stream", index, error = %e, "Dropping invalid device entry");
                rejected.push(e);
            }
        }
    }

    Ok(Decoded {
        snapshot: TopologySnapshot { seq, devices },
        rejected,
    })
}
