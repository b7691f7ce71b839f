// Device model
//
// One monitored node and its resource telemetry

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Why a single device entry was rejected from a snapshot
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("device name is empty")]
    EmptyName,

    #[error("unknown connection kind: {0:?}")]
    UnknownConnection(String),

    #[error("non-finite {field} for device {name}")]
    NonFiniteUsage {
        name: String,
        field: TelemetryField,
    },

    #[error("duplicate device name in snapshot: {0}")]
    DuplicateName(String),

    #[error("malformed device entry at index {index}: {reason}")]
    Malformed { index: usize, reason: String },
}

/// How a device reaches the network; also selects its display lane
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    Wireless,
    Origin,
    Wired,
}

impl ConnectionKind {
    /// Lane render order
    pub const ALL: [ConnectionKind; 3] = [
        ConnectionKind::Wireless,
        ConnectionKind::Origin,
        ConnectionKind::Wired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionKind::Wireless => "Wireless",
            ConnectionKind::Origin => "Origin",
            ConnectionKind::Wired => "Wired",
        }
    }

    /// Position of this kind's lane, left to right
    pub fn lane_index(self) -> usize {
        match self {
            ConnectionKind::Wireless => 0,
            ConnectionKind::Origin => 1,
            ConnectionKind::Wired => 2,
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Wireless" => Ok(ConnectionKind::Wireless),
            "Origin" => Ok(ConnectionKind::Origin),
            "Wired" => Ok(ConnectionKind::Wired),
            other => Err(ValidationError::UnknownConnection(other.to_string())),
        }
    }
}

/// Textual telemetry field on a rendered node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryField {
    Cpu,
    Mem,
}

impl fmt::Display for TelemetryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryField::Cpu => f.write_str("cpu_usage"),
            TelemetryField::Mem => f.write_str("mem_usage"),
        }
    }
}

/// A validated device record.
///
/// Serializes back to the same shape the producer emits, so the relay and
/// `/api/topology` speak one format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    #[serde(rename = "connection")]
    pub connection_kind: ConnectionKind,
    pub cpu_usage: f64,
    pub mem_usage: f64,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl Device {
    pub fn new(
        name: impl Into<String>,
        connection_kind: ConnectionKind,
        cpu_usage: f64,
        mem_usage: f64,
        capabilities: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let device = Self {
            name: name.into(),
            connection_kind,
            cpu_usage,
            mem_usage,
            capabilities,
        };
        device.validate()?;
        Ok(device)
    }

    /// Build from an unchecked connection string as it arrives on the wire
    pub fn parse(
        name: impl Into<String>,
        connection: &str,
        cpu_usage: f64,
        mem_usage: f64,
        capabilities: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let kind = connection.parse::<ConnectionKind>()?;
        Self::new(name, kind, cpu_usage, mem_usage, capabilities)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !self.cpu_usage.is_finite() {
            return Err(ValidationError::NonFiniteUsage {
                name: self.name.clone(),
                field: TelemetryField::Cpu,
            });
        }
        if !self.mem_usage.is_finite() {
            return Err(ValidationError::NonFiniteUsage {
                name: self.name.clone(),
                field: TelemetryField::Mem,
            });
        }
        Ok(())
    }

    /// cpu/mem unchanged (identity and structure are compared separately)
    pub fn telemetry_eq(&self, other: &Device) -> bool {
        self.cpu_usage == other.cpu_usage && self.mem_usage == other.mem_usage
    }

    /// Same name and same lane. A lane change means the node must be rebuilt;
    /// capabilities are carried along without touching the node or overlay.
    pub fn same_structure(&self, other: &Device) -> bool {
        self.name == other.name && self.connection_kind == other.connection_kind
    }

    pub fn has_telemetry(&self) -> bool {
        self.cpu_usage > 0.0 || self.mem_usage > 0.0
    }

    /// Whether this device is offered an interactive overlay when its node is created
    pub fn wants_overlay(&self) -> bool {
        !self.capabilities.is_empty() || self.has_telemetry()
    }

    pub fn usage(&self, field: TelemetryField) -> f64 {
        match field {
            TelemetryField::Cpu => self.cpu_usage,
            TelemetryField::Mem => self.mem_usage,
        }
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Device {}
