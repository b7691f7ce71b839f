use std::fs;
use std::path::{Path, PathBuf};

use heimdall_core::dashboard::DashboardConfig;

/// High-level configuration for the replay demo
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    pub dashboard: DashboardConfig,
    /// JSON-lines file, one stream payload per line
    pub input: PathBuf,
    pub interval_ms: u64,
    /// Start over at the end of the file instead of exiting
    pub repeat: bool,
    /// Run the HTTP relay alongside the local engine
    pub serve: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            dashboard: DashboardConfig::from_env(),
            input: std::env::var("HEIMDALL_REPLAY_INPUT")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("demo/replay/captures/fleet.jsonl")),
            interval_ms: std::env::var("HEIMDALL_REPLAY_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(1_000),
            repeat: std::env::var("HEIMDALL_REPLAY_REPEAT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            serve: DashboardConfig::enabled(),
        }
    }
}

impl ReplayConfig {
    /// Load configuration from a TOML file (path via HEIMDALL_REPLAY_CONFIG or ./replay.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path = std::env::var("HEIMDALL_REPLAY_CONFIG").unwrap_or_else(|_| "replay.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(target: "replay", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match Self::from_toml_str(&s, default.clone()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(target: "replay", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "replay", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    pub fn from_toml_str(s: &str, base: Self) -> Result<Self, toml::de::Error> {
        Ok(toml::from_str::<ReplayToml>(s)?.overlay(base))
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ReplayToml {
    pub input: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub repeat: Option<bool>,
    pub serve: Option<bool>,
    pub dashboard: Option<DashboardToml>,
}

impl ReplayToml {
    fn overlay(self, mut base: ReplayConfig) -> ReplayConfig {
        if let Some(v) = self.input {
            base.input = v;
        }
        if let Some(v) = self.interval_ms {
            base.interval_ms = v;
        }
        if let Some(v) = self.repeat {
            base.repeat = v;
        }
        if let Some(v) = self.serve {
            base.serve = v;
        }
        if let Some(d) = self.dashboard {
            d.apply(&mut base.dashboard);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct DashboardToml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub queue_capacity: Option<usize>,
    pub broadcast_capacity: Option<usize>,
}

impl DashboardToml {
    fn apply(self, d: &mut DashboardConfig) {
        if let Some(v) = self.host {
            d.host = v;
        }
        if let Some(v) = self.port {
            d.port = v;
        }
        if let Some(v) = self.queue_capacity {
            d.queue_capacity = v.max(1);
        }
        if let Some(v) = self.broadcast_capacity {
            d.broadcast_capacity = v.max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overlays_only_given_fields() {
        let base = ReplayConfig {
            dashboard: DashboardConfig::default(),
            input: PathBuf::from("a.jsonl"),
            interval_ms: 1_000,
            repeat: false,
            serve: true,
        };
        let cfg = ReplayConfig::from_toml_str(
            r#"
                interval_ms = 250
                [dashboard]
                port = 9000
                queue_capacity = 0
            "#,
            base,
        )
        .unwrap();
        assert_eq!(cfg.input, PathBuf::from("a.jsonl"));
        assert_eq!(cfg.interval_ms, 250);
        assert!(cfg.serve);
        assert_eq!(cfg.dashboard.port, 9000);
        assert_eq!(cfg.dashboard.host, "127.0.0.1");
        assert_eq!(cfg.dashboard.queue_capacity, 1);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(ReplayConfig::from_toml_str("interval_ms = \"soon\"", ReplayConfig::default()).is_err());
    }
}
