use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::rest::connection::Timeouts;

/// Daemon configuration.
///
/// Loaded from a YAML file named by `BORDERD_REST_CONFIG`; every field has a
/// built-in default so the daemon runs without a file. The `LISTEN`
/// environment variable overrides the listen address either way.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub read_timeout_ms: u64,
    pub handler_timeout_ms: u64,
    pub write_timeout_ms: u64,
    /// How long a diagnostic collection pass listens for router responses
    /// before answering.
    pub diagnostics_window_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8081".to_string(),
            read_timeout_ms: 2_000,
            handler_timeout_ms: 10_000,
            write_timeout_ms: 10_000,
            diagnostics_window_ms: 2_000,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("BORDERD_REST_CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {path}"))?;
                Self::from_yaml(&raw)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var("LISTEN") {
            cfg.listen_addr = addr;
        }

        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(raw).context("parsing config")
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            read: Duration::from_millis(self.read_timeout_ms),
            handler: Duration::from_millis(self.handler_timeout_ms),
            write: Duration::from_millis(self.write_timeout_ms),
        }
    }

    pub fn diagnostics_window(&self) -> Duration {
        Duration::from_millis(self.diagnostics_window_ms)
    }
}
