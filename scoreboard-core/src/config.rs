use crate::view::GridUpdatePolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

fn default_reconnect_delay_ms() -> u64 {
    2000
}

/// Settings of a dashboard session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Origin serving `/api/systems` and `/scores.json`.
    pub base_url: String,
    /// WebSocket push feed.
    pub feed_url: String,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default)]
    pub grid_policy: GridUpdatePolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            feed_url: "ws://127.0.0.1:5000/ws".to_string(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            grid_policy: GridUpdatePolicy::default(),
        }
    }
}

impl DashboardConfig {
    /// Reads a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}
