//! Proxy configuration
//!
//! Supplied by the hosting process. Every field has a default so a partial
//! JSON/YAML document deserializes cleanly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by every connection the host creates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Relative script paths are resolved against this directory
    pub project_root: PathBuf,

    /// Bundler control endpoint receiving reload signals
    pub control_url: String,

    /// Bundler cache directories emptied on `Page.reload` with `ignoreCache`
    pub cache_dirs: Vec<PathBuf>,

    /// Timeout for fetching remote script sources
    pub fetch_timeout_ms: u64,

    /// Bound on one reload signal to the control endpoint
    pub reload_signal_timeout_ms: u64,

    /// Refuse to fetch script sources from hosts other than the loopback
    pub restrict_fetch_to_loopback: bool,
}

impl ProxyConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn reload_signal_timeout(&self) -> Duration {
        Duration::from_millis(self.reload_signal_timeout_ms)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            control_url: "ws://localhost:8081/message".to_string(),
            cache_dirs: Vec::new(),
            fetch_timeout_ms: 30_000,
            reload_signal_timeout_ms: 10_000,
            restrict_fetch_to_loopback: false,
        }
    }
}
