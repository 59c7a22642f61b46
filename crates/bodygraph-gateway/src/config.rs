//! Gateway configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file
//! exists. Environment variables override the file; CLI flags override both.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_SERVICE_URL: &str = "BODYGRAPH_SERVICE_URL";
pub const ENV_API_KEY: &str = "BODYGRAPH_API_KEY";
pub const ENV_PORT: &str = "BODYGRAPH_PORT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub bind: BindMode,
}

/// Where the calculation service lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Sent as a bearer token when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Bind mode for the gateway
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    #[default]
    Loopback,
    Lan,
}

impl BindMode {
    pub fn to_addr(&self) -> &str {
        match self {
            BindMode::Loopback => "127.0.0.1",
            BindMode::Lan => "0.0.0.0",
        }
    }

    /// Anything that is not an explicit loopback name binds all interfaces.
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "loopback" | "localhost" | "127.0.0.1" => BindMode::Loopback,
            _ => BindMode::Lan,
        }
    }
}

// ============================================================
// Defaults
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 18800,
            bind: BindMode::default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl GatewayConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Apply `BODYGRAPH_*` overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. An unparsable port is ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_SERVICE_URL) {
            self.service.base_url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.service.api_key = Some(key);
        }
        if let Some(port) = lookup(ENV_PORT) {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring {}={}: not a port", ENV_PORT, port),
            }
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
