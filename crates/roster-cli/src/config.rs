//! Replay configuration.
//!
//! Configuration can be loaded from:
//! - Environment variables (ROSTER_*)
//! - TOML configuration file
//! - `--config <path>` on the command line

use anyhow::{Context, Result};
use roster_core::StoreConfig;
use roster_protocol::CaseMapping;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Replay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Our nickname, used until a welcome line says otherwise.
    #[serde(default = "default_nick")]
    pub nick: String,

    /// Nickname case-mapping.
    #[serde(default = "default_casemapping")]
    pub casemapping: CaseMapping,

    /// Report desyncs as errors instead of logging them.
    #[serde(default)]
    pub strict: bool,

    /// Initial read buffer size in bytes.
    #[serde(default = "default_read_buffer")]
    pub read_buffer: usize,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable the Prometheus exporter.
    #[serde(default)]
    pub enabled: bool,

    /// Exporter port.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_nick() -> String {
    std::env::var("ROSTER_NICK").unwrap_or_else(|_| "roster".to_string())
}

fn default_casemapping() -> CaseMapping {
    std::env::var("ROSTER_CASEMAPPING")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or_default()
}

fn default_read_buffer() -> usize {
    4096
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nick: default_nick(),
            casemapping: default_casemapping(),
            strict: false,
            read_buffer: default_read_buffer(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from the default locations or defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_paths = [
            "roster.toml",
            "/etc/roster/roster.toml",
            "~/.config/roster/roster.toml",
        ];

        for path in &config_paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::from_file(expanded.as_ref());
            }
        }

        // Fall back to defaults with environment overrides
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Get the presence store configuration.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            casemapping: self.casemapping,
            strict: self.strict,
        }
    }
}
