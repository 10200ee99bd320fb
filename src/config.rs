//! TOML-based dashboard configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::access::{
    ApiService, LatencyProfile, NetworkSimulator, OperationTimings, SeededEntropy, StatusSink,
};
use crate::cache::{FileStore, KeyValueStore, MemoryStore, PanelCache};
use crate::fixtures::StaticFixtures;

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults matching the `demo` preset. Load from TOML with
/// [`DashboardConfig::from_toml_file`] or use [`DashboardConfig::demo`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Simulated network latency and failure injection.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Fixed latencies of mutating operations.
    #[serde(default)]
    pub operations: OperationsConfig,
    /// Device-local cache location.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Authorization gate and simulated identity provider.
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Lower bound of the random delay (ms).
    pub min_delay_ms: u64,
    /// Upper bound of the random delay (ms).
    pub max_delay_ms: u64,
    /// Probability in `[0, 1]` that a fetch fails.
    pub error_rate: f64,
    /// Fixed seed for reproducible runs; OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 300,
            max_delay_ms: 1500,
            error_rate: 0.1,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationsConfig {
    pub maintenance_delay_ms: u64,
    pub optimize_delay_ms: u64,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            maintenance_delay_ms: 1500,
            optimize_delay_ms: 3500,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Directory for persisted entries; in-memory when absent.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Where unauthenticated visitors are sent.
    pub sign_in_path: String,
    /// Session outcome of the simulated provider: `"signed_in"` or `"signed_out"`.
    pub session: String,
    /// How long the simulated provider takes to resolve (ms).
    pub resolve_after_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            sign_in_path: "/sign-in".to_string(),
            session: "signed_in".to_string(),
            resolve_after_ms: 250,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"network.error_rate"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl fmt::Display) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Default latencies and a 10% error rate.
    pub fn demo() -> Self {
        Self::default()
    }

    /// No latency, no failures, fixed seed. Handy for scripted runs.
    pub fn instant() -> Self {
        Self {
            network: NetworkConfig {
                min_delay_ms: 0,
                max_delay_ms: 0,
                error_rate: 0.0,
                seed: Some(42),
            },
            operations: OperationsConfig {
                maintenance_delay_ms: 0,
                optimize_delay_ms: 0,
            },
            auth: AuthConfig {
                resolve_after_ms: 0,
                ..AuthConfig::default()
            },
            ..Self::default()
        }
    }

    /// Half of all fetches fail.
    pub fn flaky() -> Self {
        Self {
            network: NetworkConfig {
                error_rate: 0.5,
                ..NetworkConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "instant", "flaky"];

    /// Loads a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "instant" => Ok(Self::instant()),
            "flaky" => Ok(Self::flaky()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let n = &self.network;
        if n.min_delay_ms > n.max_delay_ms {
            errors.push(ConfigError::new(
                "network.min_delay_ms",
                "must be <= network.max_delay_ms",
            ));
        }
        if !(0.0..=1.0).contains(&n.error_rate) {
            errors.push(ConfigError::new("network.error_rate", "must be in [0.0, 1.0]"));
        }

        let a = &self.auth;
        if !a.sign_in_path.starts_with('/') {
            errors.push(ConfigError::new("auth.sign_in_path", "must start with '/'"));
        }
        if a.session != "signed_in" && a.session != "signed_out" {
            errors.push(ConfigError::new(
                "auth.session",
                format!(
                    "must be \"signed_in\" or \"signed_out\", got \"{}\"",
                    a.session
                ),
            ));
        }

        errors
    }

    pub fn latency_profile(&self) -> LatencyProfile {
        LatencyProfile {
            min_delay: Duration::from_millis(self.network.min_delay_ms),
            max_delay: Duration::from_millis(self.network.max_delay_ms),
            error_rate: self.network.error_rate,
        }
    }

    pub fn operation_timings(&self) -> OperationTimings {
        OperationTimings {
            maintenance_delay: Duration::from_millis(self.operations.maintenance_delay_ms),
            optimize_delay: Duration::from_millis(self.operations.optimize_delay_ms),
        }
    }

    pub fn session_signed_in(&self) -> bool {
        self.auth.session == "signed_in"
    }

    /// Builds the cache store this configuration asks for.
    pub fn cache_store(&self) -> Arc<dyn KeyValueStore> {
        match &self.cache.dir {
            Some(dir) => Arc::new(FileStore::new(dir)),
            None => Arc::new(MemoryStore::new()),
        }
    }

    /// Wires the access layer over the built-in fixtures.
    pub fn build_service(&self, sink: Arc<dyn StatusSink>) -> ApiService {
        let entropy = match self.network.seed {
            Some(seed) => SeededEntropy::from_seed(seed),
            None => SeededEntropy::from_os(),
        };
        ApiService::new(
            Arc::new(StaticFixtures),
            NetworkSimulator::new(self.latency_profile(), entropy),
            PanelCache::new(self.cache_store()),
            sink,
        )
        .with_timings(self.operation_timings())
    }
}
