//! Daemon configuration file.
//!
//! ```json
//! {
//!   "interval_ms": 1000,
//!   "capacity": 120,
//!   "graphs": [
//!     { "provider": "net", "settings": { "filter": "eth0,wlan0" } },
//!     { "provider": "cpu" }
//!   ]
//! }
//! ```
//!
//! Settings are the persisted text form accepted by
//! [`ProviderConfig::set_from_str`](crate::provider::ProviderConfig::set_from_str).

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::provider::registry;
use crate::sampler::SamplerOptions;

pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_CAPACITY: usize = 120;
/// Shortest accepted tick interval.
pub const MIN_INTERVAL_MS: u64 = 10;
/// Longest accepted history: a day of samples at one per second.
pub const MAX_CAPACITY: usize = 86_400;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {}", e),
            ConfigError::Parse(e) => write!(f, "malformed config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// One graph to activate at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    pub provider: String,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl GraphConfig {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            settings: BTreeMap::new(),
        }
    }

    /// Settings as `(key, text)` pairs in key order.
    pub fn settings_list(&self) -> Vec<(String, String)> {
        self.settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    pub interval_ms: u64,
    pub capacity: usize,
    pub graphs: Vec<GraphConfig>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            capacity: DEFAULT_CAPACITY,
            graphs: Vec::new(),
        }
    }
}

impl DaemonConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks limits and that every graph names a registered provider.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms < MIN_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "interval_ms must be at least {}, got {}",
                MIN_INTERVAL_MS, self.interval_ms
            )));
        }
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "capacity must be between 1 and {}, got {}",
                MAX_CAPACITY, self.capacity
            )));
        }
        for graph in &self.graphs {
            if registry::find(&graph.provider).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "unknown provider '{}', expected one of: {}",
                    graph.provider,
                    registry::names().collect::<Vec<_>>().join(", ")
                )));
            }
        }
        Ok(())
    }

    pub fn sampler_options(&self) -> SamplerOptions {
        SamplerOptions {
            interval: Duration::from_millis(self.interval_ms),
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"{
                "interval_ms": 500,
                "capacity": 60,
                "graphs": [
                    { "provider": "net", "settings": { "filter": "eth0,wlan0", "use_packets": "true" } },
                    { "provider": "cpu" }
                ]
            }"#,
        );
        let config = DaemonConfig::load(file.path()).unwrap();
        assert_eq!(config.interval_ms, 500);
        assert_eq!(config.capacity, 60);
        assert_eq!(config.graphs.len(), 2);
        assert_eq!(
            config.graphs[0].settings_list(),
            vec![
                ("filter".to_string(), "eth0,wlan0".to_string()),
                ("use_packets".to_string(), "true".to_string()),
            ]
        );
        assert!(config.graphs[1].settings.is_empty());

        let options = config.sampler_options();
        assert_eq!(options.interval, Duration::from_millis(500));
        assert_eq!(options.capacity, 60);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let file = write_config(r#"{ "graphs": [{ "provider": "mem" }] }"#);
        let config = DaemonConfig::load(file.path()).unwrap();
        assert_eq!(config.interval_ms, DEFAULT_INTERVAL_MS);
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.graphs, vec![GraphConfig::new("mem")]);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let file = write_config(r#"{ "graphs": [{ "provider": "gpu" }] }"#);
        match DaemonConfig::load(file.path()) {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("gpu")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_limits() {
        let mut config = DaemonConfig {
            interval_ms: 1,
            ..DaemonConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.interval_ms = 100;
        config.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.capacity = 1;
        assert!(config.validate().is_ok());

        config.capacity = MAX_CAPACITY;
        assert!(config.validate().is_ok());
        config.capacity = 100_000_000_000;
        match config.validate() {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("100000000000")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_and_missing_files() {
        let file = write_config("{ \"interval_ms\": \"fast\" }");
        assert!(matches!(
            DaemonConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));

        let file = write_config(r#"{ "graphs": [], "colour": "red" }"#);
        assert!(matches!(
            DaemonConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DaemonConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
