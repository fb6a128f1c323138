//! Configuration loading and typed config structures for Cuescore.
//!
//! Configuration is a small YAML file. Every section is optional and falls
//! back to the defaults below.
//!
//! ```yaml
//! rules:
//!   three: 1
//!   six: 2
//!   nine: 3
//! storage:
//!   dir: ".cuescore"
//! logging:
//!   level: "info"
//!   json: false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use cuescore_ledger::RuleTable;

/// Environment variable that overrides `storage.dir`.
pub const DATA_DIR_ENV: &str = "CUESCORE_DATA_DIR";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Default rule table for new matches.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Where match state is stored.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SessionConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `CUESCORE_DATA_DIR` overrides `storage.dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.storage.apply_env_overrides();
        Ok(config)
    }
}

/// Point values per tier for new matches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RulesConfig {
    /// Points per loser for a pocketed 3-ball.
    #[serde(default = "default_three")]
    pub three: u32,

    /// Points per loser for a pocketed 6-ball.
    #[serde(default = "default_six")]
    pub six: u32,

    /// Points per loser for a pocketed 9-ball.
    #[serde(default = "default_nine")]
    pub nine: u32,
}

impl RulesConfig {
    /// The configured values as a rule table.
    pub fn table(&self) -> RuleTable {
        RuleTable::from_values(self.three, self.six, self.nine)
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            three: default_three(),
            six: default_six(),
            nine: default_nine(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON document per key.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

impl StorageConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(DATA_DIR_ENV) {
            self.dir = PathBuf::from(val);
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_three() -> u32 {
    cuescore_ledger::rules::DEFAULT_THREE
}

const fn default_six() -> u32 {
    cuescore_ledger::rules::DEFAULT_SIX
}

const fn default_nine() -> u32 {
    cuescore_ledger::rules::DEFAULT_NINE
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".cuescore")
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use cuescore_types::Tier;

    use super::*;

    #[test]
    fn default_config_matches_default_rules() {
        let config = SessionConfig::default();
        assert_eq!(config.rules.table(), RuleTable::default());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
rules:
  three: 2
  six: 4
  nine: 10
storage:
  dir: "/var/lib/cuescore"
logging:
  level: "debug"
  json: true
"#;
        let config = SessionConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.rules.table().value_for(Tier::Nine), 10);
        assert_eq!(config.rules.table().value_for(Tier::Three), 2);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = SessionConfig::parse("rules:\n  nine: 5\n").ok().unwrap_or_default();
        assert_eq!(config.rules.three, 1);
        assert_eq!(config.rules.six, 2);
        assert_eq!(config.rules.nine, 5);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn negative_point_value_is_rejected() {
        let result = SessionConfig::parse("rules:\n  three: -1\n");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = SessionConfig::from_file(Path::new("/nonexistent/cuescore.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
