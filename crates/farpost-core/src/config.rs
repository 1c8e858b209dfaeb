//! Configuration loading and typed config structures for Farpost.
//!
//! The canonical configuration lives in `farpost-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file. The
//! `economy` section is the single catalog shared by the in-process engine
//! and the HTTP layer.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use farpost_economy::{CatalogError, EconomyConfig};

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

    /// The economy catalog is unusable.
    #[error("invalid economy catalog: {source}")]
    Catalog {
        /// The catalog problem.
        #[from]
        source: CatalogError,
    },

    /// A session or server setting is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the setting.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `farpost-config.yaml`. Every field has a default
/// matching the built-in catalog, so an empty file is a complete config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Version of the config asset.
    #[serde(default = "default_version")]
    pub version: u32,

    /// The economy catalog.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Per-session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            economy: EconomyConfig::default(),
            session: SessionConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `FARPOST_HOST` overrides `server.host`
    /// - `FARPOST_PORT` overrides `server.port`
    /// - `FARPOST_SPEED` overrides `session.speed_multiplier`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error if the values are unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply environment overrides,
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error if the values are unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to the built-in defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        info!(path = %path.display(), "Config file not found, using built-in defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override settings from an arbitrary key lookup.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("FARPOST_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("FARPOST_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring unparseable FARPOST_PORT"),
            }
        }
        if let Some(speed) = lookup("FARPOST_SPEED") {
            match speed.parse() {
                Ok(speed) => self.session.speed_multiplier = speed,
                Err(_) => warn!(value = %speed, "Ignoring unparseable FARPOST_SPEED"),
            }
        }
    }

    /// Check every section for unusable values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.economy.validate()?;
        if self.session.speed_multiplier == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.speed_multiplier",
                reason: "must be at least 1",
            });
        }
        if self.server.timer_poll_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timer_poll_ms",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Divisor applied to extraction times of new deployments.
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: default_speed_multiplier(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// How often the background task fires due extraction timers.
    #[serde(default = "default_timer_poll_ms")]
    pub timer_poll_ms: u64,

    /// Sessions untouched for this many seconds are closed by the timer
    /// task. Zero keeps sessions until they are deleted.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timer_poll_ms: default_timer_poll_ms(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const fn default_version() -> u32 {
    1
}

const fn default_speed_multiplier() -> u32 {
    1
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_timer_poll_ms() -> u64 {
    250
}

const fn default_idle_timeout_secs() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_without_env(yaml: &str) -> Result<GameConfig, ConfigError> {
        let config: GameConfig = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.version, 1);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.speed_multiplier, 1);
        assert_eq!(config.economy.cell_cost, 500);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = parse_without_env("server:\n  port: 9090\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.timer_poll_ms, 250);
        assert_eq!(config.server.idle_timeout_secs, 3600);
        assert_eq!(config.economy.resources.len(), 10);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(parse_without_env("").is_ok());
    }

    #[test]
    fn zero_speed_is_rejected() {
        let config = parse_without_env("session:\n  speed_multiplier: 0\n");
        assert!(matches!(
            config,
            Err(ConfigError::InvalidValue {
                field: "session.speed_multiplier",
                ..
            })
        ));
    }

    #[test]
    fn bad_catalog_is_rejected() {
        let config = parse_without_env("economy:\n  level_thresholds: [0, 100, 50]\n");
        assert!(matches!(config, Err(ConfigError::Catalog { .. })));
    }

    #[test]
    fn overrides_apply_from_lookup() {
        let mut config = GameConfig::default();
        config.apply_overrides(|key| match key {
            "FARPOST_HOST" => Some("127.0.0.1".to_owned()),
            "FARPOST_PORT" => Some("3000".to_owned()),
            "FARPOST_SPEED" => Some("not-a-number".to_owned()),
            _ => None,
        });
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.session.speed_multiplier, 1);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("farpost-config.yaml");
        if path.exists() {
            let contents = std::fs::read_to_string(&path).unwrap_or_default();
            let config = parse_without_env(&contents);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            // The shipped file mirrors the built-in catalog.
            let config = config.ok().unwrap_or_default();
            assert_eq!(config.economy, EconomyConfig::default());
        }
    }
}
