use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local directory holding config, database and logs.
pub const CONFIG_DIR: &str = ".uaforge";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid {field}: {value}. Must be at least 1")]
    ZeroLimit { field: &'static str, value: u64 },

    #[error("Invalid pool source: {0}. Must be one of: sqlite, yaml")]
    InvalidPoolSource(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current directory.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .uaforge/config.yaml (project config, created by init)
    /// 3. .uaforge/local.yaml (project local overrides, optional)
    /// 4. Environment variables (UAFORGE_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(Path::new("."))
    }

    /// Same as [`ConfigLoader::load`] with `root` as the project directory.
    pub fn load_from_dir(root: &Path) -> Result<Config> {
        let dir = root.join(CONFIG_DIR);
        let config: Config = Self::figment(&dir)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(dir: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("UAFORGE_").split("__"))
    }

    /// Load configuration from a specific file (no environment overrides)
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Default configuration rendered as YAML, as written by `init`.
    pub fn default_yaml() -> Result<String> {
        serde_yaml::to_string(&Config::default()).context("Failed to render default configuration")
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        let generation = &config.generation;
        let limits = [
            ("generation.attempt_multiplier", generation.attempt_multiplier),
            ("generation.min_attempts", generation.min_attempts),
            ("generation.max_consecutive_failures", generation.max_consecutive_failures),
            ("generation.yield_every", generation.yield_every),
            ("generation.max_quantity", generation.max_quantity as u64),
            ("blacklist.chunk_size", config.blacklist.chunk_size as u64),
        ];
        if let Some((field, value)) = limits.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ZeroLimit { field, value });
        }

        if config.blacklist.default_attribution.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "blacklist.default_attribution cannot be empty".to_string(),
            ));
        }

        let valid_sources = ["sqlite", "yaml"];
        if !valid_sources.contains(&config.pools.source.as_str()) {
            return Err(ConfigError::InvalidPoolSource(config.pools.source.clone()));
        }

        Ok(())
    }
}
