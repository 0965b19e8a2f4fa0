use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for uaforge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Batch controller budgets and pacing
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Persistent blacklist commit settings
    #[serde(default)]
    pub blacklist: BlacklistConfig,

    /// Where component pools are read from
    #[serde(default)]
    pub pools: PoolSourceConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".uaforge/uaforge.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Rotation: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

const fn default_retention_days() -> u32 {
    14
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
            retention_days: default_retention_days(),
        }
    }
}

/// Batch controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Attempts allowed per requested agent
    #[serde(default = "default_attempt_multiplier")]
    pub attempt_multiplier: u64,

    /// Floor for the attempt budget regardless of quantity
    #[serde(default = "default_min_attempts")]
    pub min_attempts: u64,

    /// Stop after this many failed attempts in a row
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u64,

    /// Minimum time between progress events
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Yield to the runtime every N attempts
    #[serde(default = "default_yield_every")]
    pub yield_every: u64,

    /// Largest quantity a single request may ask for
    #[serde(default = "default_max_quantity")]
    pub max_quantity: usize,
}

const fn default_attempt_multiplier() -> u64 {
    100
}

const fn default_min_attempts() -> u64 {
    50_000
}

const fn default_max_consecutive_failures() -> u64 {
    500
}

const fn default_progress_interval_ms() -> u64 {
    250
}

const fn default_yield_every() -> u64 {
    256
}

const fn default_max_quantity() -> usize {
    100_000
}

impl GenerationConfig {
    /// `max(quantity * multiplier, min_attempts)`
    pub fn max_attempts(&self, quantity: usize) -> u64 {
        (quantity as u64)
            .saturating_mul(self.attempt_multiplier)
            .max(self.min_attempts)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            attempt_multiplier: default_attempt_multiplier(),
            min_attempts: default_min_attempts(),
            max_consecutive_failures: default_max_consecutive_failures(),
            progress_interval_ms: default_progress_interval_ms(),
            yield_every: default_yield_every(),
            max_quantity: default_max_quantity(),
        }
    }
}

/// Blacklist commit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BlacklistConfig {
    /// Entries per upsert round trip
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Attribution tag used when the caller gives none
    #[serde(default = "default_attribution")]
    pub default_attribution: String,
}

const fn default_chunk_size() -> usize {
    500
}

fn default_attribution() -> String {
    "uaforge".to_string()
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            default_attribution: default_attribution(),
        }
    }
}

/// Pool source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PoolSourceConfig {
    /// `sqlite` or `yaml`
    #[serde(default = "default_pool_source")]
    pub source: String,

    /// Catalog file for the yaml source; the bundled catalog when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

fn default_pool_source() -> String {
    "sqlite".to_string()
}

impl Default for PoolSourceConfig {
    fn default() -> Self {
        Self {
            source: default_pool_source(),
            catalog_path: None,
        }
    }
}
