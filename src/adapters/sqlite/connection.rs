//! SQLite connection pools for the blacklist and component pool tables.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Connection, SqlitePool};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::models::DatabaseConfig;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Unsupported database URL: {0} (expected sqlite:<path> or sqlite::memory:)")]
    UnsupportedUrl(String),

    #[error("Cannot create database directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open database: {0}")]
    Open(#[source] sqlx::Error),
}

/// Where a database URL points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    File(PathBuf),
    Memory,
}

impl DatabaseTarget {
    /// Accepts `sqlite:<path>`, `sqlite://<path>` and `sqlite::memory:`.
    /// Query parameters are ignored.
    pub fn parse(url: &str) -> Result<Self, ConnectionError> {
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .ok_or_else(|| ConnectionError::UnsupportedUrl(url.to_string()))?;
        let path = rest.split('?').next().unwrap_or_default();
        match path {
            "" => Err(ConnectionError::UnsupportedUrl(url.to_string())),
            ":memory:" => Ok(Self::Memory),
            file => Ok(Self::File(PathBuf::from(file))),
        }
    }
}

/// Pool sizing and lock waits.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// How long a writer waits on a locked database.
    pub busy_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(3),
            busy_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&DatabaseConfig> for PoolSettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections.max(1),
            ..Self::default()
        }
    }
}

/// Open a pool for `database_url`.
///
/// File databases are created on first use (parent directories included)
/// and run in WAL mode. In-memory databases get a single connection, since
/// every connection would otherwise see its own empty database.
pub async fn create_pool(database_url: &str, settings: Option<PoolSettings>) -> Result<SqlitePool, ConnectionError> {
    let settings = settings.unwrap_or_default();

    let (options, max_connections) = match DatabaseTarget::parse(database_url)? {
        DatabaseTarget::Memory => {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|_| ConnectionError::UnsupportedUrl(database_url.to_string()))?;
            (options, 1)
        }
        DatabaseTarget::File(path) => {
            create_parent_dir(&path).await?;
            let options = SqliteConnectOptions::new()
                .filename(&path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal);
            (options, settings.max_connections)
        }
    };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(
            options
                .synchronous(SqliteSynchronous::Normal)
                .busy_timeout(settings.busy_timeout),
        )
        .await
        .map_err(ConnectionError::Open)
}

/// Single-connection in-memory pool for tests.
pub async fn create_test_pool() -> Result<SqlitePool, ConnectionError> {
    create_pool("sqlite::memory:", None).await
}

async fn create_parent_dir(path: &Path) -> Result<(), ConnectionError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ConnectionError::Directory {
                path: parent.to_path_buf(),
                source,
            }),
        _ => Ok(()),
    }
}

/// Round-trip one connection to prove the database answers.
pub async fn verify_connection(pool: &SqlitePool) -> Result<(), ConnectionError> {
    let mut conn = pool.acquire().await.map_err(ConnectionError::Open)?;
    conn.ping().await.map_err(ConnectionError::Open)
}
