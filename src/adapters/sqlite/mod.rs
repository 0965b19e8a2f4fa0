//! SQLite adapters: blacklist and component pool persistence.

pub mod blacklist_repository;
pub mod connection;
pub mod migrations;
pub mod pool_store;

pub use blacklist_repository::SqliteBlacklistRepository;
pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, DatabaseTarget, PoolSettings};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use pool_store::SqlitePoolStore;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a JSON string from a SQLite row field, falling back to the type's default.
pub fn parse_json_or_default<T: serde::de::DeserializeOwned + Default>(s: Option<String>) -> DomainResult<T> {
    s.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(Option::unwrap_or_default)
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Open the database at `database_url` and bring its schema up to date.
pub async fn initialize_database(database_url: &str, config: Option<PoolSettings>) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, config).await?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await?;
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await?;
    Ok(pool)
}
