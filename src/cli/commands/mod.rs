//! CLI command implementations.

pub mod blacklist;
pub mod generate;
pub mod init;
pub mod pools;

use anyhow::{bail, Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::catalog::YamlPoolStore;
use crate::adapters::sqlite::{initialize_database, PoolSettings, SqlitePoolStore};
use crate::domain::models::Config;
use crate::domain::ports::ComponentPoolStore;

/// Open the configured database, applying pending migrations.
pub async fn open_database(config: &Config) -> Result<SqlitePool> {
    initialize_database(&config.database.url(), Some(PoolSettings::from(&config.database)))
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))
}

/// Pool store selected by `pools.source`.
pub async fn open_pool_store(config: &Config) -> Result<Arc<dyn ComponentPoolStore>> {
    match config.pools.source.as_str() {
        "yaml" => {
            let store = match &config.pools.catalog_path {
                Some(path) => YamlPoolStore::open(path.clone()).await?,
                None => YamlPoolStore::bundled()?,
            };
            Ok(Arc::new(store))
        }
        "sqlite" => {
            let store = SqlitePoolStore::new(open_database(config).await?);
            if store.is_empty().await? {
                bail!("Component pools are empty. Run `uaforge init` or `uaforge pools import <FILE>` first.");
            }
            Ok(Arc::new(store))
        }
        other => bail!("Unknown pool source: {other}"),
    }
}
