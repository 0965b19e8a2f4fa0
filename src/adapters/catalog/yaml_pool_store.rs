//! File-backed component pool store.
//!
//! The catalog shape is the serde form of [`PoolCatalog`]: one section per
//! platform, each holding the raw pools. The same file can be imported into
//! SQLite with `uaforge pools import`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AppType, ComponentPools, Platform, PoolCatalog};
use crate::domain::ports::ComponentPoolStore;

/// Catalog shipped with the binary.
pub const DEFAULT_CATALOG: &str = include_str!("../../../data/default_pools.yaml");

/// Parse and validate a YAML catalog.
pub fn parse_catalog(yaml: &str) -> DomainResult<PoolCatalog> {
    let catalog: PoolCatalog = serde_yaml::from_str(yaml)?;
    catalog.validate().map_err(DomainError::ValidationFailed)?;
    Ok(catalog)
}

pub fn default_catalog() -> DomainResult<PoolCatalog> {
    parse_catalog(DEFAULT_CATALOG)
}

pub async fn read_catalog(path: &Path) -> DomainResult<PoolCatalog> {
    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::Io(format!("{}: {e}", path.display())))?;
    parse_catalog(&yaml)
}

/// Serves pools from an in-memory catalog.
#[derive(Debug, Clone)]
pub struct YamlPoolStore {
    catalog: PoolCatalog,
    source: Option<PathBuf>,
}

impl YamlPoolStore {
    pub fn from_catalog(catalog: PoolCatalog) -> Self {
        Self {
            catalog,
            source: None,
        }
    }

    pub fn bundled() -> DomainResult<Self> {
        Ok(Self::from_catalog(default_catalog()?))
    }

    pub async fn open(path: impl Into<PathBuf>) -> DomainResult<Self> {
        let path = path.into();
        let catalog = read_catalog(&path).await?;
        Ok(Self {
            catalog,
            source: Some(path),
        })
    }

    pub fn catalog(&self) -> &PoolCatalog {
        &self.catalog
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[async_trait]
impl ComponentPoolStore for YamlPoolStore {
    async fn load_pools(&self, platform: Platform, app_type: AppType) -> DomainResult<ComponentPools> {
        let pools = self.catalog.pools_for(platform, app_type).require_devices()?;
        debug!(
            %platform,
            %app_type,
            source = %self.source.as_deref().map_or_else(|| "bundled".into(), |p| p.display().to_string()),
            devices = pools.device_models.len(),
            "pools loaded from catalog"
        );
        Ok(pools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_catalog_covers_every_selection() {
        let catalog = default_catalog().unwrap();
        for platform in Platform::ALL {
            for app_type in AppType::ALL {
                let pools = catalog.pools_for(platform, app_type);
                assert!(!pools.device_models.is_empty(), "{platform}/{app_type}");
                assert!(!pools.language_weights.is_empty(), "{platform}/{app_type}");
            }
        }
        assert!(catalog
            .android
            .device_models
            .iter()
            .all(|d| d.chipset.is_some() && d.device_code.is_some()));
    }

    #[test]
    fn test_parse_rejects_invalid_catalog() {
        let yaml = "android:\n  build_numbers:\n    - os_version: \"13\"\n      build: \"\"\n";
        assert!(matches!(parse_catalog(yaml), Err(DomainError::ValidationFailed(_))));
        assert!(matches!(parse_catalog("android: [1, 2"), Err(DomainError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_open_file_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "ios:\n  device_models:\n    - model: iPhone15,2\n      manufacturer: Apple\n  os_versions: [\"17.1\"]"
        )
        .unwrap();

        let store = YamlPoolStore::open(file.path()).await.unwrap();
        assert_eq!(store.source(), Some(file.path()));

        let pools = store.load_pools(Platform::Ios, AppType::Browser).await.unwrap();
        assert_eq!(pools.device_models.len(), 1);
        assert_eq!(pools.os_versions, vec!["17.1".to_string()]);

        let android = store.load_pools(Platform::Android, AppType::Browser).await;
        assert!(matches!(android, Err(DomainError::ConfigurationMissing(_))));
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let result = YamlPoolStore::open("/nonexistent/pools.yaml").await;
        assert!(matches!(result, Err(DomainError::Io(_))));
    }
}
