//! SQLite-backed component pool store.
//!
//! A catalog is imported per platform: the platform's rows are replaced
//! wholesale inside one transaction, so readers never see a half-written set.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AppType, BuildNumberEntry, CatalogSummary, ComponentPools, DeviceModel, LanguageWeightMap,
    Platform, PlatformPools, PoolCatalog, VersionComponent,
};
use crate::domain::ports::ComponentPoolStore;

use super::parse_json_or_default;

const POOL_TABLES: &[&str] = &[
    "device_models",
    "version_components",
    "build_numbers",
    "language_weights",
    "pool_resolutions",
    "pool_dpis",
    "os_versions",
];

#[derive(Clone)]
pub struct SqlitePoolStore {
    pool: SqlitePool,
}

impl SqlitePoolStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace stored pools with `catalog`, one platform at a time.
    pub async fn import_catalog(&self, catalog: &PoolCatalog) -> DomainResult<CatalogSummary> {
        catalog.validate().map_err(DomainError::ValidationFailed)?;

        let mut tx = self.pool.begin().await?;
        for platform in Platform::ALL {
            replace_platform(&mut tx, platform, catalog.platform(platform)).await?;
        }
        tx.commit().await?;

        let summary = catalog.summary();
        info!(
            devices = summary.device_models,
            versions = summary.version_components,
            build_numbers = summary.build_numbers,
            "pool catalog imported"
        );
        Ok(summary)
    }

    /// Every stored row for a platform, inactive ones included.
    pub async fn load_platform(&self, platform: Platform) -> DomainResult<PlatformPools> {
        let key = platform.as_str();

        let devices: Vec<DeviceRow> = sqlx::query_as(
            "SELECT model, manufacturer, chipset, device_code, os_version, min_os_version, max_os_version,
                    resolutions, dpis, is_active
             FROM device_models WHERE platform = ? ORDER BY id",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        let versions: Vec<VersionRow> = sqlx::query_as(
            "SELECT app_type, version, build, variant_code, feature_flag, is_active
             FROM version_components WHERE platform = ? ORDER BY id",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        let build_numbers: Vec<BuildNumberRow> = sqlx::query_as(
            "SELECT os_version, build, device, is_active FROM build_numbers WHERE platform = ? ORDER BY id",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        let weights: Vec<(String, f64)> =
            sqlx::query_as("SELECT locale, percentage FROM language_weights WHERE platform = ?")
                .bind(key)
                .fetch_all(&self.pool)
                .await?;

        Ok(PlatformPools {
            device_models: devices
                .into_iter()
                .map(TryInto::try_into)
                .collect::<DomainResult<_>>()?,
            version_components: versions
                .into_iter()
                .map(TryInto::try_into)
                .collect::<DomainResult<_>>()?,
            build_numbers: build_numbers.into_iter().map(Into::into).collect(),
            language_weights: weights.into_iter().collect::<LanguageWeightMap>(),
            resolutions: self.load_values("pool_resolutions", "value", key).await?,
            dpis: self.load_values("pool_dpis", "value", key).await?,
            os_versions: self.load_values("os_versions", "version", key).await?,
        })
    }

    pub async fn export_catalog(&self) -> DomainResult<PoolCatalog> {
        Ok(PoolCatalog {
            android: self.load_platform(Platform::Android).await?,
            ios: self.load_platform(Platform::Ios).await?,
        })
    }

    /// Whether any pool data has been imported.
    pub async fn is_empty(&self) -> DomainResult<bool> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM device_models) + (SELECT COUNT(*) FROM version_components)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count == 0)
    }

    async fn load_values(&self, table: &str, column: &str, platform: &str) -> DomainResult<Vec<String>> {
        let query = format!("SELECT {column} FROM {table} WHERE platform = ? ORDER BY id");
        let rows: Vec<(String,)> = sqlx::query_as(&query)
            .bind(platform)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }
}

async fn replace_platform(
    tx: &mut Transaction<'_, Sqlite>,
    platform: Platform,
    pools: &PlatformPools,
) -> DomainResult<()> {
    let key = platform.as_str();

    for table in POOL_TABLES {
        sqlx::query(&format!("DELETE FROM {table} WHERE platform = ?"))
            .bind(key)
            .execute(&mut **tx)
            .await?;
    }

    for device in &pools.device_models {
        sqlx::query(
            r#"INSERT INTO device_models (platform, model, manufacturer, chipset, device_code, os_version,
                   min_os_version, max_os_version, resolutions, dpis, is_active)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(key)
        .bind(&device.model)
        .bind(&device.manufacturer)
        .bind(&device.chipset)
        .bind(&device.device_code)
        .bind(&device.os_version)
        .bind(&device.min_os_version)
        .bind(&device.max_os_version)
        .bind(serde_json::to_string(&device.resolutions)?)
        .bind(serde_json::to_string(&device.dpis)?)
        .bind(device.is_active)
        .execute(&mut **tx)
        .await?;
    }

    for version in &pools.version_components {
        sqlx::query(
            r#"INSERT INTO version_components (platform, app_type, version, build, variant_code, feature_flag, is_active)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(key)
        .bind(version.app_type.as_str())
        .bind(&version.version)
        .bind(&version.build)
        .bind(&version.variant_code)
        .bind(&version.feature_flag)
        .bind(version.is_active)
        .execute(&mut **tx)
        .await?;
    }

    for entry in &pools.build_numbers {
        sqlx::query("INSERT INTO build_numbers (platform, os_version, build, device, is_active) VALUES (?, ?, ?, ?, ?)")
            .bind(key)
            .bind(&entry.os_version)
            .bind(&entry.build)
            .bind(&entry.device)
            .bind(entry.is_active)
            .execute(&mut **tx)
            .await?;
    }

    for (locale, percentage) in pools.language_weights.iter() {
        sqlx::query("INSERT INTO language_weights (platform, locale, percentage) VALUES (?, ?, ?)")
            .bind(key)
            .bind(locale)
            .bind(percentage)
            .execute(&mut **tx)
            .await?;
    }

    let value_sets: [(&str, &str, &[String]); 3] = [
        ("pool_resolutions", "value", &pools.resolutions),
        ("pool_dpis", "value", &pools.dpis),
        ("os_versions", "version", &pools.os_versions),
    ];
    for (table, column, values) in value_sets {
        let insert = format!("INSERT INTO {table} (platform, {column}) VALUES (?, ?)");
        for value in values {
            sqlx::query(&insert)
                .bind(key)
                .bind(value)
                .execute(&mut **tx)
                .await?;
        }
    }

    Ok(())
}

#[async_trait]
impl ComponentPoolStore for SqlitePoolStore {
    async fn load_pools(&self, platform: Platform, app_type: AppType) -> DomainResult<ComponentPools> {
        let pools = self
            .load_platform(platform)
            .await?
            .select(platform, app_type)
            .require_devices()?;
        debug!(
            %platform,
            %app_type,
            devices = pools.device_models.len(),
            versions = pools.version_components.len(),
            "pools loaded from sqlite"
        );
        Ok(pools)
    }
}

#[derive(sqlx::FromRow)]
struct DeviceRow {
    model: String,
    manufacturer: String,
    chipset: Option<String>,
    device_code: Option<String>,
    os_version: Option<String>,
    min_os_version: Option<String>,
    max_os_version: Option<String>,
    resolutions: Option<String>,
    dpis: Option<String>,
    is_active: Option<bool>,
}

impl TryFrom<DeviceRow> for DeviceModel {
    type Error = DomainError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            model: row.model,
            manufacturer: row.manufacturer,
            chipset: row.chipset,
            device_code: row.device_code,
            os_version: row.os_version,
            min_os_version: row.min_os_version,
            max_os_version: row.max_os_version,
            resolutions: parse_json_or_default(row.resolutions)?,
            dpis: parse_json_or_default(row.dpis)?,
            is_active: row.is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VersionRow {
    app_type: String,
    version: String,
    build: String,
    variant_code: Option<String>,
    feature_flag: Option<String>,
    is_active: Option<bool>,
}

impl TryFrom<VersionRow> for VersionComponent {
    type Error = DomainError;

    fn try_from(row: VersionRow) -> Result<Self, Self::Error> {
        let app_type = row
            .app_type
            .parse::<AppType>()
            .map_err(|_| DomainError::SerializationError(format!("Invalid app type: {}", row.app_type)))?;

        Ok(Self {
            app_type,
            version: row.version,
            build: row.build,
            variant_code: row.variant_code,
            feature_flag: row.feature_flag,
            is_active: row.is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BuildNumberRow {
    os_version: String,
    build: String,
    device: Option<String>,
    is_active: Option<bool>,
}

impl From<BuildNumberRow> for BuildNumberEntry {
    fn from(row: BuildNumberRow) -> Self {
        Self {
            os_version: row.os_version,
            build: row.build,
            device: row.device,
            is_active: row.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    fn sample_catalog() -> PoolCatalog {
        let mut catalog = PoolCatalog::default();
        catalog.android.device_models = vec![
            DeviceModel::new("Pixel 7", "Google")
                .with_chipset("gs201")
                .with_device_code("panther")
                .with_os_version("13")
                .with_resolutions(["1080x2400"])
                .with_dpis(["420"]),
            DeviceModel {
                is_active: Some(false),
                ..DeviceModel::new("Nexus 5", "LGE")
            },
        ];
        catalog.android.version_components = vec![
            VersionComponent::new(AppType::Browser, "120.0.6099.144", "6099144"),
            VersionComponent::new(AppType::MessagingAppB, "445.0.0.34.118", "512004030"),
        ];
        catalog.android.build_numbers = vec![
            BuildNumberEntry::new("13", "TQ3A.230805.001"),
            BuildNumberEntry::new("14", "UQ1A.240105.004").inactive(),
        ];
        catalog.android.language_weights = LanguageWeightMap::new().with("en_US", 70.0).with("de_DE", 30.0);
        catalog.ios.os_versions = vec!["17.1.2".into(), "16.6".into()];
        catalog.ios.dpis = vec!["3.00".into()];
        catalog
    }

    #[tokio::test]
    async fn test_import_and_export_preserves_rows() {
        let store = SqlitePoolStore::new(create_migrated_test_pool().await.unwrap());
        assert!(store.is_empty().await.unwrap());

        let catalog = sample_catalog();
        let summary = store.import_catalog(&catalog).await.unwrap();
        assert_eq!(summary.device_models, 2);
        assert_eq!(summary.os_versions, 2);

        let exported = store.export_catalog().await.unwrap();
        assert_eq!(exported, catalog);
        assert!(!store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_reimport_replaces_platform_rows() {
        let store = SqlitePoolStore::new(create_migrated_test_pool().await.unwrap());
        store.import_catalog(&sample_catalog()).await.unwrap();

        let mut smaller = sample_catalog();
        smaller.android.device_models.truncate(1);
        store.import_catalog(&smaller).await.unwrap();

        let android = store.load_platform(Platform::Android).await.unwrap();
        assert_eq!(android.device_models.len(), 1);
    }

    #[tokio::test]
    async fn test_load_pools_filters_for_selection() {
        let store = SqlitePoolStore::new(create_migrated_test_pool().await.unwrap());
        store.import_catalog(&sample_catalog()).await.unwrap();

        let pools = store.load_pools(Platform::Android, AppType::Browser).await.unwrap();
        assert_eq!(pools.device_models.len(), 1);
        assert_eq!(pools.version_components.len(), 1);
        // build numbers keep inactive rows for the resolver
        assert_eq!(pools.build_numbers.len(), 2);

        let in_app = store.load_pools(Platform::Android, AppType::MessagingAppB).await.unwrap();
        assert_eq!(in_app.version_components.len(), 2);

        // the sample catalog has iOS versions but no iOS devices
        let ios = store.load_pools(Platform::Ios, AppType::Browser).await;
        assert!(matches!(ios, Err(DomainError::ConfigurationMissing(_))));
    }
}
