//! Cached wrapper for `ComponentPoolStore` using a moka cache.
//!
//! Pools are read far more often than they change, so each (platform, app
//! type) selection is loaded once and shared. Concurrent misses on the same
//! selection wait on a single load. Imports call [`CachedPoolStore::invalidate_all`].

use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AppType, ComponentPools, Platform};
use crate::domain::ports::ComponentPoolStore;

/// Maximum number of cached selections.
const POOL_CACHE_MAX_CAPACITY: u64 = 64;

/// Cached pool store decorator.
///
/// Failed loads are not cached; the next call retries the inner store.
pub struct CachedPoolStore<S: ComponentPoolStore + ?Sized> {
    inner: Arc<S>,
    pools: Cache<(Platform, AppType), Arc<ComponentPools>>,
}

impl<S: ComponentPoolStore + ?Sized> CachedPoolStore<S> {
    pub fn new(inner: Arc<S>) -> Self {
        let pools = Cache::builder().max_capacity(POOL_CACHE_MAX_CAPACITY).build();
        Self { inner, pools }
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    /// Shared handle to the pools for a selection, loading on first use.
    pub async fn get(&self, platform: Platform, app_type: AppType) -> DomainResult<Arc<ComponentPools>> {
        self.pools
            .try_get_with((platform, app_type), async {
                let loaded = self.inner.load_pools(platform, app_type).await?;
                debug!(%platform, %app_type, devices = loaded.device_models.len(), "pool cache filled");
                Ok::<_, DomainError>(Arc::new(loaded))
            })
            .await
            .map_err(|err| (*err).clone())
    }

    /// Drop every cached selection.
    pub fn invalidate_all(&self) {
        self.pools.invalidate_all();
    }
}

#[async_trait]
impl<S: ComponentPoolStore + ?Sized + 'static> ComponentPoolStore for CachedPoolStore<S> {
    async fn load_pools(&self, platform: Platform, app_type: AppType) -> DomainResult<ComponentPools> {
        Ok((*self.get(platform, app_type).await?).clone())
    }
}
