//! Component pool store port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AppType, ComponentPools, Platform};

/// Read-only source of component pools.
///
/// Implementations return devices and versions already filtered to active
/// entries. A selection without a single active device model reports
/// `DomainError::ConfigurationMissing`.
#[async_trait]
pub trait ComponentPoolStore: Send + Sync {
    async fn load_pools(&self, platform: Platform, app_type: AppType) -> DomainResult<ComponentPools>;
}
