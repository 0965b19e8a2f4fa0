//! Blacklist repository port.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AppType, BlacklistEntry};

/// Repository interface for the persistent blacklist.
#[async_trait]
pub trait BlacklistRepository: Send + Sync {
    /// Insert or replace entries keyed by hash (last write wins).
    /// Returns the number of rows written.
    async fn bulk_upsert(&self, entries: &[BlacklistEntry]) -> DomainResult<u64>;

    /// Get an entry by hash.
    async fn get(&self, hash: &str) -> DomainResult<Option<BlacklistEntry>>;

    /// Total number of entries.
    async fn count(&self) -> DomainResult<u64>;

    /// Entry counts grouped by app type.
    async fn count_by_app_type(&self) -> DomainResult<HashMap<AppType, u64>>;

    /// Most recently written entries.
    async fn list_recent(&self, limit: usize) -> DomainResult<Vec<BlacklistEntry>>;
}
