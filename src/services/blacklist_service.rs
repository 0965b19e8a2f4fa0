//! Blacklist service: explicit, chunked commits of accepted agents.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{agent_hash, AppType, BlacklistEntry};
use crate::domain::ports::BlacklistRepository;

/// Default number of entries per upsert round trip.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Result of one commit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Agents handed in
    pub submitted: usize,
    /// Distinct hashes among them
    pub unique: usize,
    pub chunks: usize,
}

/// Blacklist totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistStats {
    pub total: u64,
    pub by_app_type: HashMap<AppType, u64>,
}

pub struct BlacklistService<R: BlacklistRepository + ?Sized> {
    repository: Arc<R>,
    chunk_size: usize,
}

impl<R: BlacklistRepository + ?Sized> BlacklistService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_chunk_size(repository, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(repository: Arc<R>, chunk_size: usize) -> Self {
        Self {
            repository,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Persist `agents` under `app_type`.
    ///
    /// Safe to repeat: rows are keyed by hash and the last write wins.
    pub async fn commit(
        &self,
        agents: &[String],
        app_type: AppType,
        attribution: &str,
    ) -> DomainResult<CommitSummary> {
        if attribution.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "attribution cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(agents.len());
        let entries: Vec<BlacklistEntry> = agents
            .iter()
            .map(|agent| BlacklistEntry::new(agent.clone(), app_type, attribution))
            .filter(|entry| seen.insert(entry.hash.clone()))
            .collect();

        let mut chunks = 0;
        for chunk in entries.chunks(self.chunk_size) {
            let written = self.repository.bulk_upsert(chunk).await?;
            chunks += 1;
            debug!(chunk = chunks, entries = chunk.len(), written, "blacklist chunk upserted");
        }

        let summary = CommitSummary {
            submitted: agents.len(),
            unique: entries.len(),
            chunks,
        };
        info!(
            app_type = %app_type,
            attribution,
            submitted = summary.submitted,
            unique = summary.unique,
            chunks = summary.chunks,
            "blacklist commit finished"
        );
        Ok(summary)
    }

    /// Look up an agent string.
    pub async fn check(&self, agent: &str) -> DomainResult<Option<BlacklistEntry>> {
        self.repository.get(&agent_hash(agent)).await
    }

    pub async fn stats(&self) -> DomainResult<BlacklistStats> {
        Ok(BlacklistStats {
            total: self.repository.count().await?,
            by_app_type: self.repository.count_by_app_type().await?,
        })
    }

    pub async fn recent(&self, limit: usize) -> DomainResult<Vec<BlacklistEntry>> {
        self.repository.list_recent(limit).await
    }
}
