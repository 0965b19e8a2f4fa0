//! SQLite implementation of the BlacklistRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AppType, BlacklistEntry};
use crate::domain::ports::BlacklistRepository;

use super::parse_datetime;

#[derive(Clone)]
pub struct SqliteBlacklistRepository {
    pool: SqlitePool,
}

impl SqliteBlacklistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlacklistRepository for SqliteBlacklistRepository {
    async fn bulk_upsert(&self, entries: &[BlacklistEntry]) -> DomainResult<u64> {
        if entries.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for entry in entries {
            let result = sqlx::query(
                r#"INSERT INTO blacklist_entries (hash, agent, app_type, attribution, created_at, updated_at)
                   VALUES (?, ?, ?, ?, ?, ?)
                   ON CONFLICT(hash) DO UPDATE SET
                       agent = excluded.agent,
                       app_type = excluded.app_type,
                       attribution = excluded.attribution,
                       updated_at = excluded.updated_at"#,
            )
            .bind(&entry.hash)
            .bind(&entry.agent)
            .bind(entry.app_type.as_str())
            .bind(&entry.attribution)
            .bind(entry.created_at.to_rfc3339())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }

    async fn get(&self, hash: &str) -> DomainResult<Option<BlacklistEntry>> {
        let row: Option<BlacklistRow> = sqlx::query_as(
            "SELECT hash, agent, app_type, attribution, created_at FROM blacklist_entries WHERE hash = ?",
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn count(&self) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blacklist_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn count_by_app_type(&self) -> DomainResult<HashMap<AppType, u64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT app_type, COUNT(*) as count FROM blacklist_entries GROUP BY app_type",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = HashMap::new();
        for (app_type, count) in rows {
            if let Ok(app_type) = app_type.parse::<AppType>() {
                counts.insert(app_type, u64::try_from(count).unwrap_or_default());
            }
        }
        Ok(counts)
    }

    async fn list_recent(&self, limit: usize) -> DomainResult<Vec<BlacklistEntry>> {
        let rows: Vec<BlacklistRow> = sqlx::query_as(
            "SELECT hash, agent, app_type, attribution, created_at FROM blacklist_entries
             ORDER BY updated_at DESC, hash LIMIT ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct BlacklistRow {
    hash: String,
    agent: String,
    app_type: String,
    attribution: String,
    created_at: String,
}

impl TryFrom<BlacklistRow> for BlacklistEntry {
    type Error = DomainError;

    fn try_from(row: BlacklistRow) -> Result<Self, Self::Error> {
        let app_type = row
            .app_type
            .parse::<AppType>()
            .map_err(|_| DomainError::SerializationError(format!("Invalid app type: {}", row.app_type)))?;

        Ok(Self {
            hash: row.hash,
            agent: row.agent,
            app_type,
            attribution: row.attribution,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::agent_hash;

    async fn setup() -> SqliteBlacklistRepository {
        SqliteBlacklistRepository::new(create_migrated_test_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let repo = setup().await;
        let entry = BlacklistEntry::new("Mozilla/5.0 (iPhone)", AppType::Browser, "ops");

        assert_eq!(repo.bulk_upsert(&[entry.clone()]).await.unwrap(), 1);

        let stored = repo.get(&entry.hash).await.unwrap().unwrap();
        assert_eq!(stored.agent, entry.agent);
        assert_eq!(stored.app_type, AppType::Browser);
        assert!(repo.get(&agent_hash("Mozilla/5.0 (iPhone)")).await.unwrap().is_some());
        assert!(repo.get(&agent_hash("other")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_conflict_keeps_one_row_last_write_wins() {
        let repo = setup().await;
        let first = BlacklistEntry::new("agent", AppType::Browser, "alice");
        let second = BlacklistEntry::new("agent", AppType::MessagingAppB, "bob");

        repo.bulk_upsert(&[first]).await.unwrap();
        repo.bulk_upsert(&[second]).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        let stored = repo.get(&agent_hash("agent")).await.unwrap().unwrap();
        assert_eq!(stored.attribution, "bob");
        assert_eq!(stored.app_type, AppType::MessagingAppB);
    }

    #[tokio::test]
    async fn test_counts_and_recent() {
        let repo = setup().await;
        let entries = vec![
            BlacklistEntry::new("a", AppType::Browser, "ops"),
            BlacklistEntry::new("b", AppType::Browser, "ops"),
            BlacklistEntry::new("c", AppType::MessagingAppA, "ops"),
        ];
        repo.bulk_upsert(&entries).await.unwrap();

        let counts = repo.count_by_app_type().await.unwrap();
        assert_eq!(counts.get(&AppType::Browser), Some(&2));
        assert_eq!(counts.get(&AppType::MessagingAppA), Some(&1));
        assert_eq!(counts.get(&AppType::MessagingAppB), None);

        assert_eq!(repo.list_recent(2).await.unwrap().len(), 2);
        assert_eq!(repo.bulk_upsert(&[]).await.unwrap(), 0);
    }
}
