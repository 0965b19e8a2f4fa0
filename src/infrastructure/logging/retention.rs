//! Removal of rolled log files past their retention period.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::path::Path;
use tracing::{debug, info};

/// Delete `uaforge.log*` files in `log_dir` last modified more than
/// `retention_days` ago. Returns the number of files removed.
pub async fn prune_old_logs(log_dir: &Path, retention_days: u32) -> Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
    let mut deleted = 0;

    let mut entries = tokio::fs::read_dir(log_dir)
        .await
        .context("failed to read log directory")?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .context("failed to read directory entry")?
    {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("uaforge.log"));
        if !is_log {
            continue;
        }

        let modified: DateTime<Utc> = entry
            .metadata()
            .await
            .and_then(|m| m.modified())
            .context("failed to get file modification time")?
            .into();

        if modified < cutoff {
            tokio::fs::remove_file(&path)
                .await
                .context("failed to delete old log file")?;
            debug!(path = %path.display(), "deleted old log file");
            deleted += 1;
        }
    }

    if deleted > 0 {
        info!(count = deleted, "cleaned up old log files");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_dir_is_noop() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(prune_old_logs(&missing, 7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_keeps_fresh_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("uaforge.log.2026-10-18"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        assert_eq!(prune_old_logs(dir.path(), 7).await.unwrap(), 0);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_zero_retention_removes_rolled_logs() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("uaforge.log.2026-10-01");
        std::fs::write(&log, "{}").unwrap();
        std::fs::write(dir.path().join("other.log"), "keep").unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        // cutoff is "now"; anything written before it goes
        assert_eq!(prune_old_logs(dir.path(), 0).await.unwrap(), 1);
        assert!(!log.exists());
        assert!(dir.path().join("other.log").exists());
    }
}
