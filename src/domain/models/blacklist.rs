//! Persistent blacklist entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::platform::AppType;

/// Stable digest of a full generated agent string (hex SHA-256).
pub fn agent_hash(agent: &str) -> String {
    hex::encode(Sha256::digest(agent.as_bytes()))
}

/// An agent that must not be handed out again.
///
/// Entries are written by explicit commit only and keyed by `hash`; writing the
/// same agent twice replaces the earlier row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub hash: String,
    pub agent: String,
    pub app_type: AppType,
    pub attribution: String,
    pub created_at: DateTime<Utc>,
}

impl BlacklistEntry {
    pub fn new(agent: impl Into<String>, app_type: AppType, attribution: impl Into<String>) -> Self {
        let agent = agent.into();
        Self {
            hash: agent_hash(&agent),
            agent,
            app_type,
            attribution: attribution.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let a = BlacklistEntry::new("Mozilla/5.0 test", AppType::Browser, "ops");
        let b = BlacklistEntry::new("Mozilla/5.0 test", AppType::MessagingAppA, "someone-else");
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.hash.len(), 64);
    }

    #[test]
    fn test_hash_differs_per_agent() {
        assert_ne!(agent_hash("a"), agent_hash("b"));
        assert_eq!(
            agent_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
