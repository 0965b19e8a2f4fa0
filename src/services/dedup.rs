//! Batch-local uniqueness gate.
//!
//! Compares full strings, which is stricter than the persistent blacklist's
//! hash comparison. Owned by a single controller run and never shared.

use std::collections::HashSet;

use crate::domain::errors::GenerationError;

#[derive(Debug, Default)]
pub struct BatchGate {
    seen: HashSet<String>,
    accepted: Vec<String>,
}

impl BatchGate {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
            accepted: Vec::with_capacity(capacity),
        }
    }

    /// Accept `candidate` if the batch has not seen it; returns whether it was accepted.
    pub fn accept_if_unique(&mut self, candidate: String) -> bool {
        if self.seen.contains(&candidate) {
            return false;
        }
        self.seen.insert(candidate.clone());
        self.accepted.push(candidate);
        true
    }

    /// Same as [`accept_if_unique`](Self::accept_if_unique) but reports a duplicate as an error.
    pub fn admit(&mut self, candidate: String) -> Result<(), GenerationError> {
        if self.accept_if_unique(candidate) {
            Ok(())
        } else {
            Err(GenerationError::DuplicateCandidate)
        }
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.seen.contains(candidate)
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Accepted agents in acceptance order.
    pub fn into_accepted(self) -> Vec<String> {
        self.accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_exact_duplicates() {
        let mut gate = BatchGate::default();
        assert!(gate.accept_if_unique("a".into()));
        assert!(!gate.accept_if_unique("a".into()));
        assert!(gate.accept_if_unique("A".into()));
        assert_eq!(gate.len(), 2);
    }

    #[test]
    fn test_admit_reports_duplicate() {
        let mut gate = BatchGate::with_capacity(4);
        gate.admit("x".into()).unwrap();
        assert_eq!(gate.admit("x".into()), Err(GenerationError::DuplicateCandidate));
    }

    #[test]
    fn test_preserves_acceptance_order() {
        let mut gate = BatchGate::default();
        for s in ["c", "a", "b", "a"] {
            gate.accept_if_unique(s.to_string());
        }
        assert!(gate.contains("b"));
        assert_eq!(gate.into_accepted(), vec!["c", "a", "b"]);
    }
}
