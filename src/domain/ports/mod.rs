//! Port trait definitions (Hexagonal Architecture)
//!
//! Async interfaces the engine's collaborators implement:
//! - ComponentPoolStore: read access to versioned component pools
//! - BlacklistRepository: persistent, hash-keyed blacklist of committed agents

pub mod blacklist_repository;
pub mod pool_store;

pub use blacklist_repository::BlacklistRepository;
pub use pool_store::ComponentPoolStore;
