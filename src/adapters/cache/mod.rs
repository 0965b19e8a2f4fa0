//! Caching decorators for repository ports.

pub mod cached_pool_store;

pub use cached_pool_store::CachedPoolStore;
