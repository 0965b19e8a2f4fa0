//! Common test utilities for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use uaforge::adapters::catalog::{default_catalog, YamlPoolStore};
use uaforge::domain::models::{GenerationConfig, PoolCatalog};
use uaforge::services::GenerationEngine;

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Generation limits with progress emitted on every attempt.
pub fn fast_config() -> GenerationConfig {
    GenerationConfig {
        progress_interval_ms: 0,
        ..GenerationConfig::default()
    }
}

pub fn bundled_catalog() -> PoolCatalog {
    default_catalog().expect("bundled catalog parses")
}

/// Engine over an in-memory catalog.
pub fn engine_for(catalog: PoolCatalog, config: GenerationConfig) -> GenerationEngine {
    GenerationEngine::new(Arc::new(YamlPoolStore::from_catalog(catalog)), config)
}

pub fn bundled_engine() -> GenerationEngine {
    engine_for(bundled_catalog(), fast_config())
}
