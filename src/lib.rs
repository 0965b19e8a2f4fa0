//! uaforge - User-agent generation engine
//!
//! Produces batches of distinct, realistic user-agent strings for Android and
//! iOS across several application grammars. Components (device models, app
//! versions, build numbers, locales, screen metrics) are drawn from weighted
//! pools, checked for compatibility and assembled by per-platform composers.
//! A batch controller drives generation to the requested quantity under an
//! attempt budget, and accepted agents can be committed to a persistent
//! blacklist.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, error taxonomy and port traits
//! - **Service Layer** (`services`): selection, compatibility, composition,
//!   dedup, batch control and the blacklist service
//! - **Adapters** (`adapters`): `SQLite` and YAML pool stores, pool cache,
//!   blacklist repository
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use uaforge::adapters::catalog::YamlPoolStore;
//! use uaforge::domain::models::{AppType, GenerationConfig, GenerationRequest, Platform};
//! use uaforge::services::GenerationEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = GenerationEngine::new(Arc::new(YamlPoolStore::bundled()?), GenerationConfig::default());
//!     let request = GenerationRequest::new(Platform::Android, AppType::Browser, 100);
//!     let outcome = engine.generate(request, &CancellationToken::new(), |_| {}).await?;
//!     println!("{}", outcome.agents.join("\n"));
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult, GenerationError};
pub use domain::models::{
    AppType, BatchOutcome, BatchProgress, BatchStatus, Config, GenerationRequest, Platform,
};
pub use domain::ports::{BlacklistRepository, ComponentPoolStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{BlacklistService, GenerationEngine};
