//! Engine services: sampling, compatibility resolution, composition,
//! batch-local dedup, the batch controller and blacklist commits.

pub mod batch_controller;
pub mod blacklist_service;
pub mod compatibility;
pub mod composer;
pub mod dedup;
pub mod engine;
pub mod selector;

pub use batch_controller::{BatchController, ControllerLimits, GenerationBatch};
pub use blacklist_service::{BlacklistService, BlacklistStats, CommitSummary};
pub use composer::{Composer, ComposerRegistry};
pub use dedup::BatchGate;
pub use engine::GenerationEngine;
