//! Domain layer for the uaforge generation engine.
//!
//! Pure models, error taxonomy and the port traits the engine talks to.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, GenerationError};
