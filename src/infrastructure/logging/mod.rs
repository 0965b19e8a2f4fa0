//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stderr output (stdout carries command output)
//! - Optional rolling JSON log files with retention cleanup

pub mod config;
pub mod logger;
pub mod retention;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
pub use retention::prune_old_logs;
