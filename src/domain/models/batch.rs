//! Generation requests, batch lifecycle, progress and outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::platform::{AppType, Platform};
use crate::domain::errors::GenerationError;

/// Which device a batch draws from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "model")]
pub enum DeviceSelector {
    /// A fresh uniform draw each attempt
    #[default]
    Random,
    /// Always the named model
    Specific(String),
}

impl DeviceSelector {
    pub fn from_option(model: Option<String>) -> Self {
        model.map_or(Self::Random, Self::Specific)
    }
}

/// Caller-supplied generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub platform: Platform,
    pub app_type: AppType,
    #[serde(default)]
    pub device: DeviceSelector,
    pub quantity: usize,
    /// Fixed seed for reproducible batches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GenerationRequest {
    pub fn new(platform: Platform, app_type: AppType, quantity: usize) -> Self {
        Self {
            platform,
            app_type,
            device: DeviceSelector::Random,
            quantity,
            seed: None,
        }
    }

    pub fn with_device(mut self, model: impl Into<String>) -> Self {
        self.device = DeviceSelector::Specific(model.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Lifecycle of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Idle,
    Running,
    Completed,
    PartiallyCompleted,
    Failed,
    Cancelled,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::PartiallyCompleted => "partially_completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::PartiallyCompleted | Self::Failed | Self::Cancelled
        )
    }

    /// `Idle -> Running -> {terminal}`; nothing leaves a terminal state.
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        match self {
            Self::Idle => next == Self::Running,
            Self::Running => next.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the controller loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    QuantityReached,
    AttemptBudgetExhausted,
    ConsecutiveFailureCeiling,
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::QuantityReached => "quantity reached",
            Self::AttemptBudgetExhausted => "attempt budget exhausted",
            Self::ConsecutiveFailureCeiling => "consecutive failure ceiling reached",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Throttled progress event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub accepted: usize,
    pub requested: usize,
    pub attempts: u64,
    /// accepted / attempts
    pub success_rate: f64,
    /// accepted / requested, 0-100
    pub percent: f64,
}

impl BatchProgress {
    pub fn new(accepted: usize, requested: usize, attempts: u64) -> Self {
        let success_rate = if attempts == 0 {
            0.0
        } else {
            accepted as f64 / attempts as f64
        };
        let percent = if requested == 0 {
            100.0
        } else {
            accepted as f64 * 100.0 / requested as f64
        };
        Self {
            accepted,
            requested,
            attempts,
            success_rate,
            percent,
        }
    }
}

/// Counts of rejected attempts by cause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureTally {
    pub configuration_missing: u64,
    pub exhausted: u64,
    pub duplicates: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip)]
    last: Option<GenerationError>,
}

impl FailureTally {
    pub fn record(&mut self, error: &GenerationError) {
        match error {
            GenerationError::ConfigurationMissing(_) => self.configuration_missing += 1,
            GenerationError::Exhausted(_) => self.exhausted += 1,
            GenerationError::DuplicateCandidate => self.duplicates += 1,
        }
        self.last_error = Some(error.to_string());
        self.last = Some(error.clone());
    }

    pub fn total(&self) -> u64 {
        self.configuration_missing + self.exhausted + self.duplicates
    }

    pub fn last(&self) -> Option<&GenerationError> {
        self.last.as_ref()
    }

    /// True when every failed attempt was an operator configuration problem.
    pub fn only_configuration_missing(&self) -> bool {
        self.configuration_missing > 0 && self.exhausted == 0 && self.duplicates == 0
    }
}

/// Terminal result of a controller run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub batch_id: Uuid,
    pub status: BatchStatus,
    /// Accepted agents; always empty when cancelled
    pub agents: Vec<String>,
    pub attempts: u64,
    pub requested: usize,
    pub stop_reason: StopReason,
    pub failures: FailureTally,
    pub elapsed_ms: u64,
}

impl BatchOutcome {
    pub fn accepted(&self) -> usize {
        self.agents.len()
    }

    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.agents.len())
    }
}
