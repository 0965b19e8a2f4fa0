//! Batch controller: drives repeated composition attempts toward a target quantity.
//!
//! The loop is cooperative. Each attempt is synchronous, cancellation is read
//! at the top of every iteration and the task yields to the runtime on a fixed
//! cadence so a host stays responsive. Progress events are throttled by time.

use rand::RngCore;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult, GenerationError};
use crate::domain::models::{
    BatchOutcome, BatchProgress, BatchStatus, ComponentPools, FailureTally, GenerationConfig,
    GenerationRequest, StopReason,
};
use crate::services::composer::Composer;
use crate::services::dedup::BatchGate;

/// Budgets derived for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerLimits {
    pub max_attempts: u64,
    pub max_consecutive_failures: u64,
    pub progress_interval: Duration,
    pub yield_every: u64,
}

impl ControllerLimits {
    pub fn for_quantity(config: &GenerationConfig, quantity: usize) -> Self {
        Self {
            max_attempts: config.max_attempts(quantity),
            max_consecutive_failures: config.max_consecutive_failures.max(1),
            progress_interval: Duration::from_millis(config.progress_interval_ms),
            yield_every: config.yield_every.max(1),
        }
    }
}

/// Ephemeral state of one controller run. Never persisted.
#[derive(Debug)]
pub struct GenerationBatch {
    pub id: Uuid,
    pub request: GenerationRequest,
    status: BatchStatus,
    gate: BatchGate,
    attempts: u64,
    consecutive_failures: u64,
    failures: FailureTally,
}

impl GenerationBatch {
    pub fn new(request: GenerationRequest) -> Self {
        let capacity = request.quantity.min(65_536);
        Self {
            id: Uuid::new_v4(),
            request,
            status: BatchStatus::Idle,
            gate: BatchGate::with_capacity(capacity),
            attempts: 0,
            consecutive_failures: 0,
            failures: FailureTally::default(),
        }
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn accepted(&self) -> usize {
        self.gate.len()
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures
    }

    pub fn progress(&self) -> BatchProgress {
        BatchProgress::new(self.gate.len(), self.request.quantity, self.attempts)
    }

    pub fn transition(&mut self, next: BatchStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        debug!(batch_id = %self.id, from = %self.status, to = %next, "batch transition");
        self.status = next;
        Ok(())
    }

    fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    fn record_failure(&mut self, error: &GenerationError) {
        self.consecutive_failures += 1;
        self.failures.record(error);
    }

    /// Classify a stopped run and hand back the outcome.
    fn finish(mut self, reason: StopReason, elapsed: Duration) -> DomainResult<BatchOutcome> {
        let accepted = self.gate.len();
        let status = match reason {
            StopReason::Cancelled => BatchStatus::Cancelled,
            _ if accepted == self.request.quantity => BatchStatus::Completed,
            _ if accepted > 0 => BatchStatus::PartiallyCompleted,
            _ => BatchStatus::Failed,
        };
        self.transition(status)?;

        let agents = if status == BatchStatus::Cancelled {
            Vec::new()
        } else {
            self.gate.into_accepted()
        };

        Ok(BatchOutcome {
            batch_id: self.id,
            status,
            agents,
            attempts: self.attempts,
            requested: self.request.quantity,
            stop_reason: reason,
            failures: self.failures,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

/// Runs one batch against in-memory pools with a single composer.
pub struct BatchController<'a> {
    composer: &'a dyn Composer,
    pools: &'a ComponentPools,
    limits: ControllerLimits,
}

impl<'a> BatchController<'a> {
    pub fn new(composer: &'a dyn Composer, pools: &'a ComponentPools, limits: ControllerLimits) -> Self {
        Self {
            composer,
            pools,
            limits,
        }
    }

    pub fn limits(&self) -> ControllerLimits {
        self.limits
    }

    /// One attempt: draw, render, admit.
    fn attempt<R: RngCore>(&self, batch: &mut GenerationBatch, rng: &mut R) -> Result<(), GenerationError> {
        let agent = self.composer.compose(self.pools, &batch.request.device, rng)?;
        batch.gate.admit(agent)
    }

    /// Drive `request` to a terminal state.
    ///
    /// `on_progress` is called at most once per `progress_interval` while
    /// running, in attempt order, plus once more when the run ends without
    /// cancellation.
    pub async fn run<R, F>(
        &self,
        request: GenerationRequest,
        rng: &mut R,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> DomainResult<BatchOutcome>
    where
        R: RngCore,
        F: FnMut(BatchProgress),
    {
        let mut batch = GenerationBatch::new(request);
        batch.transition(BatchStatus::Running)?;

        info!(
            batch_id = %batch.id,
            platform = %batch.request.platform,
            app_type = %batch.request.app_type,
            quantity = batch.request.quantity,
            max_attempts = self.limits.max_attempts,
            "batch started"
        );

        let started = Instant::now();
        let mut last_emit = Instant::now();

        let reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if batch.accepted() >= batch.request.quantity {
                break StopReason::QuantityReached;
            }
            // checked before counting, so a batch may run exactly max_attempts attempts
            if batch.attempts >= self.limits.max_attempts {
                break StopReason::AttemptBudgetExhausted;
            }

            batch.attempts += 1;
            match self.attempt(&mut batch, rng) {
                Ok(()) => batch.record_success(),
                Err(error) => {
                    trace!(batch_id = %batch.id, attempt = batch.attempts, %error, "attempt rejected");
                    batch.record_failure(&error);
                    if batch.consecutive_failures >= self.limits.max_consecutive_failures {
                        break StopReason::ConsecutiveFailureCeiling;
                    }
                }
            }

            if batch.accepted() >= batch.request.quantity {
                break StopReason::QuantityReached;
            }

            if last_emit.elapsed() >= self.limits.progress_interval {
                on_progress(batch.progress());
                last_emit = Instant::now();
            }

            if batch.attempts % self.limits.yield_every == 0 {
                tokio::task::yield_now().await;
            }
        };

        if reason != StopReason::Cancelled {
            on_progress(batch.progress());
        }

        let outcome = batch.finish(reason, started.elapsed())?;
        match outcome.status {
            BatchStatus::Completed | BatchStatus::Cancelled => info!(
                batch_id = %outcome.batch_id,
                status = %outcome.status,
                accepted = outcome.accepted(),
                attempts = outcome.attempts,
                elapsed_ms = outcome.elapsed_ms,
                "batch finished"
            ),
            _ => warn!(
                batch_id = %outcome.batch_id,
                status = %outcome.status,
                accepted = outcome.accepted(),
                shortfall = outcome.shortfall(),
                attempts = outcome.attempts,
                reason = %outcome.stop_reason,
                configuration_missing = outcome.failures.configuration_missing,
                exhausted = outcome.failures.exhausted,
                duplicates = outcome.failures.duplicates,
                last_error = outcome.failures.last_error.as_deref().unwrap_or("-"),
                "batch stopped short"
            ),
        }

        Ok(outcome)
    }
}
