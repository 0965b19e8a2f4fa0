//! Generation engine: the owned context a caller runs batches through.
//!
//! Holds the pool cache, the composer strategy table and the generation
//! budgets. Pools are loaded once per (platform, app type) before a batch
//! starts; the attempt loop itself never touches storage.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::adapters::cache::CachedPoolStore;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    BatchOutcome, BatchProgress, ComponentPools, DeviceSelector, GenerationConfig,
    GenerationRequest,
};
use crate::domain::ports::ComponentPoolStore;
use crate::services::batch_controller::{BatchController, ControllerLimits};
use crate::services::composer::ComposerRegistry;

pub struct GenerationEngine {
    pools: CachedPoolStore<dyn ComponentPoolStore>,
    registry: ComposerRegistry,
    config: GenerationConfig,
}

impl GenerationEngine {
    pub fn new(store: Arc<dyn ComponentPoolStore>, config: GenerationConfig) -> Self {
        Self {
            pools: CachedPoolStore::new(store),
            registry: ComposerRegistry::standard(),
            config,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ComposerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn registry(&self) -> &ComposerRegistry {
        &self.registry
    }

    /// Drop cached pools so the next batch reloads them.
    pub fn reload_pools(&self) {
        self.pools.invalidate_all();
    }

    /// Reject requests that can never run.
    pub fn validate(&self, request: &GenerationRequest) -> DomainResult<()> {
        if request.quantity == 0 || request.quantity > self.config.max_quantity {
            return Err(DomainError::ValidationFailed(format!(
                "quantity must be between 1 and {}, got {}",
                self.config.max_quantity, request.quantity
            )));
        }
        if let DeviceSelector::Specific(model) = &request.device {
            if model.trim().is_empty() {
                return Err(DomainError::ValidationFailed(
                    "device model cannot be empty".to_string(),
                ));
            }
        }
        if self.registry.get(request.platform, request.app_type).is_none() {
            return Err(DomainError::UnsupportedCombination {
                platform: request.platform.to_string(),
                app_type: request.app_type.to_string(),
            });
        }
        Ok(())
    }

    /// Pools the next batch for this selection would use.
    pub async fn pools(&self, request: &GenerationRequest) -> DomainResult<Arc<ComponentPools>> {
        self.pools.get(request.platform, request.app_type).await
    }

    /// Run one batch to a terminal state.
    pub async fn generate<F>(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> DomainResult<BatchOutcome>
    where
        F: FnMut(BatchProgress),
    {
        self.validate(&request)?;
        let composer = self
            .registry
            .get(request.platform, request.app_type)
            .ok_or_else(|| DomainError::UnsupportedCombination {
                platform: request.platform.to_string(),
                app_type: request.app_type.to_string(),
            })?;

        let pools = self.pools(&request).await?;
        let mut rng = match request.seed {
            Some(seed) => {
                debug!(seed, "seeded generation");
                ChaCha8Rng::seed_from_u64(seed)
            }
            None => ChaCha8Rng::from_entropy(),
        };

        let limits = ControllerLimits::for_quantity(&self.config, request.quantity);
        BatchController::new(composer, &pools, limits)
            .run(request, &mut rng, cancel, on_progress)
            .await
    }
}
