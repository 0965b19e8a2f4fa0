//! Agent composers: one strategy per (platform, app type).
//!
//! A composer first draws a consistent set of field values from the pools
//! ([`Composer::draw`]) and then interpolates them into its fixed template
//! ([`Composer::render`]). Rendering is pure, so the same fields always give
//! the same string.

pub mod android;
pub mod fields;
pub mod ios;

use rand::{Rng, RngCore};
use std::collections::HashMap;

use crate::domain::errors::GenerationError;
use crate::domain::models::{AppType, ComponentPools, DeviceModel, DeviceSelector, Platform};

pub use android::{AndroidBrowser, AndroidMessagingA, AndroidMessagingB};
pub use ios::{IosBrowser, IosMessagingA, IosMessagingB};

/// Trailing digits replaced by [`randomize_identifier`].
pub const RANDOMIZED_DIGITS: usize = 5;

/// Major OS version to API level. Ordered oldest first.
const API_LEVELS: &[(&str, u32)] = &[
    ("9", 28),
    ("10", 29),
    ("11", 30),
    ("12", 31),
    ("13", 33),
    ("14", 34),
    ("15", 35),
];

/// Resolved values for one candidate agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentFields {
    pub device: DeviceModel,
    pub os_version: String,
    pub build_number: Option<String>,
    pub app_version: Option<String>,
    /// Stable-prefix randomized build identifier
    pub version_code: Option<String>,
    pub browser_version: Option<String>,
    pub locale: Option<String>,
    pub resolution: Option<String>,
    pub dpi: Option<String>,
    /// Browser-in-app: emit the optional suffix token
    pub in_app_suffix: bool,
    /// Browser-in-app: only meaningful when `in_app_suffix` is false
    pub release_variant: Option<u64>,
}

impl AgentFields {
    pub fn new(device: DeviceModel, os_version: impl Into<String>) -> Self {
        Self {
            device,
            os_version: os_version.into(),
            build_number: None,
            app_version: None,
            version_code: None,
            browser_version: None,
            locale: None,
            resolution: None,
            dpi: None,
            in_app_suffix: false,
            release_variant: None,
        }
    }
}

/// Strategy for one (platform, app type) agent grammar.
pub trait Composer: Send + Sync {
    fn platform(&self) -> Platform;

    fn app_type(&self) -> AppType;

    /// Draw field values for one attempt.
    fn draw(
        &self,
        pools: &ComponentPools,
        selector: &DeviceSelector,
        rng: &mut dyn RngCore,
    ) -> Result<AgentFields, GenerationError>;

    /// Interpolate fields into the template.
    fn render(&self, fields: &AgentFields) -> Result<String, GenerationError>;

    fn compose(
        &self,
        pools: &ComponentPools,
        selector: &DeviceSelector,
        rng: &mut dyn RngCore,
    ) -> Result<String, GenerationError> {
        let fields = self.draw(pools, selector, rng)?;
        self.render(&fields)
    }
}

/// Strategy table keyed by (platform, app type).
pub struct ComposerRegistry {
    composers: HashMap<(Platform, AppType), Box<dyn Composer>>,
}

impl ComposerRegistry {
    pub fn empty() -> Self {
        Self {
            composers: HashMap::new(),
        }
    }

    /// Registry with every built-in grammar.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(AndroidBrowser));
        registry.register(Box::new(AndroidMessagingA));
        registry.register(Box::new(AndroidMessagingB));
        registry.register(Box::new(IosBrowser));
        registry.register(Box::new(IosMessagingA));
        registry.register(Box::new(IosMessagingB));
        registry
    }

    /// Add or replace the composer for its (platform, app type).
    pub fn register(&mut self, composer: Box<dyn Composer>) {
        self.composers
            .insert((composer.platform(), composer.app_type()), composer);
    }

    pub fn get(&self, platform: Platform, app_type: AppType) -> Option<&dyn Composer> {
        self.composers.get(&(platform, app_type)).map(|c| &**c)
    }

    pub fn supported(&self) -> Vec<(Platform, AppType)> {
        let mut keys: Vec<_> = self.composers.keys().copied().collect();
        keys.sort();
        keys
    }
}

impl Default for ComposerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Keep all but the last five digits of `base` and replace those with a fresh
/// zero-padded random value, so identifiers stay in family with real ones.
pub fn randomize_identifier<R: Rng + ?Sized>(base: &str, rng: &mut R) -> String {
    let len = base.chars().count();
    let prefix: String = base.chars().take(len.saturating_sub(RANDOMIZED_DIGITS)).collect();
    let suffix: u32 = rng.gen_range(0..100_000);
    format!("{prefix}{suffix:05}")
}

/// API level for an Android OS version; unknown versions map to the newest level.
pub fn api_level(os_version: &str) -> u32 {
    let normalized = crate::services::compatibility::normalize_version(os_version);
    let major = normalized.split('.').next().unwrap_or_default();
    API_LEVELS
        .iter()
        .find(|(version, _)| *version == major)
        .or_else(|| API_LEVELS.last())
        .map_or(0, |(_, level)| *level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_randomize_identifier_keeps_prefix() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            let id = randomize_identifier("312001103", &mut rng);
            assert_eq!(id.len(), 9);
            assert!(id.starts_with("3120"), "prefix changed: {id}");
            assert!(id[4..].chars().all(|c| c.is_ascii_digit()));
            seen.insert(id);
        }
        assert!(seen.len() > 900, "trailing digits barely varied");
    }

    #[test]
    fn test_randomize_identifier_short_base() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let id = randomize_identifier("123", &mut rng);
        assert_eq!(id.len(), RANDOMIZED_DIGITS);
    }

    #[test]
    fn test_api_level_table() {
        assert_eq!(api_level("13"), 33);
        assert_eq!(api_level("Android 12"), 31);
        assert_eq!(api_level("9"), 28);
        assert_eq!(api_level("14.0"), 34);
        assert_eq!(api_level("99"), 35);
        assert_eq!(api_level(""), 35);
    }

    #[test]
    fn test_standard_registry_covers_all_combinations() {
        let registry = ComposerRegistry::standard();
        for platform in Platform::ALL {
            for app_type in AppType::ALL {
                let composer = registry.get(platform, app_type).expect("missing composer");
                assert_eq!(composer.platform(), platform);
                assert_eq!(composer.app_type(), app_type);
            }
        }
        assert_eq!(registry.supported().len(), 6);
    }
}
