//! Component pools: the versioned building blocks user agents are composed from.
//!
//! Pools are loaded once per session and never mutated while a batch runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::platform::{AppType, Platform};
use crate::domain::errors::{DomainError, DomainResult};

/// A concrete handset model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceModel {
    /// Model name as it appears in the agent (`SM-S911B`, `iPhone15,2`)
    pub model: String,
    pub manufacturer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chipset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_code: Option<String>,
    /// Anchor OS version the device ships with (Android)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// Lowest supported OS version (iOS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_os_version: Option<String>,
    /// Highest supported OS version (iOS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_os_version: Option<String>,
    #[serde(default)]
    pub resolutions: Vec<String>,
    /// Pixel densities: dpi on Android, scale factor on iOS
    #[serde(default)]
    pub dpis: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl DeviceModel {
    pub fn new(model: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            manufacturer: manufacturer.into(),
            chipset: None,
            device_code: None,
            os_version: None,
            min_os_version: None,
            max_os_version: None,
            resolutions: Vec::new(),
            dpis: Vec::new(),
            is_active: None,
        }
    }

    pub fn with_chipset(mut self, chipset: impl Into<String>) -> Self {
        self.chipset = Some(chipset.into());
        self
    }

    pub fn with_device_code(mut self, code: impl Into<String>) -> Self {
        self.device_code = Some(code.into());
        self
    }

    pub fn with_os_version(mut self, version: impl Into<String>) -> Self {
        self.os_version = Some(version.into());
        self
    }

    pub fn with_os_range(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.min_os_version = Some(min.into());
        self.max_os_version = Some(max.into());
        self
    }

    pub fn with_resolutions<I, S>(mut self, resolutions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolutions = resolutions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dpis<I, S>(mut self, dpis: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dpis = dpis.into_iter().map(Into::into).collect();
        self
    }

    /// Missing flag counts as active.
    pub fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}

/// One released version of an app (or of the embedded browser engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionComponent {
    pub app_type: AppType,
    pub version: String,
    /// Numeric build identifier; the base for stable-prefix randomization
    #[serde(default)]
    pub build: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_flag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl VersionComponent {
    pub fn new(app_type: AppType, version: impl Into<String>, build: impl Into<String>) -> Self {
        Self {
            app_type,
            version: version.into(),
            build: build.into(),
            variant_code: None,
            feature_flag: None,
            is_active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}

/// A firmware build string released for an OS version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildNumberEntry {
    /// Anchor OS version, possibly prefixed (`Android 13`)
    pub os_version: String,
    pub build: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl BuildNumberEntry {
    pub fn new(os_version: impl Into<String>, build: impl Into<String>) -> Self {
        Self {
            os_version: os_version.into(),
            build: build.into(),
            device: None,
            is_active: None,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = Some(false);
        self
    }

    /// Missing flag counts as active.
    pub fn is_active(&self) -> bool {
        self.is_active != Some(false)
    }
}

/// Locale tag to percentage. Iteration order is the key order, which keeps
/// seeded sampling reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageWeightMap(pub BTreeMap<String, f64>);

impl LanguageWeightMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locale: impl Into<String>, percentage: f64) -> Self {
        self.0.insert(locale.into(), percentage);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for LanguageWeightMap {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Version-component tags a composer for `app_type` draws from.
pub fn component_tags(app_type: AppType) -> &'static [AppType] {
    match app_type {
        AppType::Browser => &[AppType::Browser],
        AppType::MessagingAppA => &[AppType::MessagingAppA],
        // the in-app variant embeds a browser engine version too
        AppType::MessagingAppB => &[AppType::MessagingAppB, AppType::Browser],
    }
}

/// Everything one batch needs, for one (platform, app type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentPools {
    pub platform: Platform,
    pub app_type: AppType,
    pub device_models: Vec<DeviceModel>,
    pub version_components: Vec<VersionComponent>,
    pub build_numbers: Vec<BuildNumberEntry>,
    pub language_weights: LanguageWeightMap,
    pub resolutions: Vec<String>,
    pub dpis: Vec<String>,
    pub os_versions: Vec<String>,
}

impl ComponentPools {
    pub fn empty(platform: Platform, app_type: AppType) -> Self {
        Self {
            platform,
            app_type,
            device_models: Vec::new(),
            version_components: Vec::new(),
            build_numbers: Vec::new(),
            language_weights: LanguageWeightMap::new(),
            resolutions: Vec::new(),
            dpis: Vec::new(),
            os_versions: Vec::new(),
        }
    }

    /// Version components tagged with `app_type`.
    pub fn versions_for(&self, app_type: AppType) -> Vec<&VersionComponent> {
        self.version_components
            .iter()
            .filter(|v| v.app_type == app_type)
            .collect()
    }

    /// Reject a selection that has no active device to compose with.
    pub fn require_devices(self) -> DomainResult<Self> {
        if self.device_models.is_empty() {
            return Err(DomainError::ConfigurationMissing(format!(
                "device_models for {}/{}",
                self.platform, self.app_type
            )));
        }
        Ok(self)
    }

    pub fn find_device(&self, model: &str) -> Option<&DeviceModel> {
        self.device_models.iter().find(|d| d.model == model)
    }

    /// Resolutions a device supports, falling back to the platform-wide set.
    pub fn resolutions_for<'a>(&'a self, device: &'a DeviceModel) -> &'a [String] {
        if device.resolutions.is_empty() {
            &self.resolutions
        } else {
            &device.resolutions
        }
    }

    /// Densities a device supports, falling back to the platform-wide set.
    pub fn dpis_for<'a>(&'a self, device: &'a DeviceModel) -> &'a [String] {
        if device.dpis.is_empty() {
            &self.dpis
        } else {
            &device.dpis
        }
    }
}

/// Raw pool data for one platform, as stored in a catalog file or database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformPools {
    #[serde(default)]
    pub device_models: Vec<DeviceModel>,
    #[serde(default)]
    pub version_components: Vec<VersionComponent>,
    #[serde(default)]
    pub build_numbers: Vec<BuildNumberEntry>,
    #[serde(default)]
    pub language_weights: LanguageWeightMap,
    #[serde(default)]
    pub resolutions: Vec<String>,
    #[serde(default)]
    pub dpis: Vec<String>,
    #[serde(default)]
    pub os_versions: Vec<String>,
}

impl PlatformPools {
    /// Narrow to what a (platform, app type) batch needs.
    ///
    /// Inactive devices and versions are dropped here. Build numbers keep their
    /// flag because the resolver's fallback ladder reads it.
    pub fn select(&self, platform: Platform, app_type: AppType) -> ComponentPools {
        let tags = component_tags(app_type);
        ComponentPools {
            platform,
            app_type,
            device_models: self
                .device_models
                .iter()
                .filter(|d| d.is_active())
                .cloned()
                .collect(),
            version_components: self
                .version_components
                .iter()
                .filter(|v| v.is_active() && tags.contains(&v.app_type))
                .cloned()
                .collect(),
            build_numbers: self.build_numbers.clone(),
            language_weights: self.language_weights.clone(),
            resolutions: self.resolutions.clone(),
            dpis: self.dpis.clone(),
            os_versions: self.os_versions.clone(),
        }
    }
}

/// A full pool catalog keyed by platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolCatalog {
    #[serde(default)]
    pub android: PlatformPools,
    #[serde(default)]
    pub ios: PlatformPools,
}

impl PoolCatalog {
    pub fn platform(&self, platform: Platform) -> &PlatformPools {
        match platform {
            Platform::Android => &self.android,
            Platform::Ios => &self.ios,
        }
    }

    pub fn platform_mut(&mut self, platform: Platform) -> &mut PlatformPools {
        match platform {
            Platform::Android => &mut self.android,
            Platform::Ios => &mut self.ios,
        }
    }

    pub fn pools_for(&self, platform: Platform, app_type: AppType) -> ComponentPools {
        self.platform(platform).select(platform, app_type)
    }
}

/// Row counts of a catalog, for import reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub device_models: usize,
    pub version_components: usize,
    pub build_numbers: usize,
    pub language_weights: usize,
    pub resolutions: usize,
    pub dpis: usize,
    pub os_versions: usize,
}

impl CatalogSummary {
    pub fn total(&self) -> usize {
        self.device_models
            + self.version_components
            + self.build_numbers
            + self.language_weights
            + self.resolutions
            + self.dpis
            + self.os_versions
    }
}

impl std::ops::Add for CatalogSummary {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            device_models: self.device_models + other.device_models,
            version_components: self.version_components + other.version_components,
            build_numbers: self.build_numbers + other.build_numbers,
            language_weights: self.language_weights + other.language_weights,
            resolutions: self.resolutions + other.resolutions,
            dpis: self.dpis + other.dpis,
            os_versions: self.os_versions + other.os_versions,
        }
    }
}

impl PlatformPools {
    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            device_models: self.device_models.len(),
            version_components: self.version_components.len(),
            build_numbers: self.build_numbers.len(),
            language_weights: self.language_weights.len(),
            resolutions: self.resolutions.len(),
            dpis: self.dpis.len(),
            os_versions: self.os_versions.len(),
        }
    }

    /// Structural checks run before a catalog is stored.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(device) = self.device_models.iter().find(|d| d.model.trim().is_empty()) {
            return Err(format!("device with manufacturer '{}' has no model name", device.manufacturer));
        }
        if self.version_components.iter().any(|v| v.version.trim().is_empty()) {
            return Err("version component with empty version".to_string());
        }
        if self.build_numbers.iter().any(|b| b.build.trim().is_empty()) {
            return Err("build number entry with empty build".to_string());
        }
        if let Some((locale, _)) = self.language_weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(format!("language weight for '{locale}' is not a number"));
        }
        Ok(())
    }
}

impl PoolCatalog {
    pub fn summary(&self) -> CatalogSummary {
        self.android.summary() + self.ios.summary()
    }

    pub fn validate(&self) -> Result<(), String> {
        for platform in Platform::ALL {
            self.platform(platform)
                .validate()
                .map_err(|e| format!("{platform}: {e}"))?;
        }
        Ok(())
    }
}
