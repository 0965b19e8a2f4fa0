//! Field-drawing helpers shared by the composers.
//!
//! Sub-pools that come from operator configuration (devices, versions,
//! weights, screen sets) report `ConfigurationMissing` when empty; only the
//! resolver ladders report `Exhausted`.

use rand::{Rng, RngCore};

use crate::domain::errors::GenerationError;
use crate::domain::models::{AppType, ComponentPools, DeviceModel, DeviceSelector, VersionComponent};
use crate::services::compatibility::{resolve_build_numbers, resolve_os_range};
use crate::services::selector::{pick_uniform, pick_weighted};

pub fn draw_device<'a>(
    pools: &'a ComponentPools,
    selector: &DeviceSelector,
    rng: &mut dyn RngCore,
) -> Result<&'a DeviceModel, GenerationError> {
    match selector {
        DeviceSelector::Random => pick_uniform(rng, &pools.device_models)
            .map_err(|_| GenerationError::missing("device_models")),
        DeviceSelector::Specific(model) => pools
            .find_device(model)
            .ok_or_else(|| GenerationError::missing(format!("device_model {model}"))),
    }
}

pub fn draw_version<'a>(
    pools: &'a ComponentPools,
    app_type: AppType,
    rng: &mut dyn RngCore,
) -> Result<&'a VersionComponent, GenerationError> {
    let versions = pools.versions_for(app_type);
    pick_uniform(rng, &versions)
        .copied()
        .map_err(|_| GenerationError::missing(format!("{app_type} versions")))
}

/// Device anchor version, or a platform-wide candidate when the device has none.
pub fn draw_anchor_os_version(
    pools: &ComponentPools,
    device: &DeviceModel,
    rng: &mut dyn RngCore,
) -> Result<String, GenerationError> {
    if let Some(version) = device.os_version.as_deref().filter(|v| !v.trim().is_empty()) {
        return Ok(version.to_string());
    }
    pick_uniform(rng, &pools.os_versions)
        .cloned()
        .map_err(|_| GenerationError::missing(format!("os_version for {}", device.model)))
}

/// OS version inside the device's supported range.
pub fn draw_ranged_os_version(
    pools: &ComponentPools,
    device: &DeviceModel,
    rng: &mut dyn RngCore,
) -> Result<String, GenerationError> {
    if pools.os_versions.is_empty() {
        return Err(GenerationError::missing("os_versions"));
    }
    let candidates = resolve_os_range(device, &pools.os_versions)?;
    pick_uniform(rng, &candidates)
        .map(|v| (*v).clone())
        .map_err(|_| GenerationError::exhausted("os_versions"))
}

/// Build number compatible with `anchor`, preferring entries owned by `device`.
pub fn draw_build_number(
    pools: &ComponentPools,
    device: &DeviceModel,
    anchor: &str,
    rng: &mut dyn RngCore,
) -> Result<String, GenerationError> {
    if pools.build_numbers.is_empty() {
        return Err(GenerationError::missing("build_numbers"));
    }

    let owned: Vec<_> = pools
        .build_numbers
        .iter()
        .filter(|e| e.device.as_deref().map_or(true, |d| d == device.model))
        .cloned()
        .collect();
    let pool = if owned.is_empty() { &pools.build_numbers } else { &owned };

    let resolution = resolve_build_numbers(anchor, pool)?;
    pick_uniform(rng, &resolution.entries)
        .map(|e| e.build.clone())
        .map_err(|_| GenerationError::exhausted("build_numbers"))
}

pub fn draw_locale(pools: &ComponentPools, rng: &mut dyn RngCore) -> Result<String, GenerationError> {
    pick_weighted(rng, pools.language_weights.iter())
        .map(ToString::to_string)
        .map_err(|_| GenerationError::missing("language_weights"))
}

pub fn draw_resolution(
    pools: &ComponentPools,
    device: &DeviceModel,
    rng: &mut dyn RngCore,
) -> Result<String, GenerationError> {
    pick_uniform(rng, pools.resolutions_for(device))
        .cloned()
        .map_err(|_| GenerationError::missing(format!("resolutions for {}", device.model)))
}

pub fn draw_dpi(
    pools: &ComponentPools,
    device: &DeviceModel,
    rng: &mut dyn RngCore,
) -> Result<String, GenerationError> {
    pick_uniform(rng, pools.dpis_for(device))
        .cloned()
        .map_err(|_| GenerationError::missing(format!("dpis for {}", device.model)))
}

/// Stable-prefix randomized build identifier of a version component.
pub fn draw_version_code(
    version: &VersionComponent,
    rng: &mut dyn RngCore,
) -> Result<String, GenerationError> {
    if version.build.trim().is_empty() {
        return Err(GenerationError::missing(format!(
            "build identifier for {} {}",
            version.app_type, version.version
        )));
    }
    Ok(super::randomize_identifier(version.build.trim(), rng))
}

/// Synthetic nine-digit release variant id.
pub fn draw_release_variant(rng: &mut dyn RngCore) -> u64 {
    rng.gen_range(100_000_000..1_000_000_000)
}

/// Read a mandatory field or report it as missing configuration.
pub fn require<'a>(value: Option<&'a String>, field: &str) -> Result<&'a str, GenerationError> {
    value
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GenerationError::missing(field))
}

/// `17.1.2` -> `17_1_2`
pub fn os_underscored(os_version: &str) -> String {
    os_version.trim().replace('.', "_")
}

/// `17` -> `17.0`, `17.1.2` -> `17.1`
pub fn os_major_minor(os_version: &str) -> String {
    let mut parts = os_version.trim().split('.');
    let major = parts.next().unwrap_or("0");
    let minor = parts.next().unwrap_or("0");
    format!("{major}.{minor}")
}

/// `en_US` -> `en`
pub fn language_of(locale: &str) -> &str {
    locale.split(['_', '-']).next().unwrap_or(locale)
}

/// `3.00` -> `3`
pub fn scale_integer(scale: &str) -> String {
    scale
        .trim()
        .parse::<f64>()
        .map_or_else(|_| scale.trim().to_string(), |s| format!("{}", s.round() as i64))
}
