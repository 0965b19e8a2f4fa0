//! iOS agent grammars.
//!
//! OS versions come from the platform pool filtered to each device's declared
//! range, so an iPhone is never paired with an OS it cannot run.

use rand::{Rng, RngCore};

use super::fields::{
    draw_device, draw_dpi, draw_locale, draw_ranged_os_version, draw_release_variant,
    draw_resolution, draw_version, draw_version_code, language_of, os_major_minor, os_underscored,
    require, scale_integer,
};
use super::{AgentFields, Composer};
use crate::domain::errors::GenerationError;
use crate::domain::models::{AppType, ComponentPools, DeviceSelector, Platform};

/// Mobile Safari on iPhone.
///
/// `Mozilla/5.0 (iPhone; CPU iPhone OS {os_underscored} like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{major.minor} Mobile/15E148 Safari/604.1`
#[derive(Debug, Clone, Copy, Default)]
pub struct IosBrowser;

impl Composer for IosBrowser {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    fn app_type(&self) -> AppType {
        AppType::Browser
    }

    fn draw(
        &self,
        pools: &ComponentPools,
        selector: &DeviceSelector,
        rng: &mut dyn RngCore,
    ) -> Result<AgentFields, GenerationError> {
        let device = draw_device(pools, selector, rng)?;
        let os_version = draw_ranged_os_version(pools, device, rng)?;
        Ok(AgentFields::new(device.clone(), os_version))
    }

    fn render(&self, fields: &AgentFields) -> Result<String, GenerationError> {
        if fields.os_version.trim().is_empty() {
            return Err(GenerationError::missing("os_version"));
        }
        Ok(format!(
            "Mozilla/5.0 (iPhone; CPU iPhone OS {os} like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{safari} Mobile/15E148 Safari/604.1",
            os = os_underscored(&fields.os_version),
            safari = os_major_minor(&fields.os_version),
        ))
    }
}

/// Native messaging app A on iPhone.
///
/// `Instagram {version} ({model}; iOS {os_}; {locale}; {language}; scale={scale}; {resolution}; {version_code})`
#[derive(Debug, Clone, Copy, Default)]
pub struct IosMessagingA;

impl Composer for IosMessagingA {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    fn app_type(&self) -> AppType {
        AppType::MessagingAppA
    }

    fn draw(
        &self,
        pools: &ComponentPools,
        selector: &DeviceSelector,
        rng: &mut dyn RngCore,
    ) -> Result<AgentFields, GenerationError> {
        let device = draw_device(pools, selector, rng)?;
        let os_version = draw_ranged_os_version(pools, device, rng)?;
        let version = draw_version(pools, AppType::MessagingAppA, rng)?;
        let version_code = draw_version_code(version, rng)?;
        let locale = draw_locale(pools, rng)?;
        let resolution = draw_resolution(pools, device, rng)?;
        let scale = draw_dpi(pools, device, rng)?;

        let mut fields = AgentFields::new(device.clone(), os_version);
        fields.app_version = Some(version.version.clone());
        fields.version_code = Some(version_code);
        fields.locale = Some(locale);
        fields.resolution = Some(resolution);
        fields.dpi = Some(scale);
        Ok(fields)
    }

    fn render(&self, fields: &AgentFields) -> Result<String, GenerationError> {
        let version = require(fields.app_version.as_ref(), "app_version")?;
        let version_code = require(fields.version_code.as_ref(), "version_code")?;
        let locale = require(fields.locale.as_ref(), "locale")?;
        let resolution = require(fields.resolution.as_ref(), "resolution")?;
        let scale = require(fields.dpi.as_ref(), "scale")?;

        Ok(format!(
            "Instagram {version} ({model}; iOS {os}; {locale}; {language}; scale={scale}; {resolution}; {version_code})",
            model = fields.device.model,
            os = os_underscored(&fields.os_version),
            language = language_of(locale),
        ))
    }
}

/// Messaging app B's in-app browser on iPhone.
///
/// Ends in either the `IABMV/1` suffix token or a `FBRV/{release_variant}`
/// field, never both.
#[derive(Debug, Clone, Copy, Default)]
pub struct IosMessagingB;

impl Composer for IosMessagingB {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    fn app_type(&self) -> AppType {
        AppType::MessagingAppB
    }

    fn draw(
        &self,
        pools: &ComponentPools,
        selector: &DeviceSelector,
        rng: &mut dyn RngCore,
    ) -> Result<AgentFields, GenerationError> {
        let device = draw_device(pools, selector, rng)?;
        let os_version = draw_ranged_os_version(pools, device, rng)?;
        let version = draw_version(pools, AppType::MessagingAppB, rng)?;
        let version_code = draw_version_code(version, rng)?;
        let locale = draw_locale(pools, rng)?;
        let scale = draw_dpi(pools, device, rng)?;
        let in_app_suffix = rng.gen_bool(0.5);

        let mut fields = AgentFields::new(device.clone(), os_version);
        fields.app_version = Some(version.version.clone());
        fields.version_code = Some(version_code);
        fields.locale = Some(locale);
        fields.dpi = Some(scale);
        fields.in_app_suffix = in_app_suffix;
        if !in_app_suffix {
            fields.release_variant = Some(draw_release_variant(rng));
        }
        Ok(fields)
    }

    fn render(&self, fields: &AgentFields) -> Result<String, GenerationError> {
        let version = require(fields.app_version.as_ref(), "app_version")?;
        let version_code = require(fields.version_code.as_ref(), "version_code")?;
        let locale = require(fields.locale.as_ref(), "locale")?;
        let scale = require(fields.dpi.as_ref(), "scale")?;

        let tail = if fields.in_app_suffix {
            "IABMV/1".to_string()
        } else {
            let variant = fields
                .release_variant
                .ok_or_else(|| GenerationError::missing("release_variant"))?;
            format!("FBRV/{variant}")
        };

        Ok(format!(
            "Mozilla/5.0 (iPhone; CPU iPhone OS {os_} like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148 [FBAN/FBIOS;FBAV/{version};FBBV/{version_code};FBDV/{model};FBMD/iPhone;FBSN/iOS;FBSV/{os};FBSS/{scale};FBID/phone;FBLC/{locale};FBOP/5;{tail}]",
            os_ = os_underscored(&fields.os_version),
            model = fields.device.model,
            os = fields.os_version,
            scale = scale_integer(scale),
        ))
    }
}
