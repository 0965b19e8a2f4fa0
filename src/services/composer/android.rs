//! Android agent grammars.

use rand::RngCore;

use super::fields::{
    draw_anchor_os_version, draw_build_number, draw_device, draw_dpi, draw_locale,
    draw_resolution, draw_version, draw_version_code, require,
};
use super::{api_level, AgentFields, Composer};
use crate::domain::errors::GenerationError;
use crate::domain::models::{AppType, ComponentPools, DeviceSelector, Platform};

/// Mobile Chrome on Android.
///
/// `Mozilla/5.0 (Linux; Android {os}; {model} Build/{build}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{chrome} Mobile Safari/537.36`
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidBrowser;

impl Composer for AndroidBrowser {
    fn platform(&self) -> Platform {
        Platform::Android
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
        let os_version = draw_anchor_os_version(pools, device, rng)?;
        let build = draw_build_number(pools, device, &os_version, rng)?;
        let chrome = draw_version(pools, AppType::Browser, rng)?;

        let mut fields = AgentFields::new(device.clone(), os_version);
        fields.build_number = Some(build);
        fields.browser_version = Some(chrome.version.clone());
        Ok(fields)
    }

    fn render(&self, fields: &AgentFields) -> Result<String, GenerationError> {
        let build = require(fields.build_number.as_ref(), "build_number")?;
        let chrome = require(fields.browser_version.as_ref(), "browser_version")?;
        Ok(format!(
            "Mozilla/5.0 (Linux; Android {os}; {model} Build/{build}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{chrome} Mobile Safari/537.36",
            os = fields.os_version,
            model = fields.device.model,
        ))
    }
}

/// Native messaging app A on Android. Chipset and device code are mandatory.
///
/// `Instagram {version} Android ({api}/{os}; {dpi}dpi; {resolution}; {manufacturer}; {model}; {device_code}; {chipset}; {locale}; {version_code})`
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidMessagingA;

impl Composer for AndroidMessagingA {
    fn platform(&self) -> Platform {
        Platform::Android
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
        require(device.chipset.as_ref(), "chipset")?;
        require(device.device_code.as_ref(), "device_code")?;

        let os_version = draw_anchor_os_version(pools, device, rng)?;
        let version = draw_version(pools, AppType::MessagingAppA, rng)?;
        let version_code = draw_version_code(version, rng)?;
        let locale = draw_locale(pools, rng)?;
        let resolution = draw_resolution(pools, device, rng)?;
        let dpi = draw_dpi(pools, device, rng)?;

        let mut fields = AgentFields::new(device.clone(), os_version);
        fields.app_version = Some(version.version.clone());
        fields.version_code = Some(version_code);
        fields.locale = Some(locale);
        fields.resolution = Some(resolution);
        fields.dpi = Some(dpi);
        Ok(fields)
    }

    fn render(&self, fields: &AgentFields) -> Result<String, GenerationError> {
        let device = &fields.device;
        let chipset = require(device.chipset.as_ref(), "chipset")?;
        let device_code = require(device.device_code.as_ref(), "device_code")?;
        let version = require(fields.app_version.as_ref(), "app_version")?;
        let version_code = require(fields.version_code.as_ref(), "version_code")?;
        let locale = require(fields.locale.as_ref(), "locale")?;
        let resolution = require(fields.resolution.as_ref(), "resolution")?;
        let dpi = require(fields.dpi.as_ref(), "dpi")?;

        Ok(format!(
            "Instagram {version} Android ({api}/{os}; {dpi}dpi; {resolution}; {manufacturer}; {model}; {device_code}; {chipset}; {locale}; {version_code})",
            api = api_level(&fields.os_version),
            os = fields.os_version,
            manufacturer = device.manufacturer,
            model = device.model,
        ))
    }
}

/// Messaging app B's in-app browser (Android webview).
///
/// `Mozilla/5.0 (Linux; Android {os}; {model} Build/{build}; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/{chrome} Mobile Safari/537.36 [FB_IAB/FB4A;FBAV/{version};]`
#[derive(Debug, Clone, Copy, Default)]
pub struct AndroidMessagingB;

impl Composer for AndroidMessagingB {
    fn platform(&self) -> Platform {
        Platform::Android
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
        let os_version = draw_anchor_os_version(pools, device, rng)?;
        let build = draw_build_number(pools, device, &os_version, rng)?;
        let chrome = draw_version(pools, AppType::Browser, rng)?;
        let version = draw_version(pools, AppType::MessagingAppB, rng)?;

        let mut fields = AgentFields::new(device.clone(), os_version);
        fields.build_number = Some(build);
        fields.browser_version = Some(chrome.version.clone());
        fields.app_version = Some(version.version.clone());
        Ok(fields)
    }

    fn render(&self, fields: &AgentFields) -> Result<String, GenerationError> {
        let build = require(fields.build_number.as_ref(), "build_number")?;
        let chrome = require(fields.browser_version.as_ref(), "browser_version")?;
        let version = require(fields.app_version.as_ref(), "app_version")?;
        Ok(format!(
            "Mozilla/5.0 (Linux; Android {os}; {model} Build/{build}; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/{chrome} Mobile Safari/537.36 [FB_IAB/FB4A;FBAV/{version};]",
            os = fields.os_version,
            model = fields.device.model,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{BuildNumberEntry, DeviceModel, LanguageWeightMap, VersionComponent};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn galaxy() -> DeviceModel {
        DeviceModel::new("SM-S911B", "samsung")
            .with_chipset("qcom")
            .with_device_code("dm1q")
            .with_os_version("13")
            .with_resolutions(["1080x2340"])
            .with_dpis(["480"])
    }

    fn golden_fields() -> AgentFields {
        let mut fields = AgentFields::new(galaxy(), "13");
        fields.build_number = Some("TP1A.220624.014".into());
        fields.browser_version = Some("120.0.6099.144".into());
        fields.app_version = Some("309.1.0.41.113".into());
        fields.version_code = Some("541612345".into());
        fields.locale = Some("en_US".into());
        fields.resolution = Some("1080x2340".into());
        fields.dpi = Some("480".into());
        fields
    }

    fn pools(app_type: AppType) -> ComponentPools {
        let mut pools = ComponentPools::empty(Platform::Android, app_type);
        pools.device_models = vec![galaxy()];
        pools.version_components = vec![
            VersionComponent::new(AppType::Browser, "120.0.6099.144", ""),
            VersionComponent::new(AppType::MessagingAppA, "309.1.0.41.113", "541635863"),
            VersionComponent::new(AppType::MessagingAppB, "445.0.0.34.118", "541635863"),
        ];
        pools.build_numbers = vec![BuildNumberEntry::new("Android 13", "TP1A.220624.014")];
        pools.language_weights = LanguageWeightMap::new().with("en_US", 100.0);
        pools
    }

    #[test]
    fn test_browser_golden() {
        let agent = AndroidBrowser.render(&golden_fields()).unwrap();
        assert_eq!(
            agent,
            "Mozilla/5.0 (Linux; Android 13; SM-S911B Build/TP1A.220624.014) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36"
        );
    }

    #[test]
    fn test_messaging_a_golden() {
        let agent = AndroidMessagingA.render(&golden_fields()).unwrap();
        assert_eq!(
            agent,
            "Instagram 309.1.0.41.113 Android (33/13; 480dpi; 1080x2340; samsung; SM-S911B; dm1q; qcom; en_US; 541612345)"
        );
    }

    #[test]
    fn test_messaging_b_golden() {
        let agent = AndroidMessagingB.render(&golden_fields()).unwrap();
        assert_eq!(
            agent,
            "Mozilla/5.0 (Linux; Android 13; SM-S911B Build/TP1A.220624.014; wv) AppleWebKit/537.36 (KHTML, like Gecko) Version/4.0 Chrome/120.0.6099.144 Mobile Safari/537.36 [FB_IAB/FB4A;FBAV/309.1.0.41.113;]"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let fields = golden_fields();
        assert_eq!(
            AndroidMessagingA.render(&fields).unwrap(),
            AndroidMessagingA.render(&fields.clone()).unwrap()
        );
    }

    #[test]
    fn test_messaging_a_requires_chipset() {
        let mut fields = golden_fields();
        fields.device.chipset = None;
        assert_eq!(
            AndroidMessagingA.render(&fields),
            Err(GenerationError::missing("chipset"))
        );

        let mut pools = pools(AppType::MessagingAppA);
        pools.device_models[0].device_code = None;
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(
            AndroidMessagingA.draw(&pools, &DeviceSelector::Random, &mut rng),
            Err(GenerationError::missing("device_code"))
        );
    }

    #[test]
    fn test_messaging_a_compose_keeps_version_code_family() {
        let pools = pools(AppType::MessagingAppA);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..100 {
            let agent = AndroidMessagingA
                .compose(&pools, &DeviceSelector::Random, &mut rng)
                .unwrap();
            assert!(agent.starts_with("Instagram 309.1.0.41.113 Android (33/13; 480dpi; 1080x2340; samsung; SM-S911B; dm1q; qcom; en_US; 5416"));
            assert!(agent.ends_with(')'));
        }
    }

    #[test]
    fn test_browser_compose_resolves_prefixed_anchor() {
        let pools = pools(AppType::Browser);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let agent = AndroidBrowser
            .compose(&pools, &DeviceSelector::Random, &mut rng)
            .unwrap();
        assert!(agent.contains("Build/TP1A.220624.014)"));
    }

    #[test]
    fn test_seeded_compose_is_reproducible() {
        let pools = pools(AppType::MessagingAppB);
        let mut a = ChaCha8Rng::seed_from_u64(77);
        let mut b = ChaCha8Rng::seed_from_u64(77);
        let first = AndroidMessagingB.compose(&pools, &DeviceSelector::Random, &mut a).unwrap();
        let second = AndroidMessagingB.compose(&pools, &DeviceSelector::Random, &mut b).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("[FB_IAB/FB4A;FBAV/445.0.0.34.118;]"));
    }
}
