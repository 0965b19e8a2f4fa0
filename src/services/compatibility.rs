//! Compatibility resolution between anchor versions and dependent pools.
//!
//! Build numbers are narrowed against a device's anchor OS version through a
//! fallback ladder; the first non-empty step wins:
//!
//! 1. exact match on the normalized version
//! 2. numeric distance within [`VERSION_TOLERANCE`]
//! 3. any entry not explicitly marked inactive
//! 4. the whole pool
//!
//! iOS devices declare a supported OS range instead; candidates are filtered to
//! that range with the same tolerance as a second step.

use std::cmp::Ordering;

use crate::domain::errors::GenerationError;
use crate::domain::models::{BuildNumberEntry, DeviceModel};

/// Maximum absolute difference accepted by the numeric fallback.
pub const VERSION_TOLERANCE: f64 = 2.0;

/// Ladder step that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    Exact,
    Tolerance,
    AnyActive,
    Unfiltered,
}

/// Non-empty set of compatible build numbers and the step that found them.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    pub entries: Vec<&'a BuildNumberEntry>,
    pub step: ResolutionStep,
}

/// Strip everything but digits and dots. `_` separators count as dots.
///
/// `"Android 13"` becomes `"13"`, `"17_1_2"` becomes `"17.1.2"`.
pub fn normalize_version(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c == '_' { '.' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.trim_matches('.').to_string()
}

/// `major.minor` as a float, for distance checks.
pub fn version_number(raw: &str) -> Option<f64> {
    let normalized = normalize_version(raw);
    let mut parts = normalized.split('.').filter(|p| !p.is_empty());
    let major = parts.next()?;
    match parts.next() {
        Some(minor) => format!("{major}.{minor}").parse().ok(),
        None => major.parse().ok(),
    }
}

/// Component-wise ordering of two versions; missing components count as zero.
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    let parse = |raw: &str| -> Option<Vec<u32>> {
        let normalized = normalize_version(raw);
        if normalized.is_empty() {
            return None;
        }
        normalized
            .split('.')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse().ok())
            .collect()
    };
    let (a, b) = (parse(a)?, parse(b)?);
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    Some(Ordering::Equal)
}

/// Whether two versions lie within [`VERSION_TOLERANCE`] of each other.
pub fn within_tolerance(a: &str, b: &str) -> bool {
    match (version_number(a), version_number(b)) {
        (Some(x), Some(y)) => (x - y).abs() <= VERSION_TOLERANCE,
        _ => false,
    }
}

/// Narrow `pool` to build numbers compatible with `anchor`.
pub fn resolve_build_numbers<'a>(
    anchor: &str,
    pool: &'a [BuildNumberEntry],
) -> Result<Resolution<'a>, GenerationError> {
    let normalized = normalize_version(anchor);

    let exact: Vec<_> = pool
        .iter()
        .filter(|e| !normalized.is_empty() && normalize_version(&e.os_version) == normalized)
        .collect();
    if !exact.is_empty() {
        return Ok(Resolution { entries: exact, step: ResolutionStep::Exact });
    }

    let near: Vec<_> = pool
        .iter()
        .filter(|e| within_tolerance(anchor, &e.os_version))
        .collect();
    if !near.is_empty() {
        return Ok(Resolution { entries: near, step: ResolutionStep::Tolerance });
    }

    let active: Vec<_> = pool.iter().filter(|e| e.is_active()).collect();
    if !active.is_empty() {
        return Ok(Resolution { entries: active, step: ResolutionStep::AnyActive });
    }

    if pool.is_empty() {
        return Err(GenerationError::exhausted("build_numbers"));
    }
    Ok(Resolution {
        entries: pool.iter().collect(),
        step: ResolutionStep::Unfiltered,
    })
}

/// OS versions a device can run, from its declared `[min, max]` range.
///
/// Step 1 keeps candidates inside the inclusive range. Step 2 accepts
/// candidates within tolerance of either bound. A device with no range accepts
/// every candidate. An empty result is `Exhausted`; the caller re-rolls the
/// device on its next attempt.
pub fn resolve_os_range<'a>(
    device: &DeviceModel,
    candidates: &'a [String],
) -> Result<Vec<&'a String>, GenerationError> {
    if candidates.is_empty() {
        return Err(GenerationError::exhausted("os_versions"));
    }

    let min = device.min_os_version.as_deref();
    let max = device.max_os_version.as_deref();
    if min.is_none() && max.is_none() {
        return Ok(candidates.iter().collect());
    }

    let in_range: Vec<_> = candidates
        .iter()
        .filter(|v| {
            let above_min = min.map_or(true, |m| {
                matches!(compare_versions(v, m), Some(Ordering::Greater | Ordering::Equal))
            });
            let below_max = max.map_or(true, |m| {
                matches!(compare_versions(v, m), Some(Ordering::Less | Ordering::Equal))
            });
            above_min && below_max
        })
        .collect();
    if !in_range.is_empty() {
        return Ok(in_range);
    }

    let near: Vec<_> = candidates
        .iter()
        .filter(|v| {
            min.is_some_and(|m| within_tolerance(v, m)) || max.is_some_and(|m| within_tolerance(v, m))
        })
        .collect();
    if !near.is_empty() {
        return Ok(near);
    }

    Err(GenerationError::exhausted(format!("os_versions for {}", device.model)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(versions: &[&str]) -> Vec<BuildNumberEntry> {
        versions
            .iter()
            .enumerate()
            .map(|(i, v)| BuildNumberEntry::new(*v, format!("BUILD.{i}")))
            .collect()
    }

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("Android 13"), "13");
        assert_eq!(normalize_version("13"), "13");
        assert_eq!(normalize_version("17_1_2"), "17.1.2");
        assert_eq!(normalize_version("iOS 16.4"), "16.4");
        assert_eq!(normalize_version("beta"), "");
    }

    #[test]
    fn test_version_number_uses_major_minor() {
        assert_eq!(version_number("17.1.2"), Some(17.1));
        assert_eq!(version_number("Android 13"), Some(13.0));
        assert_eq!(version_number("none"), None);
    }

    #[test]
    fn test_exact_match_ignores_prefix() {
        let entries = pool(&["Android 13", "Android 12", "13"]);
        let resolution = resolve_build_numbers("13", &entries).unwrap();
        assert_eq!(resolution.step, ResolutionStep::Exact);
        assert_eq!(resolution.entries.len(), 2);
    }

    #[test]
    fn test_tolerance_accepts_both_neighbours_at_distance_two() {
        let entries = pool(&["11", "15"]);
        let resolution = resolve_build_numbers("13", &entries).unwrap();
        assert_eq!(resolution.step, ResolutionStep::Tolerance);
        let versions: Vec<&str> = resolution.entries.iter().map(|e| e.os_version.as_str()).collect();
        assert_eq!(versions, vec!["11", "15"]);
    }

    #[test]
    fn test_tolerance_boundary_two_accepted_three_rejected() {
        assert!(within_tolerance("13", "15"));
        assert!(within_tolerance("13", "11"));
        assert!(!within_tolerance("13", "16"));
        assert!(!within_tolerance("13", "10"));

        let entries = pool(&["10", "15", "16"]);
        let resolution = resolve_build_numbers("13", &entries).unwrap();
        assert_eq!(resolution.step, ResolutionStep::Tolerance);
        assert_eq!(resolution.entries.len(), 1);
        assert_eq!(resolution.entries[0].os_version, "15");
    }

    #[test]
    fn test_distance_three_falls_through_to_active() {
        let entries = vec![
            BuildNumberEntry::new("16", "A"),
            BuildNumberEntry::new("10", "B").inactive(),
        ];
        let resolution = resolve_build_numbers("13", &entries).unwrap();
        assert_eq!(resolution.step, ResolutionStep::AnyActive);
        assert_eq!(resolution.entries.len(), 1);
        assert_eq!(resolution.entries[0].build, "A");
    }

    #[test]
    fn test_all_inactive_returns_unfiltered_pool() {
        let entries = vec![
            BuildNumberEntry::new("8", "A").inactive(),
            BuildNumberEntry::new("9", "B").inactive(),
        ];
        let resolution = resolve_build_numbers("14", &entries).unwrap();
        assert_eq!(resolution.step, ResolutionStep::Unfiltered);
        assert_eq!(resolution.entries.len(), 2);
    }

    #[test]
    fn test_empty_pool_is_exhausted() {
        let result = resolve_build_numbers("13", &[]);
        assert_eq!(result, Err(GenerationError::exhausted("build_numbers")));
    }

    #[test]
    fn test_os_range_inclusive() {
        let device = DeviceModel::new("iPhone14,5", "Apple").with_os_range("15.0", "16.4");
        let candidates: Vec<String> = ["14.8", "15.0", "15.7.1", "16.4", "16.5", "17.0"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let result: Vec<&str> = resolve_os_range(&device, &candidates)
            .unwrap()
            .into_iter()
            .map(String::as_str)
            .collect();
        assert_eq!(result, vec!["15.0", "15.7.1", "16.4"]);
    }

    #[test]
    fn test_os_range_tolerance_fallback() {
        let device = DeviceModel::new("iPhone9,1", "Apple").with_os_range("10.0", "12.5");
        let candidates = vec!["14.0".to_string(), "17.0".to_string()];
        let result = resolve_os_range(&device, &candidates).unwrap();
        assert_eq!(result, vec![&candidates[0]]);
    }

    #[test]
    fn test_os_range_exhausted() {
        let device = DeviceModel::new("iPhone6,1", "Apple").with_os_range("7.0", "9.3");
        let candidates = vec!["16.0".to_string(), "17.0".to_string()];
        assert!(matches!(
            resolve_os_range(&device, &candidates),
            Err(GenerationError::Exhausted(_))
        ));
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("16.4", "16.4.0"), Some(Ordering::Equal));
        assert_eq!(compare_versions("16.10", "16.9"), Some(Ordering::Greater));
        assert_eq!(compare_versions("iOS 15", "16"), Some(Ordering::Less));
        assert_eq!(compare_versions("x", "16"), None);
    }
}
