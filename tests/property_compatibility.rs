use proptest::prelude::*;
use std::cmp::Ordering;
use uaforge::domain::models::{BuildNumberEntry, DeviceModel};
use uaforge::services::compatibility::{
    compare_versions, resolve_build_numbers, resolve_os_range, ResolutionStep,
};

fn version() -> impl Strategy<Value = String> {
    (10u32..20, 0u32..8, prop::option::of(0u32..10)).prop_map(|(major, minor, patch)| match patch {
        Some(patch) => format!("{major}.{minor}.{patch}"),
        None => format!("{major}.{minor}"),
    })
}

fn build_pool() -> impl Strategy<Value = Vec<BuildNumberEntry>> {
    prop::collection::vec(
        (10u32..16, any::<bool>()).prop_map(|(major, active)| {
            let entry = BuildNumberEntry::new(format!("Android {major}"), format!("B{major}"));
            if active { entry } else { entry.inactive() }
        }),
        0..12,
    )
}

proptest! {
    /// Property: resolution of a non-empty pool is never empty, and the
    /// exact step only returns entries matching the anchor
    #[test]
    fn prop_build_resolution_non_empty(anchor in 8u32..18, pool in build_pool()) {
        let anchor = anchor.to_string();
        match resolve_build_numbers(&anchor, &pool) {
            Ok(resolution) => {
                prop_assert!(!resolution.entries.is_empty());
                if resolution.step == ResolutionStep::Exact {
                    let expected = format!("Android {anchor}");
                    prop_assert!(resolution.entries.iter().all(|e| e.os_version == expected));
                }
            }
            Err(_) => prop_assert!(pool.is_empty()),
        }
    }

    /// Property: in-range OS candidates are always preferred over tolerance matches
    #[test]
    fn prop_os_range_prefers_in_range(
        candidates in prop::collection::vec(version(), 1..12),
        min in version(),
        max in version(),
    ) {
        let (min, max) = if compare_versions(&min, &max) == Some(Ordering::Greater) {
            (max, min)
        } else {
            (min, max)
        };
        let device = DeviceModel::new("iPhone15,2", "Apple").with_os_range(min.clone(), max.clone());
        let in_range: Vec<&String> = candidates
            .iter()
            .filter(|v| {
                compare_versions(v, &min) != Some(Ordering::Less)
                    && compare_versions(v, &max) != Some(Ordering::Greater)
            })
            .collect();

        if let Ok(resolved) = resolve_os_range(&device, &candidates) {
            if !in_range.is_empty() {
                prop_assert_eq!(resolved, in_range);
            }
        } else {
            prop_assert!(in_range.is_empty());
        }
    }

    /// Property: version comparison is antisymmetric
    #[test]
    fn prop_compare_antisymmetric(a in version(), b in version()) {
        let forward = compare_versions(&a, &b);
        let backward = compare_versions(&b, &a);
        prop_assert_eq!(forward.map(Ordering::reverse), backward);
    }
}
