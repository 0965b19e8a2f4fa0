//! End-to-end batch generation over the bundled catalog.

mod common;

use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

use common::{bundled_catalog, bundled_engine, engine_for, fast_config, setup_test_logging};
use uaforge::domain::models::{
    AppType, BatchStatus, GenerationConfig, GenerationRequest, Platform, StopReason,
};
use uaforge::DomainError;

/// Batch sizes well under the number of distinct agents the bundled catalog
/// can express for each grammar.
fn distinct_capacity_floor(platform: Platform, app_type: AppType) -> usize {
    match (platform, app_type) {
        // one agent per OS version
        (Platform::Ios, AppType::Browser) => 8,
        // device x build number x browser version
        (Platform::Android, AppType::Browser) => 40,
        _ => 200,
    }
}

#[tokio::test]
async fn test_every_combination_yields_distinct_agents() {
    setup_test_logging();
    let engine = bundled_engine();

    for platform in Platform::ALL {
        for app_type in AppType::ALL {
            let quantity = distinct_capacity_floor(platform, app_type);
            let request = GenerationRequest::new(platform, app_type, quantity).with_seed(11);
            let outcome = engine
                .generate(request, &CancellationToken::new(), |_| {})
                .await
                .unwrap();

            assert_eq!(outcome.status, BatchStatus::Completed, "{platform}/{app_type}");
            assert_eq!(outcome.agents.len(), quantity);
            let unique: HashSet<_> = outcome.agents.iter().collect();
            assert_eq!(unique.len(), quantity, "{platform}/{app_type} produced duplicates");
            assert!(outcome.agents.iter().all(|agent| !agent.contains('{')));
        }
    }
}

#[tokio::test]
async fn test_same_seed_same_batch() {
    let engine = bundled_engine();
    let request = GenerationRequest::new(Platform::Ios, AppType::MessagingAppB, 25).with_seed(99);

    let first = engine
        .generate(request.clone(), &CancellationToken::new(), |_| {})
        .await
        .unwrap();
    let second = engine
        .generate(request, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(first.agents, second.agents);
    assert_ne!(first.batch_id, second.batch_id);
}

#[tokio::test]
async fn test_pinned_device_appears_in_every_agent() {
    let engine = bundled_engine();
    let catalog = bundled_catalog();
    let model = catalog.android.device_models[0].model.clone();

    let request = GenerationRequest::new(Platform::Android, AppType::MessagingAppA, 20)
        .with_device(model.clone())
        .with_seed(3);
    let outcome = engine
        .generate(request, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.status, BatchStatus::Completed);
    assert!(outcome.agents.iter().all(|agent| agent.contains(&model)));
}

#[tokio::test]
async fn test_unknown_pinned_device_fails_batch() {
    let engine = bundled_engine();
    let request = GenerationRequest::new(Platform::Android, AppType::Browser, 5).with_device("No-Such-Model");

    let outcome = engine
        .generate(request, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.status, BatchStatus::Failed);
    assert!(outcome.agents.is_empty());
}

#[tokio::test]
async fn test_cancel_mid_batch_discards_results() {
    let engine = bundled_engine();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let request = GenerationRequest::new(Platform::Android, AppType::MessagingAppA, 1_000).with_seed(5);
    let outcome = engine
        .generate(request, &cancel, move |progress| {
            if progress.accepted >= 10 {
                trigger.cancel();
            }
        })
        .await
        .unwrap();

    assert_eq!(outcome.status, BatchStatus::Cancelled);
    assert_eq!(outcome.stop_reason, StopReason::Cancelled);
    assert!(outcome.agents.is_empty());
    assert!(outcome.attempts >= 10);
    assert!(outcome.attempts < 1_000);
}

#[tokio::test]
async fn test_missing_build_numbers_hits_failure_ceiling() {
    let mut catalog = bundled_catalog();
    catalog.android.build_numbers.clear();
    let engine = engine_for(catalog, fast_config());

    let request = GenerationRequest::new(Platform::Android, AppType::Browser, 10);
    let outcome = engine
        .generate(request, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.status, BatchStatus::Failed);
    assert_eq!(outcome.stop_reason, StopReason::ConsecutiveFailureCeiling);
    assert_eq!(outcome.attempts, 500);
    assert!(outcome.failures.only_configuration_missing());
}

#[tokio::test]
async fn test_small_budget_gives_partial_batch() {
    // a single device and OS version leave one possible browser agent
    let mut catalog = bundled_catalog();
    catalog.ios.device_models.truncate(1);
    catalog.ios.device_models[0].min_os_version = None;
    catalog.ios.device_models[0].max_os_version = None;
    catalog.ios.os_versions.truncate(1);
    let config = GenerationConfig {
        min_attempts: 50,
        attempt_multiplier: 1,
        max_consecutive_failures: 10_000,
        ..fast_config()
    };
    let engine = engine_for(catalog, config);

    let request = GenerationRequest::new(Platform::Ios, AppType::Browser, 5).with_seed(1);
    let outcome = engine
        .generate(request, &CancellationToken::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.status, BatchStatus::PartiallyCompleted);
    assert_eq!(outcome.stop_reason, StopReason::AttemptBudgetExhausted);
    assert_eq!(outcome.attempts, 50);
    assert_eq!(outcome.agents.len(), 1);
    assert_eq!(outcome.failures.duplicates, 49);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_reaches_target() {
    let engine = bundled_engine();
    let mut events = Vec::new();

    let request = GenerationRequest::new(Platform::Ios, AppType::MessagingAppA, 40).with_seed(8);
    engine
        .generate(request, &CancellationToken::new(), |progress| events.push(progress))
        .await
        .unwrap();

    assert!(!events.is_empty());
    assert!(events.windows(2).all(|w| w[0].accepted <= w[1].accepted));
    let last = events.last().unwrap();
    assert_eq!(last.accepted, 40);
    assert!((last.percent - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_zero_quantity_rejected() {
    let engine = bundled_engine();
    let request = GenerationRequest::new(Platform::Android, AppType::Browser, 0);
    let result = engine.generate(request, &CancellationToken::new(), |_| {}).await;
    assert!(matches!(result, Err(DomainError::ValidationFailed(_))));
}
