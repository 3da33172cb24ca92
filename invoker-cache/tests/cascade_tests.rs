//! Integration tests for the cascade orchestrator
//!
//! Time is paused so timeouts and delays resolve instantly and
//! deterministically.

mod common;

use common::{as_sources, result_set, total_calls, viewer, Behavior, FakeSource};
use invoker_cache::{CascadeConfig, CascadeOrchestrator};
use std::time::Duration;

fn config(call_timeout_ms: u64, deadline_ms: Option<u64>) -> CascadeConfig {
    CascadeConfig {
        call_timeout: Duration::from_millis(call_timeout_ms),
        deadline: deadline_ms.map(Duration::from_millis),
    }
}

#[tokio::test(start_paused = true)]
async fn test_partial_failure_keeps_successes() {
    let fakes = vec![
        FakeSource::new("ModelA", Behavior::Delayed(Duration::from_millis(30), 11)),
        FakeSource::new("ModelB", Behavior::Fail),
        FakeSource::new("ModelC", Behavior::Value(33)),
        FakeSource::new("ModelD", Behavior::Hang),
        FakeSource::new("ModelE", Behavior::Delayed(Duration::from_millis(10), 55)),
    ];
    let cascade = CascadeOrchestrator::new(as_sources(&fakes), config(200, None)).unwrap();

    let results = cascade.run(&viewer("123")).await.unwrap();

    assert_eq!(
        results,
        result_set(&[("ModelA", 11), ("ModelC", 33), ("ModelE", 55)])
    );
    assert_eq!(total_calls(&fakes), 5);
}

#[tokio::test(start_paused = true)]
async fn test_all_sources_failing_yields_empty_set() {
    let fakes = vec![
        FakeSource::new("ModelA", Behavior::Fail),
        FakeSource::new("ModelB", Behavior::Hang),
        FakeSource::new("ModelC", Behavior::Fail),
    ];
    let cascade = CascadeOrchestrator::new(as_sources(&fakes), config(100, None)).unwrap();

    let results = cascade.run(&viewer("123")).await.unwrap();

    assert!(results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_calls_run_concurrently() {
    let fakes: Vec<_> = ["ModelA", "ModelB", "ModelC", "ModelD", "ModelE"]
        .iter()
        .map(|name| FakeSource::new(name, Behavior::Delayed(Duration::from_secs(1), 50)))
        .collect();
    let cascade = CascadeOrchestrator::new(as_sources(&fakes), config(5_000, None)).unwrap();

    let started = tokio::time::Instant::now();
    let results = cascade.run(&viewer("123")).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(results.len(), 5);
    assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_slow_source_times_out_alone() {
    let fakes = vec![
        FakeSource::new("ModelA", Behavior::Delayed(Duration::from_secs(10), 10)),
        FakeSource::new("ModelB", Behavior::Value(20)),
    ];
    let cascade = CascadeOrchestrator::new(as_sources(&fakes), config(1_000, None)).unwrap();

    let results = cascade.run(&viewer("123")).await.unwrap();

    assert_eq!(results, result_set(&[("ModelB", 20)]));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_returns_results_gathered_so_far() {
    let fakes = vec![
        FakeSource::new("ModelA", Behavior::Value(10)),
        FakeSource::new("ModelB", Behavior::Delayed(Duration::from_secs(30), 20)),
    ];
    let cascade =
        CascadeOrchestrator::new(as_sources(&fakes), config(60_000, Some(500))).unwrap();

    let started = tokio::time::Instant::now();
    let results = cascade.run(&viewer("123")).await.unwrap();

    assert_eq!(results, result_set(&[("ModelA", 10)]));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_mislabelled_result_is_discarded() {
    let fakes = vec![
        FakeSource::new("ModelA", Behavior::Mislabelled("ModelB")),
        FakeSource::new("ModelB", Behavior::Value(2)),
    ];
    let cascade = CascadeOrchestrator::new(as_sources(&fakes), config(100, None)).unwrap();

    let results = cascade.run(&viewer("123")).await.unwrap();

    assert_eq!(results, result_set(&[("ModelB", 2)]));
}

#[tokio::test]
async fn test_source_names_in_configured_order() {
    let fakes = vec![
        FakeSource::new("ModelA", Behavior::Value(1)),
        FakeSource::new("ModelB", Behavior::Value(2)),
    ];
    let cascade = CascadeOrchestrator::new(as_sources(&fakes), config(100, None)).unwrap();

    assert_eq!(cascade.source_names(), vec!["ModelA", "ModelB"]);
}
