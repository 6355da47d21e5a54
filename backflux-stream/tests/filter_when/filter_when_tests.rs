// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{Publisher, PublisherExt};
use backflux_stream::FilterWhenExt;
use backflux_test_utils::{
    delayed, delayed_empty, empty, iter, just, range, TestPublisherExt, TestSubscriber,
};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_filter_when_delayed_verdicts_keep_order() -> anyhow::Result<()> {
    // Arrange
    let evens = range(1, 10)
        .filter_when(|v: &i32| delayed(v % 2 == 0, Duration::from_millis(100)).boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    evens.subscribe(subscriber.as_subscriber());
    tokio::time::timeout(Duration::from_secs(5), subscriber.await_terminal()).await?;

    // Assert
    assert_eq!(subscriber.values(), vec![2, 4, 6, 8, 10]);
    assert!(subscriber.is_completed());
    assert!(subscriber.violations().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_filter_when_evaluates_one_element_at_a_time() -> anyhow::Result<()> {
    // Arrange
    let evens = range(1, 4)
        .filter_when(|v: &i32| delayed(v % 2 == 0, Duration::from_millis(100)).boxed());
    let subscriber = TestSubscriber::unbounded();
    let started = tokio::time::Instant::now();

    // Act
    evens.subscribe(subscriber.as_subscriber());
    subscriber.await_terminal().await;

    // Assert
    assert_eq!(subscriber.values(), vec![2, 4]);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(400), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(450), "elapsed {elapsed:?}");
    Ok(())
}

#[test]
fn test_filter_when_hidden_verdicts() {
    // Arrange
    let evens = range(1, 10).filter_when(|v: &i32| just(v % 2 == 0).hide().boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    evens.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.values(), vec![2, 4, 6, 8, 10]);
    assert!(subscriber.is_completed());
}

#[test]
fn test_filter_when_scalar_verdicts_over_fused_upstream() {
    // Arrange
    let evens = range(1, 10).filter_when(|v: &i32| just(v % 2 == 0).boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    evens.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.values(), vec![2, 4, 6, 8, 10]);
    assert!(subscriber.is_completed());
    let snapshot = subscriber.snapshot().expect("filter_when exposes a snapshot");
    assert!(snapshot.fused);
}

#[test]
fn test_filter_when_push_upstream_is_not_fused() {
    // Arrange
    let evens = range(1, 10)
        .hide()
        .filter_when(|v: &i32| just(v % 2 == 0).boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    evens.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.values(), vec![2, 4, 6, 8, 10]);
    let snapshot = subscriber.snapshot().expect("filter_when exposes a snapshot");
    assert!(!snapshot.fused);
}

#[test]
fn test_filter_when_empty_verdicts_filter_everything() {
    // Arrange
    let hidden = range(1, 10).filter_when(|_: &i32| empty::<bool>().hide().boxed());
    let scalar = range(1, 10).filter_when(|_: &i32| empty::<bool>().boxed());
    let hidden_subscriber = TestSubscriber::unbounded();
    let scalar_subscriber = TestSubscriber::unbounded();

    // Act
    hidden.subscribe(hidden_subscriber.as_subscriber());
    scalar.subscribe(scalar_subscriber.as_subscriber());

    // Assert
    assert!(hidden_subscriber.values().is_empty());
    assert!(hidden_subscriber.is_completed());
    assert!(scalar_subscriber.values().is_empty());
    assert!(scalar_subscriber.is_completed());
}

#[tokio::test(start_paused = true)]
async fn test_filter_when_delayed_empty_verdicts_filter_everything() -> anyhow::Result<()> {
    // Arrange
    let filtered = range(1, 5)
        .filter_when(|_: &i32| delayed_empty::<bool>(Duration::from_millis(10)).boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());
    subscriber.await_terminal().await;

    // Assert
    assert!(subscriber.values().is_empty());
    assert!(subscriber.is_completed());
    Ok(())
}

#[test]
fn test_filter_when_empty_upstream_completes() {
    // Arrange
    let filtered = empty::<i32>().filter_when(|_: &i32| just(true).boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert!(subscriber.values().is_empty());
    assert!(subscriber.is_completed());
}

#[test]
fn test_filter_when_empty_upstream_completes_without_demand() {
    // Arrange
    let filtered = empty::<i32>().filter_when(|_: &i32| just(true).boxed());
    let subscriber = TestSubscriber::new(0);

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert!(subscriber.is_completed());
}

#[test]
fn test_filter_when_backpressure_exactly_one() {
    // Arrange
    let filtered = iter([1]).filter_when(|_: &i32| just(true).boxed());
    let subscriber = TestSubscriber::new(1);

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.values(), vec![1]);
    assert!(subscriber.is_completed());
    assert!(subscriber.violations().is_empty());
}

#[test]
fn test_filter_when_never_exceeds_requested() {
    // Arrange
    let filtered = range(1, 20).filter_when(|_: &i32| just(true).hide().boxed());
    let subscriber = TestSubscriber::new(3);

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.values(), vec![1, 2, 3]);
    assert!(!subscriber.is_terminated());

    subscriber.request(2);
    assert_eq!(subscriber.values(), vec![1, 2, 3, 4, 5]);
    assert!(subscriber.violations().is_empty());
}

#[test]
fn test_filter_when_rejections_do_not_consume_demand() {
    // Arrange
    let filtered = range(1, 10).filter_when(|v: &i32| just(*v > 8).boxed());
    let subscriber = TestSubscriber::new(1);

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.values(), vec![9]);
    subscriber.request(1);
    assert_eq!(subscriber.values(), vec![9, 10]);
    assert!(subscriber.is_completed());
}

#[test]
fn test_filter_when_long_source_single_step_verdicts() {
    // Arrange
    let filtered = range(1, 1000).filter_when(|_: &i32| iter([true]).boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.value_count(), 1000);
    assert!(subscriber.is_completed());
}

#[test]
fn test_filter_when_long_source_hidden() {
    // Arrange
    let filtered = range(1, 1000)
        .hide()
        .filter_when(|_: &i32| just(true).hide().boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.values(), (1..=1000).collect::<Vec<_>>());
    assert!(subscriber.is_completed());
}

#[test]
fn test_filter_when_long_source_fused() {
    // Arrange
    let filtered = range(1, 1000).filter_when(|_: &i32| just(true).boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.value_count(), 1000);
    assert!(subscriber.is_completed());
}

#[test]
fn test_filter_when_only_first_verdict_value_counts() {
    // Arrange
    let rejected = range(1, 3).filter_when(|_: &i32| iter([false, true, true]).boxed());
    let passed = range(1, 3).filter_when(|_: &i32| iter([true, false, false]).boxed());
    let rejected_subscriber = TestSubscriber::unbounded();
    let passed_subscriber = TestSubscriber::unbounded();

    // Act
    rejected.subscribe(rejected_subscriber.as_subscriber());
    passed.subscribe(passed_subscriber.as_subscriber());

    // Assert
    assert!(rejected_subscriber.values().is_empty());
    assert!(rejected_subscriber.is_completed());
    assert_eq!(passed_subscriber.values(), vec![1, 2, 3]);
    assert!(passed_subscriber.is_completed());
}

#[test]
fn test_filter_when_is_cold() {
    // Arrange
    let evens = range(1, 6).filter_when(|v: &i32| just(v % 2 == 0).boxed());
    let first = TestSubscriber::unbounded();
    let second = TestSubscriber::new(1);

    // Act
    evens.subscribe(first.as_subscriber());
    evens.subscribe(second.as_subscriber());

    // Assert
    assert_eq!(first.values(), vec![2, 4, 6]);
    assert_eq!(second.values(), vec![2]);
    assert!(!second.is_terminated());
}
