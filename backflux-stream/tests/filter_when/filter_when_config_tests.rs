// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{
    BackfluxError, EmptySubscription, ErrorHook, Publisher, PublisherExt, Subscriber,
    SubscriptionHandle, DEFAULT_PREFETCH,
};
use backflux_stream::{FilterWhenConfig, FilterWhenExt};
use backflux_test_utils::{
    create, just, range, RecordingErrorHook, RequestLog, TestError, TestPublisherExt,
    TestSubscriber,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn first_request_for(buffer_size: usize) -> anyhow::Result<Option<u64>> {
    let log = RequestLog::new();
    let filtered = range(1, 10)
        .record_requests(log.clone())
        .filter_when_buffered(|_: &i32| just(true).boxed(), buffer_size)?;
    let subscriber = TestSubscriber::new(0);
    filtered.subscribe(subscriber.as_subscriber());
    Ok(log.first())
}

#[test]
fn test_filter_when_requests_small_buffer_size() -> anyhow::Result<()> {
    // Arrange / Act
    let first = first_request_for(5)?;

    // Assert
    assert_eq!(first, Some(5));
    Ok(())
}

#[test]
fn test_filter_when_requests_large_buffer_sizes() -> anyhow::Result<()> {
    // Arrange / Act
    let power_of_two = first_request_for(65536)?;
    let odd = first_request_for(65537)?;

    // Assert
    assert_eq!(power_of_two, Some(65536));
    assert_eq!(odd, Some(65537));
    Ok(())
}

#[test]
fn test_filter_when_default_prefetch() -> anyhow::Result<()> {
    // Arrange
    let log = RequestLog::new();
    let filtered = range(1, 3)
        .record_requests(log.clone())
        .filter_when(|_: &i32| just(true).boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(filtered.config().prefetch().get(), DEFAULT_PREFETCH);
    assert_eq!(log.first(), Some(DEFAULT_PREFETCH as u64));
    assert_eq!(subscriber.values(), vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_filter_when_rejects_zero_buffer_size() {
    // Arrange / Act
    let result = range(1, 3).filter_when_buffered(|_: &i32| just(true).boxed(), 0);

    // Assert
    assert!(matches!(
        result.err(),
        Some(BackfluxError::InvalidConfiguration { .. })
    ));
    assert!(matches!(
        FilterWhenConfig::new(0),
        Err(BackfluxError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_filter_when_replenishes_after_prefetch_retired() -> anyhow::Result<()> {
    // Arrange
    let log = RequestLog::new();
    let filtered = range(1, 10)
        .record_requests(log.clone())
        .filter_when_buffered(|v: &i32| just(v % 2 == 0).boxed(), 3)?;
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.values(), vec![2, 4, 6, 8, 10]);
    assert_eq!(log.requests(), vec![3, 3, 3, 3]);
    Ok(())
}

#[test]
fn test_filter_when_replenishes_only_as_downstream_consumes() -> anyhow::Result<()> {
    // Arrange
    let log = RequestLog::new();
    let filtered = range(1, 10)
        .record_requests(log.clone())
        .filter_when_buffered(|_: &i32| just(true).boxed(), 3)?;
    let subscriber = TestSubscriber::new(0);
    filtered.subscribe(subscriber.as_subscriber());

    // Act
    subscriber.request(2);

    // Assert
    assert_eq!(subscriber.values(), vec![1, 2]);
    assert_eq!(log.requests(), vec![3]);

    subscriber.request(1);
    assert_eq!(subscriber.values(), vec![1, 2, 3]);
    assert_eq!(log.requests(), vec![3, 3]);
    Ok(())
}

#[test]
fn test_filter_when_config_accessors() -> anyhow::Result<()> {
    // Arrange
    let config = FilterWhenConfig::new(7)?;

    // Act
    let filtered = range(1, 3).filter_when_with_config(|_: &i32| just(true).boxed(), config);

    // Assert
    assert_eq!(filtered.config().prefetch().get(), 7);
    assert_eq!(filtered.config().prefetch().capacity(), 8);
    assert!(format!("{:?}", filtered.config()).contains("prefetch: 7"));
    Ok(())
}

#[test]
fn test_filter_when_closure_error_hook() {
    // Arrange
    let dropped = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&dropped);
    let config = FilterWhenConfig::default().with_error_hook(move |_: BackfluxError| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let filtered = create(|subscriber: Arc<dyn Subscriber<i32>>| {
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::new(EmptySubscription)));
        subscriber.on_complete();
        subscriber.on_error(BackfluxError::user_error(TestError("late")));
    })
    .filter_when_with_config(|_: &i32| just(true).boxed(), config);
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert!(subscriber.is_completed());
    assert!(subscriber.violations().is_empty());
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
}

#[test]
fn test_filter_when_shared_error_hook() {
    // Arrange
    let hook = RecordingErrorHook::new();
    let shared: Arc<dyn ErrorHook> = Arc::new(hook.clone());
    let config = FilterWhenConfig::default().with_shared_error_hook(shared);
    let filtered = create(|subscriber: Arc<dyn Subscriber<i32>>| {
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::new(EmptySubscription)));
        subscriber.on_error(BackfluxError::user_error(TestError("first")));
        subscriber.on_error(BackfluxError::user_error(TestError("second")));
    })
    .filter_when_with_config(|_: &i32| just(true).boxed(), config);
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert!(subscriber.error().is_some());
    assert_eq!(hook.count(), 1);
    assert_eq!(
        hook.errors()[0].to_string(),
        "User error: test error: second"
    );
}
