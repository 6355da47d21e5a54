// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{
    Demand, Publisher, PublisherExt, Subscriber, Subscription, SubscriptionHandle,
};
use backflux_stream::FilterWhenExt;
use backflux_test_utils::{create, just, ManualPublisher, TestSubscriber};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Probe {
    requests: Mutex<Vec<u64>>,
    cancels: AtomicUsize,
}

impl Subscription for Probe {
    fn request(&self, n: u64) {
        self.requests.lock().push(n);
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &'static str {
        "Probe"
    }
}

#[test]
fn test_filter_when_cancels_second_upstream_subscription() {
    // Arrange
    let first = Arc::new(Probe::default());
    let second = Arc::new(Probe::default());
    let (first_handle, second_handle) = (Arc::clone(&first), Arc::clone(&second));
    let filtered = create(move |subscriber: Arc<dyn Subscriber<i32>>| {
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::clone(&first_handle)));
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::clone(&second_handle)));
    })
    .filter_when(|_: &i32| just(true).boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(first.cancels.load(Ordering::SeqCst), 0);
    assert_eq!(second.cancels.load(Ordering::SeqCst), 1);
    assert!(second.requests.lock().is_empty());
    assert!(subscriber.violations().is_empty());
    let snapshot = subscriber.snapshot().expect("filter_when exposes a snapshot");
    assert_eq!(snapshot.parent, Some("Probe"));
}

#[test]
fn test_filter_when_ignores_zero_request() {
    // Arrange
    let upstream = ManualPublisher::<i32>::new();
    let filtered = upstream.clone().filter_when(|_: &i32| just(true).boxed());
    let subscriber = TestSubscriber::new(0);
    filtered.subscribe(subscriber.as_subscriber());
    upstream.next(1);

    // Act
    subscriber.request(0);

    // Assert
    assert!(subscriber.values().is_empty());
    assert!(subscriber.error().is_none());
    let snapshot = subscriber.snapshot().expect("filter_when exposes a snapshot");
    assert_eq!(snapshot.requested_from_downstream, Demand::NONE);
    assert!(!snapshot.terminated);

    subscriber.request(1);
    assert_eq!(subscriber.values(), vec![1]);
}

#[test]
fn test_filter_when_requests_prefetch_from_push_upstream() {
    // Arrange
    let probe = Arc::new(Probe::default());
    let handle = Arc::clone(&probe);
    let filtered = create(move |subscriber: Arc<dyn Subscriber<i32>>| {
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::clone(&handle)));
    })
    .filter_when(|_: &i32| just(true).boxed());
    let subscriber = TestSubscriber::new(0);

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert!(subscriber.is_subscribed());
    assert_eq!(*probe.requests.lock(), vec![256]);
}

#[test]
fn test_filter_when_ignores_signals_after_completion() {
    // Arrange
    let filtered = create(|subscriber: Arc<dyn Subscriber<i32>>| {
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::new(Probe::default())));
        subscriber.on_next(1);
        subscriber.on_complete();
        subscriber.on_next(2);
        subscriber.on_complete();
    })
    .filter_when(|_: &i32| just(true).boxed());
    let subscriber = TestSubscriber::unbounded();

    // Act
    filtered.subscribe(subscriber.as_subscriber());

    // Assert
    assert_eq!(subscriber.values(), vec![1]);
    assert!(subscriber.is_completed());
    assert!(subscriber.violations().is_empty());
}

#[test]
fn test_filter_when_waits_for_evaluation_before_completing() {
    // Arrange
    let upstream = ManualPublisher::<i32>::new();
    let verdicts = ManualPublisher::<bool>::new();
    let source = verdicts.clone();
    let filtered = upstream
        .clone()
        .filter_when(move |_: &i32| source.clone().boxed());
    let subscriber = TestSubscriber::unbounded();
    filtered.subscribe(subscriber.as_subscriber());

    // Act
    upstream.next(7);
    upstream.complete();

    // Assert
    assert!(!subscriber.is_completed());
    verdicts.next(true);
    assert_eq!(subscriber.values(), vec![7]);
    assert!(subscriber.is_completed());
}

#[test]
fn test_filter_when_ignores_values_after_first_verdict() {
    // Arrange
    let upstream = ManualPublisher::<i32>::new();
    let filtered = upstream.clone().filter_when(|_: &i32| {
        create(|subscriber: Arc<dyn Subscriber<bool>>| {
            subscriber.on_subscribe(SubscriptionHandle::push(Arc::new(Probe::default())));
            subscriber.on_next(false);
            subscriber.on_next(true);
            subscriber.on_complete();
        })
        .boxed()
    });
    let subscriber = TestSubscriber::unbounded();
    filtered.subscribe(subscriber.as_subscriber());

    // Act
    upstream.next(1);
    upstream.next(2);
    upstream.complete();

    // Assert
    assert!(subscriber.values().is_empty());
    assert!(subscriber.is_completed());
}
