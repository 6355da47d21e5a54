// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{
    BackfluxError, Publisher, Subscriber, Subscription, SubscriptionHandle,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Hides every shortcut of the wrapped publisher.
///
/// Subscribers only see a plain push subscription, and `try_scalar` is never
/// answered, so operators take their general path.
#[derive(Clone)]
pub struct Hide<P>(P);

pub fn hide<P>(publisher: P) -> Hide<P> {
    Hide(publisher)
}

struct HideSubscriber<T> {
    actual: Arc<dyn Subscriber<T>>,
}

impl<T, P> Publisher<T> for Hide<P>
where
    T: Send + 'static,
    P: Publisher<T>,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        self.0.subscribe(Arc::new(HideSubscriber { actual: subscriber }));
    }
}

impl<T: Send + 'static> Subscriber<T> for HideSubscriber<T> {
    fn on_subscribe(&self, subscription: SubscriptionHandle<T>) {
        self.actual
            .on_subscribe(SubscriptionHandle::Push(subscription.into_push()));
    }

    fn on_next(&self, value: T) {
        self.actual.on_next(value);
    }

    fn on_error(&self, error: BackfluxError) {
        self.actual.on_error(error);
    }

    fn on_complete(&self) {
        self.actual.on_complete();
    }

    fn name(&self) -> &'static str {
        self.actual.name()
    }
}

/// Shared log of every `request(n)` a publisher received.
#[derive(Clone, Debug, Default)]
pub struct RequestLog(Arc<Mutex<Vec<u64>>>);

impl RequestLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<u64> {
        self.0.lock().clone()
    }

    pub fn first(&self) -> Option<u64> {
        self.0.lock().first().copied()
    }

    /// Saturating sum of all requests.
    pub fn total(&self) -> u64 {
        self.0
            .lock()
            .iter()
            .fold(0u64, |sum, n| sum.saturating_add(*n))
    }
}

/// Records requests into a [`RequestLog`]; the subscription is push-only.
#[derive(Clone)]
pub struct RecordRequests<P> {
    publisher: P,
    log: RequestLog,
}

pub fn record_requests<P>(publisher: P, log: RequestLog) -> RecordRequests<P> {
    RecordRequests { publisher, log }
}

struct RecordingSubscriber<T> {
    actual: Arc<dyn Subscriber<T>>,
    log: RequestLog,
}

struct RecordingSubscription {
    inner: Arc<dyn Subscription>,
    log: RequestLog,
}

impl<T, P> Publisher<T> for RecordRequests<P>
where
    T: Send + 'static,
    P: Publisher<T>,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        self.publisher.subscribe(Arc::new(RecordingSubscriber {
            actual: subscriber,
            log: self.log.clone(),
        }));
    }
}

impl<T: Send + 'static> Subscriber<T> for RecordingSubscriber<T> {
    fn on_subscribe(&self, subscription: SubscriptionHandle<T>) {
        let recording = RecordingSubscription {
            inner: subscription.into_push(),
            log: self.log.clone(),
        };
        self.actual
            .on_subscribe(SubscriptionHandle::push(Arc::new(recording)));
    }

    fn on_next(&self, value: T) {
        self.actual.on_next(value);
    }

    fn on_error(&self, error: BackfluxError) {
        self.actual.on_error(error);
    }

    fn on_complete(&self) {
        self.actual.on_complete();
    }

    fn name(&self) -> &'static str {
        self.actual.name()
    }
}

impl Subscription for RecordingSubscription {
    fn request(&self, n: u64) {
        self.log.0.lock().push(n);
        self.inner.request(n);
    }

    fn cancel(&self) {
        self.inner.cancel();
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Builder-style access to the wrappers.
pub trait TestPublisherExt<T>: Publisher<T> + Sized {
    fn hide(self) -> Hide<Self> {
        hide(self)
    }

    fn record_requests(self, log: RequestLog) -> RecordRequests<Self> {
        record_requests(self, log)
    }
}

impl<T, P: Publisher<T>> TestPublisherExt<T> for P {}
