// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{BackfluxError, Demand, Publisher, Subscriber, Subscription, SubscriptionHandle};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// A publisher driven by hand from the test body.
///
/// Signals are delivered to every current subscriber exactly when the test
/// calls [`next`](Self::next), [`error`](Self::error) or
/// [`complete`](Self::complete). Demand is recorded but not enforced.
/// Cancelling detaches the subscriber.
pub struct ManualPublisher<T> {
    inner: Arc<ManualInner<T>>,
}

struct ManualInner<T> {
    subscribers: Mutex<Vec<(u64, Arc<dyn Subscriber<T>>)>>,
    next_id: AtomicU64,
    requested: Mutex<Demand>,
    cancellations: AtomicUsize,
    subscriptions: AtomicUsize,
}

struct ManualSubscription<T> {
    id: u64,
    inner: Arc<ManualInner<T>>,
}

impl<T> Clone for ManualPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ManualPublisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ManualPublisher<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ManualInner {
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                requested: Mutex::new(Demand::NONE),
                cancellations: AtomicUsize::new(0),
                subscriptions: AtomicUsize::new(0),
            }),
        }
    }

    /// Delivers `value` to every subscriber.
    pub fn next(&self, value: T)
    where
        T: Clone,
    {
        for subscriber in self.snapshot() {
            subscriber.on_next(value.clone());
        }
    }

    /// Fails every subscriber and forgets them.
    pub fn error(&self, error: BackfluxError) {
        let subscribers = std::mem::take(&mut *self.inner.subscribers.lock());
        for (_, subscriber) in subscribers {
            subscriber.on_error(error.clone());
        }
    }

    /// Completes every subscriber and forgets them.
    pub fn complete(&self) {
        let subscribers = std::mem::take(&mut *self.inner.subscribers.lock());
        for (_, subscriber) in subscribers {
            subscriber.on_complete();
        }
    }

    pub fn has_subscribers(&self) -> bool {
        !self.inner.subscribers.lock().is_empty()
    }

    /// Total subscriptions ever made.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.load(Ordering::SeqCst)
    }

    /// Sum of every request received, across subscriptions.
    pub fn requested(&self) -> Demand {
        *self.inner.requested.lock()
    }

    pub fn cancellations(&self) -> usize {
        self.inner.cancellations.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Vec<Arc<dyn Subscriber<T>>> {
        self.inner
            .subscribers
            .lock()
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect()
    }
}

impl<T: Send + 'static> Publisher<T> for ManualPublisher<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        self.inner.subscriptions.fetch_add(1, Ordering::SeqCst);
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .subscribers
            .lock()
            .push((id, Arc::clone(&subscriber)));
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::new(ManualSubscription {
            id,
            inner: Arc::clone(&self.inner),
        })));
    }
}

impl<T: Send + 'static> Subscription for ManualSubscription<T> {
    fn request(&self, n: u64) {
        let mut requested = self.inner.requested.lock();
        *requested = requested.add(n);
    }

    fn cancel(&self) {
        let mut subscribers = self.inner.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != self.id);
        if subscribers.len() < before {
            self.inner.cancellations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn name(&self) -> &'static str {
        "ManualSubscription"
    }
}
