// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Synchronous test publishers.
//!
//! Every publisher here honours demand through an [`Emitter`]. The ones that
//! know their outcome up front also answer [`Publisher::try_scalar`]; wrap them
//! in [`hide`](crate::hide) to force a real subscription.

use crate::emitter::Emitter;
use backflux_core::{
    BackfluxError, EmptySubscription, Publisher, Result, Subscriber, SubscriptionHandle,
};
use std::marker::PhantomData;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

/// Publisher over a list of items, optionally followed by a failure.
#[derive(Clone)]
pub struct IterPublisher<T> {
    label: &'static str,
    items: Vec<T>,
    failure: Option<BackfluxError>,
    fusable: bool,
    cancellations: Option<Arc<AtomicUsize>>,
}

/// Pushes `items` as demand allows, then completes.
pub fn iter<T, I>(items: I) -> IterPublisher<T>
where
    I: IntoIterator<Item = T>,
{
    IterPublisher {
        label: "IterSubscription",
        items: items.into_iter().collect(),
        failure: None,
        fusable: false,
        cancellations: None,
    }
}

/// `count` consecutive integers starting at `start`, offering a pollable queue.
pub fn range(start: i32, count: i32) -> IterPublisher<i32> {
    IterPublisher {
        label: "RangeSubscription",
        items: (0..count.max(0)).map(|offset| start + offset).collect(),
        failure: None,
        fusable: true,
        cancellations: None,
    }
}

impl<T> IterPublisher<T> {
    /// Fails with `error` after the last item instead of completing.
    #[must_use]
    pub fn then_fail(mut self, error: BackfluxError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Increments `counter` every time a subscription is cancelled before finishing.
    #[must_use]
    pub fn count_cancellations(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.cancellations = Some(counter);
        self
    }

    /// Offers the items through a pollable queue as well as by push.
    #[must_use]
    pub fn fused(mut self) -> Self {
        self.fusable = true;
        self
    }
}

impl<T> Publisher<T> for IterPublisher<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        let emitter = Emitter::new(
            self.label,
            Arc::clone(&subscriber),
            self.items.iter().cloned(),
            self.failure.clone(),
            self.cancellations.clone(),
        );
        if self.fusable {
            subscriber.on_subscribe(SubscriptionHandle::fused(emitter));
        } else {
            subscriber.on_subscribe(SubscriptionHandle::push(Arc::clone(&emitter)));
            emitter.drain();
        }
    }
}

/// Publisher of a single value, resolvable without subscribing.
#[derive(Clone)]
pub struct Just<T> {
    value: T,
    cancellations: Option<Arc<AtomicUsize>>,
}

pub fn just<T>(value: T) -> Just<T> {
    Just {
        value,
        cancellations: None,
    }
}

impl<T> Just<T> {
    #[must_use]
    pub fn count_cancellations(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.cancellations = Some(counter);
        self
    }
}

impl<T> Publisher<T> for Just<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        let emitter = Emitter::new(
            "JustSubscription",
            Arc::clone(&subscriber),
            [self.value.clone()],
            None,
            self.cancellations.clone(),
        );
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::clone(&emitter)));
        emitter.drain();
    }

    fn try_scalar(&self) -> Option<Result<Option<T>>> {
        Some(Ok(Some(self.value.clone())))
    }
}

/// Completes immediately.
pub struct Empty<T>(PhantomData<fn() -> T>);

pub fn empty<T>() -> Empty<T> {
    Empty(PhantomData)
}

impl<T: Send + 'static> Publisher<T> for Empty<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::new(EmptySubscription)));
        subscriber.on_complete();
    }

    fn try_scalar(&self) -> Option<Result<Option<T>>> {
        Some(Ok(None))
    }
}

/// Fails immediately with a clone of `error`.
pub struct Fail<T> {
    error: BackfluxError,
    _marker: PhantomData<fn() -> T>,
}

pub fn fail<T>(error: BackfluxError) -> Fail<T> {
    Fail {
        error,
        _marker: PhantomData,
    }
}

impl<T: Send + 'static> Publisher<T> for Fail<T> {
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::new(EmptySubscription)));
        subscriber.on_error(self.error.clone());
    }

    fn try_scalar(&self) -> Option<Result<Option<T>>> {
        Some(Err(self.error.clone()))
    }
}

/// Computes its outcome by calling `f`, both when subscribed and as a scalar.
pub struct FromFn<F> {
    f: F,
}

pub fn from_fn<T, F>(f: F) -> FromFn<F>
where
    F: Fn() -> Result<Option<T>> + Send + Sync,
{
    FromFn { f }
}

impl<T, F> Publisher<T> for FromFn<F>
where
    T: Send + 'static,
    F: Fn() -> Result<Option<T>> + Send + Sync,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        let (items, failure) = match (self.f)() {
            Ok(value) => (value, None),
            Err(error) => (None, Some(error)),
        };
        let emitter = Emitter::new(
            "FromFnSubscription",
            Arc::clone(&subscriber),
            items,
            failure,
            None,
        );
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::clone(&emitter)));
        emitter.drain();
    }

    fn try_scalar(&self) -> Option<Result<Option<T>>> {
        Some((self.f)())
    }
}

/// Hands the raw subscriber to `f`, which drives the protocol itself.
pub struct Create<F> {
    f: F,
}

pub fn create<T, F>(f: F) -> Create<F>
where
    F: Fn(Arc<dyn Subscriber<T>>) + Send + Sync,
{
    Create { f }
}

impl<T, F> Publisher<T> for Create<F>
where
    F: Fn(Arc<dyn Subscriber<T>>) + Send + Sync,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        (self.f)(subscriber);
    }
}
