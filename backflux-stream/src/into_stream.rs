// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bridging a [`Publisher`] into a `futures` [`Stream`].
//!
//! The bridge subscribes immediately and requests values in batches, asking for
//! the next batch once the consumer has pulled a full one. Values buffer while
//! the consumer is slow. The terminal error is yielded once as
//! [`StreamItem::Error`], after which the stream ends. Dropping the stream
//! cancels the subscription.

use backflux_core::{
    BackfluxError, Prefetch, Publisher, Result, StreamItem, Subscriber, Subscription,
    SubscriptionHandle,
};
use futures::task::AtomicWaker;
use futures::Stream;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Extension trait converting any publisher into a [`Stream`].
pub trait IntoStreamExt<T>: Publisher<T> + Sized
where
    T: Send + 'static,
{
    /// Bridges with the default batch size.
    fn into_stream(self) -> PublisherStream<T> {
        PublisherStream::subscribe(&self, Prefetch::default())
    }

    /// Bridges, requesting `batch` values at a time.
    ///
    /// # Errors
    ///
    /// Returns [`BackfluxError::InvalidConfiguration`] when `batch` is zero.
    fn into_stream_with_batch(self, batch: usize) -> Result<PublisherStream<T>> {
        Ok(PublisherStream::subscribe(&self, Prefetch::new(batch)?))
    }
}

impl<T, P> IntoStreamExt<T> for P
where
    T: Send + 'static,
    P: Publisher<T>,
{
}

/// Stream of the values a publisher produced.
pub struct PublisherStream<T> {
    shared: Arc<Shared<T>>,
    batch: Prefetch,
    consumed: usize,
    finished: bool,
}

struct Shared<T> {
    state: Mutex<BridgeState<T>>,
    waker: AtomicWaker,
}

struct BridgeState<T> {
    items: VecDeque<T>,
    error: Option<BackfluxError>,
    done: bool,
    subscription: Option<Arc<dyn Subscription>>,
}

struct BridgeSubscriber<T> {
    shared: Arc<Shared<T>>,
    batch: Prefetch,
}

impl<T: Send + 'static> PublisherStream<T> {
    fn subscribe<P: Publisher<T>>(publisher: &P, batch: Prefetch) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(BridgeState {
                items: VecDeque::new(),
                error: None,
                done: false,
                subscription: None,
            }),
            waker: AtomicWaker::new(),
        });
        publisher.subscribe(Arc::new(BridgeSubscriber {
            shared: Arc::clone(&shared),
            batch,
        }));
        Self {
            shared,
            batch,
            consumed: 0,
            finished: false,
        }
    }

    fn replenish(&mut self) {
        self.consumed += 1;
        if self.consumed < self.batch.get() {
            return;
        }
        self.consumed = 0;
        let subscription = self.shared.state.lock().subscription.clone();
        if let Some(subscription) = subscription {
            subscription.request(self.batch.request_size());
        }
    }

    /// Takes the next buffered signal, or `Poll::Pending` if none has arrived.
    fn take_next(&mut self) -> Poll<Option<StreamItem<T>>> {
        let mut state = self.shared.state.lock();
        if let Some(value) = state.items.pop_front() {
            drop(state);
            self.replenish();
            return Poll::Ready(Some(StreamItem::Value(value)));
        }
        if let Some(error) = state.error.take() {
            self.finished = true;
            return Poll::Ready(Some(StreamItem::Error(error)));
        }
        if state.done {
            self.finished = true;
            return Poll::Ready(None);
        }
        Poll::Pending
    }
}

impl<T: Send + 'static> Stream for PublisherStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        if let Poll::Ready(item) = this.take_next() {
            return Poll::Ready(item);
        }
        this.shared.waker.register(cx.waker());
        this.take_next()
    }
}

impl<T> Drop for PublisherStream<T> {
    fn drop(&mut self) {
        let subscription = {
            let mut state = self.shared.state.lock();
            state.items.clear();
            if state.done {
                None
            } else {
                state.done = true;
                state.subscription.take()
            }
        };
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }
}

impl<T: Send + 'static> Subscriber<T> for BridgeSubscriber<T> {
    fn on_subscribe(&self, subscription: SubscriptionHandle<T>) {
        let subscription = subscription.into_push();
        {
            let mut state = self.shared.state.lock();
            if state.done || state.subscription.is_some() {
                drop(state);
                subscription.cancel();
                return;
            }
            state.subscription = Some(Arc::clone(&subscription));
        }
        subscription.request(self.batch.request_size());
    }

    fn on_next(&self, value: T) {
        {
            let mut state = self.shared.state.lock();
            if state.done {
                return;
            }
            state.items.push_back(value);
        }
        self.shared.waker.wake();
    }

    fn on_error(&self, error: BackfluxError) {
        {
            let mut state = self.shared.state.lock();
            if state.done {
                return;
            }
            state.done = true;
            state.error = Some(error);
            state.subscription = None;
        }
        self.shared.waker.wake();
    }

    fn on_complete(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.done {
                return;
            }
            state.done = true;
            state.subscription = None;
        }
        self.shared.waker.wake();
    }

    fn name(&self) -> &'static str {
        "PublisherStream"
    }
}
