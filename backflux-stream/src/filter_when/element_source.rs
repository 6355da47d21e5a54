// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{
    BackfluxError, BoundedQueue, Prefetch, QueueSubscription, Subscription, SubscriptionHandle,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Outcome of asking the source for the next element.
pub(crate) enum Pulled<T> {
    Element(T),
    /// Nothing available right now; completion is tracked by the engine.
    Empty,
    /// The source has no more elements.
    Exhausted,
    Failed(BackfluxError),
}

/// Where the engine takes its next element from.
///
/// Only the thread running a drain pass calls `next` and `retire`.
pub(crate) trait ElementSource<T>: Send + Sync {
    /// Called once the downstream subscriber has been told about the engine.
    fn start(&self);

    /// Stores a pushed element, or gives it back when there is no room.
    fn offer(&self, element: T) -> Result<(), T>;

    fn next(&self) -> Pulled<T>;

    /// Records that an element left the engine, emitted or rejected.
    /// Nothing is requested once the source is cancelled.
    fn retire(&self);

    fn buffered(&self) -> usize;

    /// Drops everything held and returns how many elements that was.
    fn clear(&self) -> usize;

    fn cancel(&self);

    fn name(&self) -> &'static str;

    fn is_fused(&self) -> bool;
}

/// Chooses the source matching the capabilities upstream offered.
pub(crate) fn select<T: Send + 'static>(
    handle: SubscriptionHandle<T>,
    prefetch: Prefetch,
) -> Arc<dyn ElementSource<T>> {
    match handle {
        SubscriptionHandle::Fused {
            subscription,
            queue,
        } => Arc::new(FusedSource {
            subscription,
            queue,
        }),
        SubscriptionHandle::Push(subscription) => Arc::new(PushSource {
            subscription,
            queue: BoundedQueue::new(prefetch.capacity()),
            prefetch,
            retired: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
        }),
    }
}

/// Upstream pushes into a bounded queue and is replenished in batches.
struct PushSource<T> {
    subscription: Arc<dyn Subscription>,
    queue: BoundedQueue<T>,
    prefetch: Prefetch,
    retired: AtomicUsize,
    cancelled: AtomicBool,
}

impl<T: Send> ElementSource<T> for PushSource<T> {
    fn start(&self) {
        self.subscription.request(self.prefetch.request_size());
    }

    fn offer(&self, element: T) -> Result<(), T> {
        self.queue.offer(element)
    }

    fn next(&self) -> Pulled<T> {
        match self.queue.poll() {
            Some(element) => Pulled::Element(element),
            None => Pulled::Empty,
        }
    }

    fn retire(&self) {
        if self.cancelled.load(Ordering::Acquire) {
            return;
        }
        let retired = self.retired.load(Ordering::Relaxed) + 1;
        if retired == self.prefetch.get() {
            self.retired.store(0, Ordering::Relaxed);
            self.subscription.request(self.prefetch.request_size());
        } else {
            self.retired.store(retired, Ordering::Relaxed);
        }
    }

    fn buffered(&self) -> usize {
        self.queue.len()
    }

    fn clear(&self) -> usize {
        self.queue.clear()
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.subscription.cancel();
    }

    fn name(&self) -> &'static str {
        self.subscription.name()
    }

    fn is_fused(&self) -> bool {
        false
    }
}

/// Upstream's own queue is polled directly; nothing is ever requested.
struct FusedSource<T> {
    subscription: Arc<dyn Subscription>,
    queue: Arc<dyn QueueSubscription<T>>,
}

impl<T: Send> ElementSource<T> for FusedSource<T> {
    fn start(&self) {}

    fn offer(&self, element: T) -> Result<(), T> {
        Err(element)
    }

    fn next(&self) -> Pulled<T> {
        match self.queue.poll_next() {
            Ok(Some(element)) => Pulled::Element(element),
            Ok(None) => Pulled::Exhausted,
            Err(error) => Pulled::Failed(error),
        }
    }

    fn retire(&self) {}

    fn buffered(&self) -> usize {
        0
    }

    fn clear(&self) -> usize {
        0
    }

    fn cancel(&self) {
        self.subscription.cancel();
    }

    fn name(&self) -> &'static str {
        self.subscription.name()
    }

    fn is_fused(&self) -> bool {
        true
    }
}
