// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{Publisher, Subscriber, Subscription, SubscriptionHandle};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Emits one value after `delay` on the tokio runtime, then completes.
///
/// Must be subscribed from within a tokio runtime. Under a paused clock the
/// delay elapses as soon as the runtime is otherwise idle.
#[derive(Clone)]
pub struct Delayed<T> {
    value: Option<T>,
    delay: Duration,
}

pub fn delayed<T>(value: T, delay: Duration) -> Delayed<T> {
    Delayed {
        value: Some(value),
        delay,
    }
}

/// Completes without a value after `delay`.
pub fn delayed_empty<T>(delay: Duration) -> Delayed<T> {
    Delayed { value: None, delay }
}

struct DelayedSubscription<T> {
    subscriber: Arc<dyn Subscriber<T>>,
    state: Mutex<DelayedState<T>>,
}

struct DelayedState<T> {
    value: Option<T>,
    elapsed: bool,
    requested: bool,
    done: bool,
}

impl<T: Send + 'static> DelayedSubscription<T> {
    fn try_emit(&self) {
        let value = {
            let mut state = self.state.lock();
            if state.done || !state.elapsed || (state.value.is_some() && !state.requested) {
                return;
            }
            state.done = true;
            state.value.take()
        };
        if let Some(value) = value {
            self.subscriber.on_next(value);
        }
        self.subscriber.on_complete();
    }
}

impl<T: Send + 'static> Subscription for DelayedSubscription<T> {
    fn request(&self, n: u64) {
        if n == 0 {
            return;
        }
        self.state.lock().requested = true;
        self.try_emit();
    }

    fn cancel(&self) {
        let mut state = self.state.lock();
        state.done = true;
        state.value = None;
    }

    fn name(&self) -> &'static str {
        "DelayedSubscription"
    }
}

impl<T> Publisher<T> for Delayed<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        let subscription = Arc::new(DelayedSubscription {
            subscriber: Arc::clone(&subscriber),
            state: Mutex::new(DelayedState {
                value: self.value.clone(),
                elapsed: false,
                requested: false,
                done: false,
            }),
        });
        subscriber.on_subscribe(SubscriptionHandle::push(Arc::clone(&subscription)));

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            subscription.state.lock().elapsed = true;
            subscription.try_emit();
        });
    }
}
