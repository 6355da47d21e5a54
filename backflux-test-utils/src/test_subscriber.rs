// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{
    BackfluxError, Demand, OperatorSnapshot, Subscriber, Subscription, SubscriptionHandle,
};
use event_listener::Event;
use parking_lot::Mutex;
use std::sync::Arc;

/// Subscriber that records everything it receives.
///
/// It requests `initial_request` on subscription and afterwards only what the
/// test asks for through [`request`](Self::request). Any protocol breach it
/// observes (a value beyond demand, a signal after termination, a second
/// subscription) is recorded in [`violations`](Self::violations).
pub struct TestSubscriber<T> {
    initial_request: u64,
    cancel_after: Option<usize>,
    state: Mutex<TestState<T>>,
    terminal: Event,
}

struct TestState<T> {
    subscription: Option<Arc<dyn Subscription>>,
    values: Vec<T>,
    error: Option<BackfluxError>,
    completed: bool,
    outstanding: Demand,
    violations: Vec<String>,
}

impl<T: Send + 'static> TestSubscriber<T> {
    pub fn new(initial_request: u64) -> Arc<Self> {
        Self::build(initial_request, None)
    }

    /// Requests everything up front.
    pub fn unbounded() -> Arc<Self> {
        Self::build(backflux_core::UNBOUNDED, None)
    }

    /// Cancels its subscription once `count` values have arrived.
    pub fn cancel_after(initial_request: u64, count: usize) -> Arc<Self> {
        Self::build(initial_request, Some(count))
    }

    fn build(initial_request: u64, cancel_after: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            initial_request,
            cancel_after,
            state: Mutex::new(TestState {
                subscription: None,
                values: Vec::new(),
                error: None,
                completed: false,
                outstanding: Demand::NONE,
                violations: Vec::new(),
            }),
            terminal: Event::new(),
        })
    }

    /// Upcasts for `Publisher::subscribe`.
    pub fn as_subscriber(self: &Arc<Self>) -> Arc<dyn Subscriber<T>> {
        Arc::clone(self) as Arc<dyn Subscriber<T>>
    }

    pub fn request(&self, n: u64) {
        let subscription = {
            let mut state = self.state.lock();
            state.outstanding = state.outstanding.add(n);
            state.subscription.clone()
        };
        if let Some(subscription) = subscription {
            subscription.request(n);
        }
    }

    pub fn cancel(&self) {
        let subscription = self.state.lock().subscription.clone();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }

    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.state.lock().values.clone()
    }

    pub fn value_count(&self) -> usize {
        self.state.lock().values.len()
    }

    pub fn error(&self) -> Option<BackfluxError> {
        self.state.lock().error.clone()
    }

    pub fn is_completed(&self) -> bool {
        self.state.lock().completed
    }

    pub fn is_terminated(&self) -> bool {
        let state = self.state.lock();
        state.completed || state.error.is_some()
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.lock().subscription.is_some()
    }

    pub fn violations(&self) -> Vec<String> {
        self.state.lock().violations.clone()
    }

    /// Introspection of the operator this subscriber is attached to.
    pub fn snapshot(&self) -> Option<OperatorSnapshot> {
        let subscription = self.state.lock().subscription.clone();
        subscription.and_then(|subscription| subscription.snapshot())
    }

    /// Waits until completion or error arrives.
    pub async fn await_terminal(&self) {
        loop {
            if self.is_terminated() {
                return;
            }
            let listener = self.terminal.listen();
            if self.is_terminated() {
                return;
            }
            listener.await;
        }
    }

    fn check_live(state: &mut TestState<T>, signal: &str) -> bool {
        if state.completed || state.error.is_some() {
            state.violations.push(format!("{signal} after termination"));
            return false;
        }
        true
    }
}

impl<T: Send + 'static> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&self, subscription: SubscriptionHandle<T>) {
        let subscription = subscription.into_push();
        {
            let mut state = self.state.lock();
            if state.subscription.is_some() {
                state.violations.push("second on_subscribe".to_string());
                drop(state);
                subscription.cancel();
                return;
            }
            state.subscription = Some(Arc::clone(&subscription));
            state.outstanding = state.outstanding.add(self.initial_request);
        }
        if self.initial_request > 0 {
            subscription.request(self.initial_request);
        }
    }

    fn on_next(&self, value: T) {
        let to_cancel = {
            let mut state = self.state.lock();
            if !Self::check_live(&mut state, "on_next") {
                return;
            }
            if !state.outstanding.consume_one() {
                state.violations.push("on_next without demand".to_string());
            }
            state.values.push(value);
            match self.cancel_after {
                Some(count) if state.values.len() == count => state.subscription.clone(),
                _ => None,
            }
        };
        if let Some(subscription) = to_cancel {
            subscription.cancel();
        }
    }

    fn on_error(&self, error: BackfluxError) {
        {
            let mut state = self.state.lock();
            if !Self::check_live(&mut state, "on_error") {
                return;
            }
            state.error = Some(error);
        }
        self.terminal.notify(usize::MAX);
    }

    fn on_complete(&self) {
        {
            let mut state = self.state.lock();
            if !Self::check_live(&mut state, "on_complete") {
                return;
            }
            state.completed = true;
        }
        self.terminal.notify(usize::MAX);
    }

    fn name(&self) -> &'static str {
        "TestSubscriber"
    }
}
