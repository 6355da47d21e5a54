// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::active_slot::Verdict;
use backflux_core::{
    dispatch_dropped, BackfluxError, ErrorHook, Subscriber, Subscription, SubscriptionHandle,
    UNBOUNDED,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Receives the outcome of one predicate evaluation.
pub(crate) trait VerdictSink: Send + Sync {
    fn on_verdict(&self, generation: u64, verdict: Verdict);

    fn on_predicate_error(&self, generation: u64, error: BackfluxError);
}

/// Subscriber attached to the verdict source of a single element.
///
/// The first signal decides: a value becomes the verdict and the source is
/// cancelled, completion without a value rejects, an error fails the engine.
/// Anything after that is ignored, except errors, which go to the hook.
pub(crate) struct PredicateInner {
    generation: u64,
    parent: Weak<dyn VerdictSink>,
    error_hook: Arc<dyn ErrorHook>,
    state: Mutex<InnerState>,
}

/// Outcome of trying to finish an evaluation.
enum Finish {
    /// An earlier signal already finished it.
    AlreadyDone,
    /// This call finished it and took the verdict source's subscription, if any.
    Claimed(Option<Arc<dyn Subscription>>),
}

#[derive(Default)]
struct InnerState {
    subscription: Option<Arc<dyn Subscription>>,
    done: bool,
    cancelled: bool,
}

impl PredicateInner {
    pub(crate) fn new(
        generation: u64,
        parent: Weak<dyn VerdictSink>,
        error_hook: Arc<dyn ErrorHook>,
    ) -> Self {
        Self {
            generation,
            parent,
            error_hook,
            state: Mutex::new(InnerState::default()),
        }
    }

    /// Stops listening and cancels the verdict source.
    pub(crate) fn cancel(&self) {
        let subscription = {
            let mut state = self.state.lock();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            state.done = true;
            state.subscription.take()
        };
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }

    /// Marks the evaluation finished.
    fn finish(&self) -> Finish {
        let mut state = self.state.lock();
        if state.done {
            return Finish::AlreadyDone;
        }
        state.done = true;
        Finish::Claimed(state.subscription.take())
    }

    fn resolve(&self, verdict: Verdict) {
        if let Some(parent) = self.parent.upgrade() {
            parent.on_verdict(self.generation, verdict);
        }
    }
}

impl Subscriber<bool> for PredicateInner {
    fn on_subscribe(&self, subscription: SubscriptionHandle<bool>) {
        let subscription = subscription.into_push();
        {
            let mut state = self.state.lock();
            if state.cancelled || state.subscription.is_some() {
                drop(state);
                subscription.cancel();
                return;
            }
            state.subscription = Some(Arc::clone(&subscription));
        }
        subscription.request(UNBOUNDED);
    }

    fn on_next(&self, value: bool) {
        let Finish::Claimed(subscription) = self.finish() else {
            log_debug!("filter_when: ignoring predicate value after the first");
            return;
        };
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
        self.resolve(Verdict::from_value(Some(value)));
    }

    fn on_error(&self, error: BackfluxError) {
        if let Finish::AlreadyDone = self.finish() {
            dispatch_dropped(self.error_hook.as_ref(), error);
            return;
        }
        match self.parent.upgrade() {
            Some(parent) => parent.on_predicate_error(self.generation, error),
            None => dispatch_dropped(self.error_hook.as_ref(), error),
        }
    }

    fn on_complete(&self) {
        if let Finish::Claimed(_) = self.finish() {
            self.resolve(Verdict::from_value(None));
        }
    }

    fn name(&self) -> &'static str {
        "FilterWhenInner"
    }
}
