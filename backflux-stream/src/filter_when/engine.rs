// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::active_slot::{ActiveSlot, Verdict};
use super::element_source::{self, ElementSource, Pulled};
use super::inner::{PredicateInner, VerdictSink};
use super::predicate::AsyncPredicate;
use backflux_core::{
    dispatch_dropped, BackfluxError, BoxPublisher, Demand, DrainGuard, ErrorHook,
    OperatorSnapshot, Prefetch, Subscriber, Subscription, SubscriptionHandle,
};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

const QUEUE_RESOURCE: &str = "filter_when queue";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unsubscribed,
    Active,
    Completed,
    Errored,
    Cancelled,
}

impl Phase {
    const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Errored | Self::Cancelled)
    }
}

struct EngineState<T> {
    phase: Phase,
    source: Option<Arc<dyn ElementSource<T>>>,
    parent_name: Option<&'static str>,
    fused: bool,
    active: ActiveSlot<T>,
    demand: Demand,
    upstream_done: bool,
    /// Upstream's error, delivered once everything buffered has been drained.
    upstream_error: Option<BackfluxError>,
    /// Predicate-side or overflow error, delivered at the next step.
    failure: Option<BackfluxError>,
    /// The error delivered downstream, kept for snapshots.
    error: Option<BackfluxError>,
    generation: u64,
}

enum Step<T> {
    Idle,
    Pull {
        source: Arc<dyn ElementSource<T>>,
        upstream_done: bool,
    },
    Emit {
        element: T,
        source: Arc<dyn ElementSource<T>>,
    },
    Discard {
        element: T,
        source: Arc<dyn ElementSource<T>>,
    },
    Fail {
        error: BackfluxError,
        released: ActiveSlot<T>,
        source: Option<Arc<dyn ElementSource<T>>>,
        cancel_upstream: bool,
    },
}

/// Per-subscription state machine behind `filter_when`.
///
/// The engine is upstream's subscriber, downstream's subscription and the
/// sink for verdicts. Signals from all three sides only update the state under
/// its lock and then ask for a drain pass. The [`DrainGuard`] lets a single
/// thread run passes while others merely register that work arrived, so
/// downstream signals never overlap and at most one element is evaluated at a
/// time. Callbacks into user code always run with the lock released.
pub(crate) struct FilterWhenEngine<T> {
    predicate: Arc<dyn AsyncPredicate<T>>,
    actual: Arc<dyn Subscriber<T>>,
    prefetch: Prefetch,
    error_hook: Arc<dyn ErrorHook>,
    guard: DrainGuard,
    state: Mutex<EngineState<T>>,
    this: Weak<Self>,
}

impl<T: Send + 'static> FilterWhenEngine<T> {
    pub(crate) fn new(
        predicate: Arc<dyn AsyncPredicate<T>>,
        actual: Arc<dyn Subscriber<T>>,
        prefetch: Prefetch,
        error_hook: Arc<dyn ErrorHook>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            predicate,
            actual,
            prefetch,
            error_hook,
            guard: DrainGuard::new(),
            state: Mutex::new(EngineState {
                phase: Phase::Unsubscribed,
                source: None,
                parent_name: None,
                fused: false,
                active: ActiveSlot::Idle,
                demand: Demand::NONE,
                upstream_done: false,
                upstream_error: None,
                failure: None,
                error: None,
                generation: 0,
            }),
            this: this.clone(),
        })
    }

    fn drain(&self) {
        self.guard.run(|| self.drain_pass());
    }

    fn drain_pass(&self) {
        loop {
            match self.next_step() {
                Step::Idle => return,
                Step::Emit { element, source } => {
                    self.actual.on_next(element);
                    source.retire();
                }
                Step::Discard { element, source } => {
                    drop(element);
                    source.retire();
                }
                Step::Pull {
                    source,
                    upstream_done,
                } => {
                    if !self.pull(source.as_ref(), upstream_done) {
                        return;
                    }
                }
                Step::Fail {
                    error,
                    released,
                    source,
                    cancel_upstream,
                } => {
                    if let Some(inner) = released.release() {
                        inner.cancel();
                    }
                    if let Some(source) = source {
                        if cancel_upstream {
                            source.cancel();
                        }
                        source.clear();
                    }
                    log_trace!("filter_when: failing with {}", error);
                    self.actual.on_error(error);
                    return;
                }
            }
        }
    }

    /// Decides the next unit of work from the current state.
    fn next_step(&self) -> Step<T> {
        let mut state = self.state.lock();
        if state.phase != Phase::Active {
            return Step::Idle;
        }

        if let Some(error) = state.failure.take() {
            state.phase = Phase::Errored;
            state.error = Some(error.clone());
            return Step::Fail {
                error,
                released: state.active.take(),
                source: state.source.take(),
                cancel_upstream: !state.upstream_done,
            };
        }

        let Some(source) = state.source.clone() else {
            return Step::Idle;
        };

        match state.active.take() {
            ActiveSlot::Settled {
                element,
                verdict: Verdict::Pass,
            } => {
                if state.demand.consume_one() {
                    Step::Emit { element, source }
                } else {
                    state.active = ActiveSlot::Settled {
                        element,
                        verdict: Verdict::Pass,
                    };
                    Step::Idle
                }
            }
            ActiveSlot::Settled {
                element,
                verdict: Verdict::Reject,
            } => Step::Discard { element, source },
            evaluating @ ActiveSlot::Evaluating { .. } => {
                state.active = evaluating;
                Step::Idle
            }
            ActiveSlot::Idle => Step::Pull {
                source,
                upstream_done: state.upstream_done,
            },
        }
    }

    /// Takes the next element and starts evaluating it.
    ///
    /// `upstream_done` must be read before polling so that an element pushed
    /// just ahead of completion is never mistaken for an empty queue.
    /// Returns `false` when the pass has nothing more to do.
    fn pull(&self, source: &dyn ElementSource<T>, upstream_done: bool) -> bool {
        match source.next() {
            Pulled::Element(element) => {
                self.evaluate(element);
                true
            }
            Pulled::Empty => {
                if upstream_done {
                    self.finish();
                }
                false
            }
            Pulled::Exhausted => {
                self.state.lock().upstream_done = true;
                self.finish();
                false
            }
            Pulled::Failed(error) => {
                {
                    let mut state = self.state.lock();
                    if state.phase == Phase::Active && !state.upstream_done {
                        state.upstream_done = true;
                        state.upstream_error = Some(error);
                    } else {
                        drop(state);
                        dispatch_dropped(self.error_hook.as_ref(), error);
                        return false;
                    }
                }
                self.finish();
                false
            }
        }
    }

    fn evaluate(&self, element: T) {
        let source = match catch_unwind(AssertUnwindSafe(|| self.predicate.evaluate(&element))) {
            Ok(Ok(source)) => source,
            Ok(Err(error)) => return self.fail_fast(error),
            Err(payload) => return self.fail_fast(panic_error(payload.as_ref())),
        };

        match catch_unwind(AssertUnwindSafe(|| source.try_scalar())) {
            Ok(Some(Ok(value))) => self.place(ActiveSlot::Settled {
                element,
                verdict: Verdict::from_value(value),
            }),
            Ok(Some(Err(error))) => self.fail_fast(error),
            Ok(None) => self.subscribe_predicate(element, source),
            Err(payload) => self.fail_fast(panic_error(payload.as_ref())),
        }
    }

    fn place(&self, slot: ActiveSlot<T>) {
        let rejected = {
            let mut state = self.state.lock();
            if state.phase == Phase::Active {
                state.active = slot;
                None
            } else {
                Some(slot)
            }
        };
        drop(rejected);
    }

    fn subscribe_predicate(&self, element: T, source: BoxPublisher<bool>) {
        let inner = {
            let mut state = self.state.lock();
            if state.phase != Phase::Active {
                drop(state);
                drop(element);
                return;
            }
            state.generation += 1;
            let sink: Weak<dyn VerdictSink> = self.this.clone();
            let inner = Arc::new(PredicateInner::new(
                state.generation,
                sink,
                Arc::clone(&self.error_hook),
            ));
            state.active = ActiveSlot::Evaluating {
                element,
                generation: state.generation,
                inner: Arc::clone(&inner),
            };
            inner
        };

        let subscriber: Arc<dyn Subscriber<bool>> = inner;
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| source.subscribe(subscriber))) {
            self.fail_fast(panic_error(payload.as_ref()));
        }
    }

    /// Records an error that terminates the sequence at the next step.
    ///
    /// The first error wins. A pending upstream error is promoted ahead of
    /// `error`, which then goes to the hook.
    fn fail_fast(&self, error: BackfluxError) {
        let (dropped, terminate) = {
            let mut state = self.state.lock();
            if state.phase != Phase::Active || state.failure.is_some() {
                (Some(error), false)
            } else if let Some(first) = state.upstream_error.take() {
                state.failure = Some(first);
                (Some(error), true)
            } else {
                state.failure = Some(error);
                (None, true)
            }
        };
        if let Some(error) = dropped {
            log_debug!("filter_when: error after an earlier error");
            dispatch_dropped(self.error_hook.as_ref(), error);
        }
        if terminate {
            self.drain();
        }
    }

    /// Signals the end of the sequence once upstream is done and nothing is held.
    fn finish(&self) {
        let (error, source) = {
            let mut state = self.state.lock();
            if state.phase != Phase::Active || state.active.is_occupied() {
                return;
            }
            let error = state.upstream_error.take();
            state.phase = if error.is_some() {
                Phase::Errored
            } else {
                Phase::Completed
            };
            state.error.clone_from(&error);
            (error, state.source.take())
        };
        drop(source);

        match error {
            Some(error) => {
                log_trace!("filter_when: upstream failed with {}", error);
                self.actual.on_error(error);
            }
            None => {
                log_trace!("filter_when: completed");
                self.actual.on_complete();
            }
        }
    }
}

impl<T: Send + 'static> Subscriber<T> for FilterWhenEngine<T> {
    fn on_subscribe(&self, subscription: SubscriptionHandle<T>) {
        {
            let mut state = self.state.lock();
            if state.phase != Phase::Unsubscribed {
                drop(state);
                log_warn!(
                    "filter_when: cancelling extra subscription from {}",
                    subscription.name()
                );
                subscription.cancel();
                return;
            }
            let source = element_source::select(subscription, self.prefetch);
            state.parent_name = Some(source.name());
            state.fused = source.is_fused();
            state.source = Some(source);
            state.phase = Phase::Active;
        }

        let Some(this) = self.this.upgrade() else {
            return;
        };
        self.actual.on_subscribe(SubscriptionHandle::Push(this));

        let source = {
            let state = self.state.lock();
            if state.phase != Phase::Active {
                return;
            }
            state.source.clone()
        };
        if let Some(source) = source {
            source.start();
            if source.is_fused() {
                self.drain();
            }
        }
    }

    fn on_next(&self, element: T) {
        let source = {
            let state = self.state.lock();
            if state.phase == Phase::Active {
                state.source.clone()
            } else {
                None
            }
        };
        let Some(source) = source else {
            log_debug!("filter_when: dropping element received outside the active phase");
            return;
        };

        if source.offer(element).is_err() {
            let error = if source.is_fused() {
                log_warn!("filter_when: fused upstream {} pushed an element", source.name());
                BackfluxError::stream_error("fused upstream pushed an element")
            } else {
                BackfluxError::resource_limit(QUEUE_RESOURCE, self.prefetch.capacity())
            };
            self.fail_fast(error);
            return;
        }
        self.drain();
    }

    fn on_error(&self, error: BackfluxError) {
        {
            let mut state = self.state.lock();
            if state.phase != Phase::Active || state.upstream_done {
                drop(state);
                log_debug!("filter_when: upstream error after termination");
                dispatch_dropped(self.error_hook.as_ref(), error);
                return;
            }
            state.upstream_done = true;
            state.upstream_error = Some(error);
        }
        self.drain();
    }

    fn on_complete(&self) {
        {
            let mut state = self.state.lock();
            if state.phase != Phase::Active || state.upstream_done {
                return;
            }
            state.upstream_done = true;
        }
        self.drain();
    }

    fn name(&self) -> &'static str {
        "FilterWhen"
    }
}

impl<T: Send + 'static> Subscription for FilterWhenEngine<T> {
    fn request(&self, n: u64) {
        if n == 0 {
            log_warn!(
                "filter_when: {} requested 0 elements; ignoring",
                self.actual.name()
            );
            return;
        }
        {
            let mut state = self.state.lock();
            if state.phase == Phase::Cancelled {
                return;
            }
            state.demand = state.demand.add(n);
        }
        self.drain();
    }

    fn cancel(&self) {
        let (released, source) = {
            let mut state = self.state.lock();
            if state.phase.is_terminal() {
                return;
            }
            state.phase = Phase::Cancelled;
            (state.active.take(), state.source.take())
        };
        log_trace!("filter_when: cancelled");

        if let Some(inner) = released.release() {
            inner.cancel();
        }
        if let Some(source) = source {
            source.cancel();
            source.clear();
        }
    }

    fn name(&self) -> &'static str {
        "FilterWhen"
    }

    fn snapshot(&self) -> Option<OperatorSnapshot> {
        let actual = self.actual.name();
        let state = self.state.lock();
        let queued = state.source.as_ref().map_or(0, |source| source.buffered());
        Some(OperatorSnapshot {
            parent: state.parent_name,
            actual,
            prefetch: self.prefetch.get(),
            capacity: self.prefetch.capacity(),
            buffered: queued + usize::from(state.active.is_occupied()),
            requested_from_downstream: state.demand,
            error: state.error.clone(),
            cancelled: state.phase == Phase::Cancelled,
            terminated: matches!(state.phase, Phase::Completed | Phase::Errored),
            fused: state.fused,
        })
    }
}

impl<T: Send + 'static> VerdictSink for FilterWhenEngine<T> {
    fn on_verdict(&self, generation: u64, verdict: Verdict) {
        {
            let mut state = self.state.lock();
            if state.phase != Phase::Active || !state.active.settle(generation, verdict) {
                log_debug!("filter_when: ignoring stale verdict #{}", generation);
                return;
            }
        }
        self.drain();
    }

    fn on_predicate_error(&self, generation: u64, error: BackfluxError) {
        let current = {
            let state = self.state.lock();
            state.phase == Phase::Active && state.active.is_evaluating(generation)
        };
        if current {
            self.fail_fast(error);
        } else {
            dispatch_dropped(self.error_hook.as_ref(), error);
        }
    }
}

fn panic_error(payload: &(dyn Any + Send)) -> BackfluxError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "predicate panicked".to_string());
    BackfluxError::callback_panic(message)
}
