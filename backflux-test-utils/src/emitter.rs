// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{
    BackfluxError, Demand, QueueSubscription, Result, Subscriber, Subscription,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Demand-honouring subscription over a fixed list of items.
///
/// Items are pushed no faster than requested, followed by completion or the
/// trailing failure. Once the last item has been handed out the emitter is
/// finished: a later `cancel` is a no-op and is not counted.
pub struct Emitter<T> {
    label: &'static str,
    subscriber: Arc<dyn Subscriber<T>>,
    state: Mutex<EmitterState<T>>,
    cancellations: Option<Arc<AtomicUsize>>,
}

struct EmitterState<T> {
    items: VecDeque<T>,
    failure: Option<BackfluxError>,
    demand: Demand,
    emitting: bool,
    finished: bool,
    cancelled: bool,
    terminated: bool,
}

enum Signal<T> {
    Next(T),
    Complete,
    Error(BackfluxError),
}

impl<T: Send + 'static> Emitter<T> {
    pub fn new(
        label: &'static str,
        subscriber: Arc<dyn Subscriber<T>>,
        items: impl IntoIterator<Item = T>,
        failure: Option<BackfluxError>,
        cancellations: Option<Arc<AtomicUsize>>,
    ) -> Arc<Self> {
        let items: VecDeque<T> = items.into_iter().collect();
        Arc::new(Self {
            label,
            subscriber,
            state: Mutex::new(EmitterState {
                finished: items.is_empty() && failure.is_none(),
                items,
                failure,
                demand: Demand::NONE,
                emitting: false,
                cancelled: false,
                terminated: false,
            }),
            cancellations,
        })
    }

    /// Delivers signals that are currently allowed.
    ///
    /// Terminal signals need no demand, so an empty emitter finishes at once.
    pub fn drain(&self) {
        {
            let mut state = self.state.lock();
            if state.emitting {
                return;
            }
            state.emitting = true;
        }

        loop {
            let signal = {
                let mut state = self.state.lock();
                if state.cancelled || state.terminated {
                    state.emitting = false;
                    return;
                }
                if state.items.is_empty() {
                    state.terminated = true;
                    state.finished = true;
                    match state.failure.take() {
                        Some(error) => Signal::Error(error),
                        None => Signal::Complete,
                    }
                } else if state.demand.consume_one() {
                    let Some(item) = state.items.pop_front() else {
                        state.emitting = false;
                        return;
                    };
                    if state.items.is_empty() && state.failure.is_none() {
                        state.finished = true;
                    }
                    Signal::Next(item)
                } else {
                    state.emitting = false;
                    return;
                }
            };

            match signal {
                Signal::Next(item) => self.subscriber.on_next(item),
                Signal::Complete => self.subscriber.on_complete(),
                Signal::Error(error) => self.subscriber.on_error(error),
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }
}

impl<T: Send + 'static> Subscription for Emitter<T> {
    fn request(&self, n: u64) {
        {
            let mut state = self.state.lock();
            if state.cancelled || state.terminated {
                return;
            }
            state.demand = state.demand.add(n);
        }
        self.drain();
    }

    fn cancel(&self) {
        let mut state = self.state.lock();
        if state.finished || state.cancelled {
            return;
        }
        state.cancelled = true;
        state.items.clear();
        state.failure = None;
        drop(state);
        if let Some(counter) = &self.cancellations {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn name(&self) -> &'static str {
        self.label
    }
}

impl<T: Send + 'static> QueueSubscription<T> for Emitter<T> {
    fn poll_next(&self) -> Result<Option<T>> {
        let mut state = self.state.lock();
        if state.cancelled || state.terminated {
            return Ok(None);
        }
        if let Some(item) = state.items.pop_front() {
            if state.items.is_empty() && state.failure.is_none() {
                state.finished = true;
            }
            return Ok(Some(item));
        }
        state.terminated = true;
        state.finished = true;
        match state.failure.take() {
            Some(error) => Err(error),
            None => Ok(None),
        }
    }
}
