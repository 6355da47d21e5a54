// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::inner::PredicateInner;
use std::sync::Arc;

/// Resolved outcome of one predicate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Pass,
    Reject,
}

impl Verdict {
    /// A missing value rejects.
    pub(crate) const fn from_value(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Pass,
            Some(false) | None => Self::Reject,
        }
    }
}

/// The single element currently owned by the engine outside its queue.
pub(crate) enum ActiveSlot<T> {
    Idle,
    /// Waiting for the predicate source subscribed as `inner`.
    Evaluating {
        element: T,
        generation: u64,
        inner: Arc<PredicateInner>,
    },
    /// Verdict known; a passing element waits here for downstream demand.
    Settled { element: T, verdict: Verdict },
}

impl<T> ActiveSlot<T> {
    pub(crate) const fn is_occupied(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Settles the evaluation identified by `generation`.
    ///
    /// Returns `false` if the slot holds anything else.
    pub(crate) fn settle(&mut self, generation: u64, verdict: Verdict) -> bool {
        match std::mem::replace(self, Self::Idle) {
            Self::Evaluating {
                element,
                generation: current,
                ..
            } if current == generation => {
                *self = Self::Settled { element, verdict };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    /// Returns `true` while the evaluation identified by `generation` is pending.
    pub(crate) fn is_evaluating(&self, generation: u64) -> bool {
        matches!(self, Self::Evaluating { generation: current, .. } if *current == generation)
    }

    /// Empties the slot, handing back what it held.
    pub(crate) fn take(&mut self) -> Self {
        std::mem::replace(self, Self::Idle)
    }

    /// Releases the held element, returning the pending evaluation so it can be cancelled.
    pub(crate) fn release(self) -> Option<Arc<PredicateInner>> {
        match self {
            Self::Evaluating { inner, .. } => Some(inner),
            Self::Idle | Self::Settled { .. } => None,
        }
    }
}
