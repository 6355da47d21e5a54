// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::operator_snapshot::OperatorSnapshot;
use backflux_error::Result;
use std::sync::Arc;

/// Link between one publisher and one subscriber.
///
/// Both methods may be called from any thread, including from inside the
/// subscriber's own callbacks. `cancel` is idempotent.
pub trait Subscription: Send + Sync {
    /// Grants `n` more elements. [`crate::UNBOUNDED`] lifts the limit entirely.
    fn request(&self, n: u64);

    fn cancel(&self);

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Live counters, for operators that support introspection.
    fn snapshot(&self) -> Option<OperatorSnapshot> {
        None
    }
}

/// A source whose buffered elements can be taken synchronously.
///
/// Polling replaces both `request` and push delivery: `Ok(Some)` is the next
/// element, `Ok(None)` means the source is exhausted, and `Err` is its
/// terminal error.
pub trait QueueSubscription<T>: Send + Sync {
    /// # Errors
    ///
    /// Returns the source's terminal error.
    fn poll_next(&self) -> Result<Option<T>>;
}

/// What a publisher hands its subscriber in `on_subscribe`.
pub enum SubscriptionHandle<T> {
    /// Elements arrive through `on_next` as demand allows.
    Push(Arc<dyn Subscription>),
    /// Elements may also be polled directly from `queue`.
    Fused {
        subscription: Arc<dyn Subscription>,
        queue: Arc<dyn QueueSubscription<T>>,
    },
}

impl<T> SubscriptionHandle<T> {
    pub fn push<S: Subscription + 'static>(subscription: Arc<S>) -> Self {
        Self::Push(subscription)
    }

    /// Builds a fused handle from a type that implements both capabilities.
    pub fn fused<S>(subscription: Arc<S>) -> Self
    where
        S: Subscription + QueueSubscription<T> + 'static,
    {
        Self::Fused {
            subscription: subscription.clone(),
            queue: subscription,
        }
    }

    #[must_use]
    pub fn subscription(&self) -> &Arc<dyn Subscription> {
        match self {
            Self::Push(subscription) | Self::Fused { subscription, .. } => subscription,
        }
    }

    /// Forgets the polling capability.
    #[must_use]
    pub fn into_push(self) -> Arc<dyn Subscription> {
        match self {
            Self::Push(subscription) | Self::Fused { subscription, .. } => subscription,
        }
    }

    #[must_use]
    pub const fn is_fused(&self) -> bool {
        matches!(self, Self::Fused { .. })
    }

    pub fn request(&self, n: u64) {
        self.subscription().request(n);
    }

    pub fn cancel(&self) {
        self.subscription().cancel();
    }

    pub fn name(&self) -> &'static str {
        self.subscription().name()
    }

    pub fn snapshot(&self) -> Option<OperatorSnapshot> {
        self.subscription().snapshot()
    }
}

impl<T> Clone for SubscriptionHandle<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Push(subscription) => Self::Push(Arc::clone(subscription)),
            Self::Fused {
                subscription,
                queue,
            } => Self::Fused {
                subscription: Arc::clone(subscription),
                queue: Arc::clone(queue),
            },
        }
    }
}

impl<T> std::fmt::Debug for SubscriptionHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("name", &self.name())
            .field("fused", &self.is_fused())
            .finish()
    }
}

/// Subscription that ignores every call, for sources that finish immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {}
}
