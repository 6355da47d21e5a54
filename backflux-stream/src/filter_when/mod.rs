// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The `filter_when` operator: filtering by asynchronous verdicts.
//!
//! Every upstream element is handed to a predicate that returns a publisher of
//! `bool`. The first value that publisher produces decides whether the element
//! is kept; completing without a value drops it. Elements are evaluated one at
//! a time, so survivors keep their original order.
//!
//! # Behavior
//!
//! - Keeps `prefetch` elements requested from upstream and buffers up to
//!   `prefetch + 1` of them
//! - Never emits more than downstream requested; a passed element waits for demand
//! - Cancels a verdict source after its first value
//! - Polls upstream directly when it offers a pollable queue, and skips
//!   subscribing to verdict sources that can answer synchronously
//! - Upstream errors are delivered after the buffered elements; predicate
//!   failures terminate immediately
//! - Errors arriving after termination go to the configured [`ErrorHook`]
//!
//! # Examples
//!
//! ```
//! use backflux_core::PublisherExt;
//! use backflux_stream::FilterWhenExt;
//! use backflux_test_utils::{just, range, TestSubscriber};
//!
//! let evens = range(1, 10).filter_when(|v: &i32| just(v % 2 == 0).boxed());
//! let subscriber = TestSubscriber::unbounded();
//! backflux_core::Publisher::subscribe(&evens, subscriber.as_subscriber());
//!
//! assert_eq!(subscriber.values(), vec![2, 4, 6, 8, 10]);
//! assert!(subscriber.is_completed());
//! ```
//!
//! [`ErrorHook`]: backflux_core::ErrorHook

mod active_slot;
mod config;
mod element_source;
mod engine;
mod inner;
mod predicate;

pub use self::config::FilterWhenConfig;
pub use self::predicate::{AsyncPredicate, IntoPredicateSource};

use self::engine::FilterWhenEngine;
use backflux_core::{Publisher, Result, Subscriber};
use std::sync::Arc;

/// Extension trait providing `filter_when` for any [`Publisher`].
pub trait FilterWhenExt<T>: Publisher<T> + Sized
where
    T: Send + 'static,
{
    /// Keeps the elements whose verdict source first yields `true`.
    ///
    /// Uses the default prefetch of [`DEFAULT_PREFETCH`](backflux_core::DEFAULT_PREFETCH).
    fn filter_when<F, R>(self, predicate: F) -> FilterWhen<Self, T>
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: IntoPredicateSource + 'static,
    {
        self.filter_when_with_config(predicate, FilterWhenConfig::default())
    }

    /// Like [`filter_when`](Self::filter_when), keeping `buffer_size` elements
    /// requested from upstream.
    ///
    /// # Errors
    ///
    /// Returns [`BackfluxError::InvalidConfiguration`](backflux_core::BackfluxError::InvalidConfiguration)
    /// when `buffer_size` is zero.
    fn filter_when_buffered<F, R>(self, predicate: F, buffer_size: usize) -> Result<FilterWhen<Self, T>>
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: IntoPredicateSource + 'static,
    {
        Ok(self.filter_when_with_config(predicate, FilterWhenConfig::new(buffer_size)?))
    }

    fn filter_when_with_config<F, R>(self, predicate: F, config: FilterWhenConfig) -> FilterWhen<Self, T>
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: IntoPredicateSource + 'static,
    {
        FilterWhen {
            source: self,
            predicate: Arc::new(predicate),
            config,
        }
    }
}

impl<T, P> FilterWhenExt<T> for P
where
    T: Send + 'static,
    P: Publisher<T>,
{
}

/// Publisher returned by [`FilterWhenExt::filter_when`].
///
/// Each subscription runs its own engine; the operator itself holds no state.
pub struct FilterWhen<P, T> {
    source: P,
    predicate: Arc<dyn AsyncPredicate<T>>,
    config: FilterWhenConfig,
}

impl<P, T> FilterWhen<P, T> {
    #[must_use]
    pub const fn config(&self) -> &FilterWhenConfig {
        &self.config
    }
}

impl<P, T> Publisher<T> for FilterWhen<P, T>
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        let engine = FilterWhenEngine::new(
            Arc::clone(&self.predicate),
            subscriber,
            self.config.prefetch,
            Arc::clone(&self.config.error_hook),
        );
        self.source.subscribe(engine);
    }
}
