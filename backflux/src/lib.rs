// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Backflux
//!
//! Demand-regulated reactive publishers and an asynchronous, backpressured
//! `filter_when` operator.
//!
//! ## Overview
//!
//! A [`Publisher`] pushes values to a [`Subscriber`] only as far as the
//! subscriber asked for through its [`Subscription`]. Operators sit in between
//! and honour that contract on both sides.
//!
//! [`filter_when`](FilterWhenExt::filter_when) keeps an element when the
//! publisher of `bool` returned for it first yields `true`. Verdicts may arrive
//! at any time and on any thread; elements are evaluated one at a time and
//! survivors keep their upstream order.
//!
//! ## Crates
//!
//! - `backflux-error`: the [`BackfluxError`] type
//! - `backflux-core`: the publisher protocol, demand accounting and error hooks
//! - `backflux-stream`: operators and the `futures::Stream` bridge
//!
//! ## Quick Start
//!
//! ```rust
//! use backflux::prelude::*;
//! use backflux_test_utils::{just, range, TestSubscriber};
//!
//! let evens = range(1, 6).filter_when(|v: &i32| just(v % 2 == 0).boxed());
//! let subscriber = TestSubscriber::new(2);
//! evens.subscribe(subscriber.as_subscriber());
//!
//! assert_eq!(subscriber.values(), vec![2, 4]);
//! ```

pub use backflux_core::{
    BoxPublisher, Demand, ErrorHook, LogErrorHook, OperatorSnapshot, Prefetch, Publisher,
    PublisherExt, QueueSubscription, StreamItem, Subscriber, Subscription, SubscriptionHandle,
    DEFAULT_PREFETCH, UNBOUNDED,
};
pub use backflux_error::{BackfluxError, IntoBackfluxError, Result};
pub use backflux_stream::{
    AsyncPredicate, FilterWhen, FilterWhenConfig, FilterWhenExt, IntoPredicateSource,
    IntoStreamExt, PublisherStream,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use backflux_core::{
        BoxPublisher, ErrorHook, Publisher, PublisherExt, StreamItem, Subscriber, Subscription,
    };
    pub use backflux_error::{BackfluxError, Result};
    pub use backflux_stream::{FilterWhenConfig, FilterWhenExt, IntoPredicateSource, IntoStreamExt};
}
