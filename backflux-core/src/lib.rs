// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Push/demand protocol primitives shared by backflux operators.
//!
//! A [`Publisher`] produces values for a [`Subscriber`] only up to the demand the
//! subscriber grants through its [`Subscription`]. Sources that can hand out their
//! buffered values synchronously additionally offer a [`QueueSubscription`], which
//! operators may poll directly instead of going through request/push round trips.

#[macro_use]
mod logging;

pub mod bounded_queue;
pub mod demand;
pub mod drain_guard;
pub mod error_hook;
pub mod operator_snapshot;
pub mod prefetch;
pub mod publisher;
pub mod stream_item;
pub mod subscriber;
pub mod subscription;

pub use self::bounded_queue::BoundedQueue;
pub use self::demand::{Demand, UNBOUNDED};
pub use self::drain_guard::DrainGuard;
pub use self::error_hook::{dispatch_dropped, ErrorHook, LogErrorHook};
pub use self::operator_snapshot::OperatorSnapshot;
pub use self::prefetch::{Prefetch, DEFAULT_PREFETCH};
pub use self::publisher::{BoxPublisher, Publisher, PublisherExt};
pub use self::stream_item::StreamItem;
pub use self::subscriber::Subscriber;
pub use self::subscription::{
    EmptySubscription, QueueSubscription, Subscription, SubscriptionHandle,
};
pub use backflux_error::{BackfluxError, IntoBackfluxError, Result};
