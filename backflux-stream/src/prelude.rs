// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude re-exporting the operator extension traits and protocol types.
//!
//! ```
//! use backflux_stream::prelude::*;
//! ```

pub use crate::filter_when::{FilterWhenConfig, FilterWhenExt, IntoPredicateSource};
pub use crate::into_stream::IntoStreamExt;
pub use backflux_core::{
    BackfluxError, BoxPublisher, Publisher, PublisherExt, StreamItem, Subscriber, Subscription,
};
