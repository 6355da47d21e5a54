// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Demand-regulated operators for backflux publishers.
//!
//! Operators here sit between a [`Publisher`](backflux_core::Publisher) and a
//! [`Subscriber`](backflux_core::Subscriber) and honour the demand protocol on
//! both sides: they never push more than was requested downstream, and they
//! bound what they request upstream.
//!
//! - **[`filter_when`](FilterWhenExt::filter_when)**: keeps elements whose
//!   asynchronous verdict is `true`, in order and one evaluation at a time
//! - **[`into_stream`](IntoStreamExt::into_stream)**: consumes any publisher as a
//!   `futures::Stream`
//!
//! Enable the `tracing` feature to route operator diagnostics through `tracing`.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;
pub mod filter_when;
pub mod into_stream;
pub mod prelude;

pub use filter_when::{
    AsyncPredicate, FilterWhen, FilterWhenConfig, FilterWhenExt, IntoPredicateSource,
};
pub use into_stream::{IntoStreamExt, PublisherStream};
