// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Publishers, subscribers and hooks for exercising backflux operators.
//!
//! Sources come in three flavours: synchronous ones built from known items
//! ([`iter`], [`range`], [`just`], [`empty`], [`fail`], [`from_fn`]), a
//! hand-driven [`ManualPublisher`], and the timer-based [`delayed`]. The
//! [`hide`] and [`record_requests`] wrappers control which shortcuts an operator
//! sees and what it asks for.

pub mod delayed;
pub mod emitter;
pub mod manual;
pub mod recording_error_hook;
pub mod sources;
pub mod test_subscriber;
pub mod wrappers;

pub use self::delayed::{delayed, delayed_empty, Delayed};
pub use self::emitter::Emitter;
pub use self::manual::ManualPublisher;
pub use self::recording_error_hook::RecordingErrorHook;
pub use self::sources::{
    create, empty, fail, from_fn, iter, just, range, Create, Empty, Fail, FromFn, IterPublisher,
    Just,
};
pub use self::test_subscriber::TestSubscriber;
pub use self::wrappers::{hide, record_requests, Hide, RecordRequests, RequestLog, TestPublisherExt};

/// A plain user error for assertions on error identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestError(pub &'static str);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "test error: {}", self.0)
    }
}

impl std::error::Error for TestError {}
