// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the backflux demand-regulated streaming library
//!
//! This crate defines the root [`BackfluxError`] type shared by every publisher,
//! subscriber and operator in the workspace. Errors travel through a pipeline as
//! terminal signals: at most one error reaches a subscriber, and errors that can
//! no longer be delivered are handed to an error hook instead.
//!
//! # Examples
//!
//! ```
//! use backflux_error::{BackfluxError, Result};
//!
//! fn validate(buffer_size: usize) -> Result<usize> {
//!     if buffer_size == 0 {
//!         return Err(BackfluxError::invalid_configuration("buffer size must be positive"));
//!     }
//!     Ok(buffer_size)
//! }
//!
//! assert!(validate(0).is_err());
//! ```

use std::sync::Arc;

/// Root error type for all backflux operations
///
/// The enum is cheap to clone: user errors are shared behind an [`Arc`], which lets
/// operators retain the terminal error for introspection while still delivering it
/// downstream.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackfluxError {
    /// Stream processing encountered an error
    ///
    /// This is a general error for stream operations that don't fit
    /// other specific categories.
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong during stream processing
        context: String,
    },

    /// A predicate function produced no usable source for an element
    #[error("Invalid predicate result: {context}")]
    InvalidPredicateResult {
        /// Description of the rejected predicate result
        context: String,
    },

    /// User-provided callback function panicked
    ///
    /// When a user-supplied closure panics while an operator drives it,
    /// the panic is caught and converted to this error variant.
    #[error("User callback panicked: {context}")]
    CallbackPanic {
        /// The panic payload, when it carried a message
        context: String,
    },

    /// An operator was configured with an unusable value
    #[error("Invalid configuration: {context}")]
    InvalidConfiguration {
        /// Which setting was rejected and why
        context: String,
    },

    /// Resource limit exceeded
    ///
    /// This indicates that a buffer, queue, or other bounded resource is full,
    /// typically because an upstream source ignored the demand it was granted.
    #[error("Resource limit exceeded: {resource} (limit: {limit})")]
    ResourceLimitExceeded {
        /// Name of the resource that hit its limit
        resource: String,
        /// The limit that was exceeded
        limit: usize,
    },

    /// Custom error from user code
    ///
    /// This wraps errors produced by user-provided functions and sources,
    /// allowing them to be propagated through the backflux error system.
    #[error("User error: {0}")]
    UserError(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl BackfluxError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Create an invalid predicate result error with the given context
    pub fn invalid_predicate_result(context: impl Into<String>) -> Self {
        Self::InvalidPredicateResult {
            context: context.into(),
        }
    }

    /// Create a callback panic error with the given context
    pub fn callback_panic(context: impl Into<String>) -> Self {
        Self::CallbackPanic {
            context: context.into(),
        }
    }

    /// Create an invalid configuration error with the given context
    pub fn invalid_configuration(context: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            context: context.into(),
        }
    }

    /// Create a resource limit exceeded error
    pub fn resource_limit(resource: impl Into<String>, limit: usize) -> Self {
        Self::ResourceLimitExceeded {
            resource: resource.into(),
            limit,
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Arc::new(error))
    }

    /// Returns `true` if both values are the same user error instance.
    ///
    /// Operators pass errors through untouched; this lets callers verify that
    /// the error they observe is the very one a source produced.
    #[must_use]
    pub fn is_same_user_error(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UserError(a), Self::UserError(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Specialized Result type for backflux operations
///
/// # Examples
///
/// ```
/// use backflux_error::Result;
///
/// fn process() -> Result<String> {
///     Ok("processed".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, BackfluxError>;

/// Extension trait for converting errors into `BackfluxError`
///
/// This trait is automatically implemented for all types that implement
/// `std::error::Error + Send + Sync + 'static`.
pub trait IntoBackfluxError {
    /// Convert this error into a `BackfluxError::UserError`
    fn into_backflux(self) -> BackfluxError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoBackfluxError for E {
    fn into_backflux(self) -> BackfluxError {
        BackfluxError::user_error(self)
    }
}
