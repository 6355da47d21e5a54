// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_error::BackfluxError;

/// An element of a bridged stream: a value, or the error that ended it.
#[derive(Debug, Clone)]
pub enum StreamItem<T> {
    Value(T),
    /// Terminal error; nothing follows it.
    Error(BackfluxError),
}

impl<T: PartialEq> PartialEq for StreamItem<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> StreamItem<T> {
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Converts to `Option<T>`, discarding errors.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Error(_) => None,
        }
    }

    /// Converts to `Option<BackfluxError>`, discarding values.
    pub fn err(self) -> Option<BackfluxError> {
        match self {
            Self::Value(_) => None,
            Self::Error(e) => Some(e),
        }
    }

    /// Maps the value, passing errors through unchanged.
    pub fn map<U, F>(self, f: F) -> StreamItem<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Value(v) => StreamItem::Value(f(v)),
            Self::Error(e) => StreamItem::Error(e),
        }
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the carried error for `StreamItem::Error`.
    pub fn into_result(self) -> backflux_error::Result<T> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Error(e) => Err(e),
        }
    }
}

impl<T> From<backflux_error::Result<T>> for StreamItem<T> {
    fn from(result: backflux_error::Result<T>) -> Self {
        match result {
            Ok(v) => Self::Value(v),
            Err(e) => Self::Error(e),
        }
    }
}
