// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{BackfluxError, BoxPublisher, Result};

/// Turns a predicate function's return value into a verdict source.
///
/// Predicates may return the source directly, or signal that they could not
/// produce one: `None` becomes [`BackfluxError::InvalidPredicateResult`] and
/// `Err(e)` fails the sequence with `e` unchanged.
pub trait IntoPredicateSource {
    /// # Errors
    ///
    /// Returns the failure carried by, or implied by, the value.
    fn into_predicate_source(self) -> Result<BoxPublisher<bool>>;
}

impl IntoPredicateSource for BoxPublisher<bool> {
    fn into_predicate_source(self) -> Result<BoxPublisher<bool>> {
        Ok(self)
    }
}

impl IntoPredicateSource for Option<BoxPublisher<bool>> {
    fn into_predicate_source(self) -> Result<BoxPublisher<bool>> {
        self.ok_or_else(|| BackfluxError::invalid_predicate_result("predicate returned no source"))
    }
}

impl IntoPredicateSource for Result<BoxPublisher<bool>> {
    fn into_predicate_source(self) -> Result<BoxPublisher<bool>> {
        self
    }
}

impl IntoPredicateSource for Result<Option<BoxPublisher<bool>>> {
    fn into_predicate_source(self) -> Result<BoxPublisher<bool>> {
        self?.into_predicate_source()
    }
}

/// Produces the verdict source for one element.
///
/// Implemented for every `Fn(&T) -> R` where `R: IntoPredicateSource`.
pub trait AsyncPredicate<T>: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when no source can be produced for `element`.
    fn evaluate(&self, element: &T) -> Result<BoxPublisher<bool>>;
}

impl<T, F, R> AsyncPredicate<T> for F
where
    F: Fn(&T) -> R + Send + Sync,
    R: IntoPredicateSource,
{
    fn evaluate(&self, element: &T) -> Result<BoxPublisher<bool>> {
        self(element).into_predicate_source()
    }
}
