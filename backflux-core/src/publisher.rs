// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::subscriber::Subscriber;
use backflux_error::Result;
use std::sync::Arc;

/// Producer side of the push/demand protocol.
pub trait Publisher<T>: Send + Sync {
    /// Starts a new, independent run for `subscriber`.
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>);

    /// Computes the publisher's single outcome without subscribing, if it can.
    ///
    /// `Some(Ok(Some(v)))` is one value then completion, `Some(Ok(None))` is
    /// empty and `Some(Err(e))` is a failure. `None` means a subscription is
    /// required.
    fn try_scalar(&self) -> Option<Result<Option<T>>> {
        None
    }
}

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        (**self).subscribe(subscriber);
    }

    fn try_scalar(&self) -> Option<Result<Option<T>>> {
        (**self).try_scalar()
    }
}

/// A shared, type-erased publisher.
pub type BoxPublisher<T> = Arc<dyn Publisher<T>>;

pub trait PublisherExt<T>: Publisher<T> + Sized + 'static {
    /// Erases the publisher's type.
    fn boxed(self) -> BoxPublisher<T> {
        Arc::new(self)
    }
}

impl<T, P> PublisherExt<T> for P where P: Publisher<T> + Sized + 'static {}
