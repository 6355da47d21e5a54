// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::subscription::SubscriptionHandle;
use backflux_error::BackfluxError;

/// Consumer side of the push/demand protocol.
///
/// A publisher calls `on_subscribe` exactly once, then `on_next` no more often
/// than the subscriber requested, then at most one of `on_error` or
/// `on_complete`. Calls for one subscription never overlap.
pub trait Subscriber<T>: Send + Sync {
    fn on_subscribe(&self, subscription: SubscriptionHandle<T>);

    fn on_next(&self, value: T);

    fn on_error(&self, error: BackfluxError);

    fn on_complete(&self);

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
