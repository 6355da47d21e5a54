// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_error::BackfluxError;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Receives errors that can no longer be delivered to any subscriber.
///
/// An operator that has already terminated still hears from sources it
/// subscribed to earlier. Errors arriving that late are handed to the hook the
/// operator was built with. Implementations are best-effort observers: they
/// must not block and should not panic.
///
/// Any `Fn(BackfluxError) + Send + Sync` closure is a hook.
pub trait ErrorHook: Send + Sync {
    fn on_error_dropped(&self, error: BackfluxError);
}

impl<F> ErrorHook for F
where
    F: Fn(BackfluxError) + Send + Sync,
{
    fn on_error_dropped(&self, error: BackfluxError) {
        self(error);
    }
}

/// Default hook: logs the dropped error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorHook;

impl ErrorHook for LogErrorHook {
    fn on_error_dropped(&self, error: BackfluxError) {
        log_error!("backflux: dropped error after termination: {}", error);
    }
}

/// Invokes `hook`, containing any panic it raises.
pub fn dispatch_dropped(hook: &dyn ErrorHook, error: BackfluxError) {
    if catch_unwind(AssertUnwindSafe(|| hook.on_error_dropped(error))).is_err() {
        log_warn!("backflux: error hook panicked; dropped error discarded");
    }
}
