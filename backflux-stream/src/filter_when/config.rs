// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{ErrorHook, LogErrorHook, Prefetch, Result};
use std::fmt;
use std::sync::Arc;

/// Settings for one `filter_when` operator.
#[derive(Clone)]
pub struct FilterWhenConfig {
    pub(crate) prefetch: Prefetch,
    pub(crate) error_hook: Arc<dyn ErrorHook>,
}

impl FilterWhenConfig {
    /// Configuration with the given buffer size and the logging error hook.
    ///
    /// # Errors
    ///
    /// Returns [`BackfluxError::InvalidConfiguration`](backflux_core::BackfluxError::InvalidConfiguration)
    /// when `buffer_size` is zero.
    pub fn new(buffer_size: usize) -> Result<Self> {
        Ok(Self {
            prefetch: Prefetch::new(buffer_size)?,
            error_hook: Arc::new(LogErrorHook),
        })
    }

    /// Routes errors that arrive after termination to `hook`.
    #[must_use]
    pub fn with_error_hook(mut self, hook: impl ErrorHook + 'static) -> Self {
        self.error_hook = Arc::new(hook);
        self
    }

    /// Like [`with_error_hook`](Self::with_error_hook), for an already shared hook.
    #[must_use]
    pub fn with_shared_error_hook(mut self, hook: Arc<dyn ErrorHook>) -> Self {
        self.error_hook = hook;
        self
    }

    #[must_use]
    pub const fn prefetch(&self) -> Prefetch {
        self.prefetch
    }
}

impl Default for FilterWhenConfig {
    fn default() -> Self {
        Self {
            prefetch: Prefetch::default(),
            error_hook: Arc::new(LogErrorHook),
        }
    }
}

impl fmt::Debug for FilterWhenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterWhenConfig")
            .field("prefetch", &self.prefetch.get())
            .finish_non_exhaustive()
    }
}
