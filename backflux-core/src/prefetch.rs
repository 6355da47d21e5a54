// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_error::{BackfluxError, Result};

/// Buffer size used when the caller does not choose one.
pub const DEFAULT_PREFETCH: usize = 256;

/// A validated, non-zero prefetch amount.
///
/// Prefetch is the number of elements an operator keeps requested from its
/// upstream. The operator's queue holds one element more than that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefetch(usize);

impl Prefetch {
    /// Validates a buffer size.
    ///
    /// # Errors
    ///
    /// Returns [`BackfluxError::InvalidConfiguration`] when `buffer_size` is zero.
    pub fn new(buffer_size: usize) -> Result<Self> {
        if buffer_size == 0 {
            return Err(BackfluxError::invalid_configuration(
                "buffer size must be greater than zero",
            ));
        }
        Ok(Self(buffer_size))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Queue capacity: prefetch plus one slot for an overlapping delivery.
    #[must_use]
    pub const fn capacity(self) -> usize {
        self.0.saturating_add(1)
    }

    /// The prefetch as a request amount.
    #[must_use]
    pub const fn request_size(self) -> u64 {
        self.0 as u64
    }
}

impl Default for Prefetch {
    fn default() -> Self {
        Self(DEFAULT_PREFETCH)
    }
}
