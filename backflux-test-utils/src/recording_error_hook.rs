// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{BackfluxError, ErrorHook};
use parking_lot::Mutex;
use std::sync::Arc;

/// Error hook that keeps every error it is given.
#[derive(Clone, Default)]
pub struct RecordingErrorHook {
    errors: Arc<Mutex<Vec<BackfluxError>>>,
}

impl RecordingErrorHook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<BackfluxError> {
        self.errors.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.errors.lock().len()
    }
}

impl ErrorHook for RecordingErrorHook {
    fn on_error_dropped(&self, error: BackfluxError) {
        self.errors.lock().push(error);
    }
}
