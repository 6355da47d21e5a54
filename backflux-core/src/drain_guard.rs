// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::atomic::{AtomicUsize, Ordering};

/// Serializes drain passes arriving from several threads.
///
/// Every signal that may require work calls [`DrainGuard::enter`]. Only the
/// caller that moves the counter away from zero runs the pass; everyone else
/// just records that work was missed, and the runner loops until no missed
/// work remains.
#[derive(Debug, Default)]
pub struct DrainGuard {
    wip: AtomicUsize,
}

impl DrainGuard {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wip: AtomicUsize::new(0),
        }
    }

    /// Registers pending work. Returns `true` if the caller must run the pass.
    pub fn enter(&self) -> bool {
        self.wip.fetch_add(1, Ordering::AcqRel) == 0
    }

    /// Acknowledges `missed` units of work and returns what arrived meanwhile.
    ///
    /// A return of zero means the guard is released.
    pub fn leave(&self, missed: usize) -> usize {
        self.wip.fetch_sub(missed, Ordering::AcqRel) - missed
    }

    /// Runs `pass` until no more work is pending, if this caller wins the guard.
    ///
    /// Returns `true` if this call ran at least one pass.
    pub fn run(&self, mut pass: impl FnMut()) -> bool {
        if !self.enter() {
            return false;
        }
        let mut missed = 1;
        loop {
            pass();
            missed = self.leave(missed);
            if missed == 0 {
                return true;
            }
        }
    }
}
