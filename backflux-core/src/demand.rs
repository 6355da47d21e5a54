// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Request size that grants unbounded demand.
pub const UNBOUNDED: u64 = u64::MAX;

/// Outstanding demand granted by a subscriber but not yet fulfilled.
///
/// Demand only grows through [`Demand::add`] and only shrinks through
/// [`Demand::consume_one`]. Additions saturate into [`Demand::Unbounded`]
/// instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    /// Finite demand with remaining count.
    Finite(u64),
    /// Unbounded demand.
    Unbounded,
}

impl Default for Demand {
    fn default() -> Self {
        Self::NONE
    }
}

impl Demand {
    /// No outstanding demand.
    pub const NONE: Self = Self::Finite(0);

    /// Adds `n` to the demand, saturating to [`Demand::Unbounded`].
    #[must_use]
    pub const fn add(self, n: u64) -> Self {
        match self {
            Self::Unbounded => Self::Unbounded,
            Self::Finite(current) => match current.checked_add(n) {
                Some(total) if total != UNBOUNDED => Self::Finite(total),
                _ => Self::Unbounded,
            },
        }
    }

    /// Consumes a single unit of demand when available.
    #[must_use]
    pub fn consume_one(&mut self) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Finite(value) if *value > 0 => {
                *value -= 1;
                true
            }
            Self::Finite(_) => false,
        }
    }
}
