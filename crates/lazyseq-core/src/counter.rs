//! Bounded counter.

use std::iter::FusedIterator;

use crate::state::{Lifecycle, ProducerState};

/// Lazy counter yielding `1..=bound`.
///
/// The size hint is exact whenever the remaining count fits in `usize`.
///
/// # Example
/// ```
/// use lazyseq_core::counter::count_to;
/// let counted: Vec<u64> = count_to(5).collect();
/// assert_eq!(counted, [1, 2, 3, 4, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct CountTo {
    cursor: u64,
    bound: u64,
    state: ProducerState,
}

/// Count from 1 up to and including `bound`. A bound of zero yields nothing.
#[must_use]
pub fn count_to(bound: u64) -> CountTo {
    CountTo::new(bound)
}

impl CountTo {
    /// Counter over `1..=bound`, positioned before the first value.
    #[must_use]
    pub fn new(bound: u64) -> Self {
        Self {
            cursor: 0,
            bound,
            state: ProducerState::NotStarted,
        }
    }

    /// The last value that was produced, or 0 before the first pull.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Values still to come, as a `u64` so it is exact on every target.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        if self.state.is_terminal() {
            0
        } else {
            self.bound - self.cursor
        }
    }

    /// Stop counting. Later pulls yield nothing.
    pub fn abandon(&mut self) {
        self.state.advance(ProducerState::Abandoned);
    }
}

impl Iterator for CountTo {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminal() {
            return None;
        }
        if self.cursor < self.bound {
            self.cursor += 1;
            self.state = ProducerState::Producing;
            Some(self.cursor)
        } else {
            self.state = ProducerState::Exhausted;
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state.is_terminal() {
            return (0, Some(0));
        }
        match usize::try_from(self.remaining()) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for CountTo {}

impl Lifecycle for CountTo {
    fn state(&self) -> ProducerState {
        self.state
    }
}
