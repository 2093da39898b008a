//! Fixed weekday enumeration.

use std::iter::FusedIterator;

use crate::constants::WEEKDAYS;
use crate::state::{Lifecycle, ProducerState};

/// Re-iterable collection of weekday names, starting on Sunday.
///
/// Each call to [`DaysOfWeek::iter`] (or `into_iter`) starts a fresh,
/// independent traversal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DaysOfWeek;

impl DaysOfWeek {
    /// The week, starting on Sunday.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Start a new traversal.
    #[must_use]
    pub fn iter(&self) -> Days {
        Days {
            index: 0,
            state: ProducerState::NotStarted,
        }
    }
}

impl IntoIterator for DaysOfWeek {
    type Item = &'static str;
    type IntoIter = Days;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &DaysOfWeek {
    type Item = &'static str;
    type IntoIter = Days;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One traversal over [`DaysOfWeek`].
#[derive(Debug, Clone)]
pub struct Days {
    index: usize,
    state: ProducerState,
}

impl Iterator for Days {
    type Item = &'static str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminal() {
            return None;
        }
        if let Some(&day) = WEEKDAYS.get(self.index) {
            self.index += 1;
            self.state = ProducerState::Producing;
            Some(day)
        } else {
            self.state = ProducerState::Exhausted;
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.state.is_terminal() {
            0
        } else {
            WEEKDAYS.len() - self.index
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Days {}

impl FusedIterator for Days {}

impl Lifecycle for Days {
    fn state(&self) -> ProducerState {
        self.state
    }
}
