//! Producer lifecycle.

use std::fmt;

/// Where a producer is in its single traversal.
///
/// `NotStarted → Producing → (Exhausted | Failed | Abandoned)`. The last
/// three are terminal: a producer in one of them never yields again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProducerState {
    /// Created but never pulled.
    NotStarted,
    /// At least one element has been produced and more may follow.
    Producing,
    /// Every element was produced.
    Exhausted,
    /// A production step failed.
    Failed,
    /// The consumer stopped early.
    Abandoned,
}

impl ProducerState {
    /// Whether no further elements can be produced.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed | Self::Abandoned)
    }

    /// Move to `next`, unless already terminal.
    pub(crate) fn advance(&mut self, next: Self) {
        if !self.is_terminal() {
            *self = next;
        }
    }
}

impl fmt::Display for ProducerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::Producing => "producing",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

/// Implemented by every producer so consumers can inspect its lifecycle.
pub trait Lifecycle {
    /// Current lifecycle state.
    fn state(&self) -> ProducerState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!ProducerState::NotStarted.is_terminal());
        assert!(!ProducerState::Producing.is_terminal());
        assert!(ProducerState::Exhausted.is_terminal());
        assert!(ProducerState::Failed.is_terminal());
        assert!(ProducerState::Abandoned.is_terminal());
    }

    #[test]
    fn advance_stops_at_terminal() {
        let mut state = ProducerState::NotStarted;
        state.advance(ProducerState::Producing);
        assert_eq!(state, ProducerState::Producing);
        state.advance(ProducerState::Exhausted);
        state.advance(ProducerState::Producing);
        assert_eq!(state, ProducerState::Exhausted);
    }

    #[test]
    fn display() {
        assert_eq!(ProducerState::Abandoned.to_string(), "abandoned");
    }
}
