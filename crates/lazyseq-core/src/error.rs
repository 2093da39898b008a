//! Error type shared by every producer.

use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Errors surfaced to the consumer pulling from a producer.
///
/// I/O causes are held behind an `Arc` so the error stays `Clone`; a failed
/// producer keeps its failure around for later inspection.
#[derive(Debug, Clone, thiserror::Error)]
pub enum YieldError {
    /// The backing source could not be opened or a read against it failed.
    #[error("source unavailable ({context}): {source}")]
    SourceUnavailable {
        context: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// A consumer-imposed wall-clock budget ran out.
    #[error("time budget of {0:?} exceeded")]
    TimeoutExceeded(Duration),

    /// The consumer stopped pulling from a generator.
    #[error("consumer abandoned the sequence")]
    Abandoned,
}

impl YieldError {
    /// Wrap an I/O error with a short description of what was attempted.
    pub fn source_unavailable(context: impl Into<String>, source: io::Error) -> Self {
        Self::SourceUnavailable {
            context: context.into(),
            source: Arc::new(source),
        }
    }

    /// The error an eager read reports after its source was closed underneath it.
    pub(crate) fn closed(context: impl Into<String>) -> Self {
        Self::source_unavailable(context, io::Error::other("source was closed"))
    }

    /// Whether this error came from the backing source.
    #[must_use]
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }

    /// The underlying I/O error kind, if any.
    #[must_use]
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::SourceUnavailable { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Result alias for producer operations.
pub type Result<T> = std::result::Result<T, YieldError>;
