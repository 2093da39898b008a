//! Reader options and configuration loading.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUFFER_CAPACITY, DEFAULT_CHUNK_SIZE};

/// Options for line readers and eager sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// `BufReader` capacity used when opening a path.
    pub buffer_capacity: usize,
    /// Bytes pulled per chunk by an eager read.
    pub chunk_size: usize,
    /// Replace invalid UTF-8 with U+FFFD instead of failing.
    pub lossy_utf8: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            lossy_utf8: false,
        }
    }
}

impl ReaderOptions {
    /// Normalize options, applying defaults where sizes are zero.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.buffer_capacity == 0 {
            self.buffer_capacity = DEFAULT_BUFFER_CAPACITY;
        }
        if self.chunk_size == 0 {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        self
    }

    /// Load options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::normalize)
    }
}
