//! # lazyseq-core
//!
//! Lazy sequence producers: elements are produced one at a time, on demand,
//! and the consumer may stop at any point. Held resources are released on
//! every exit path: exhaustion, failure, or abandonment.
//!
//! The eager counterpart, [`source::ClosableSource`], has no suspension
//! point and can only be stopped by closing its source from another thread.

pub mod budget;
pub mod cancel;
pub mod constants;
pub mod counter;
pub mod days;
pub mod error;
pub mod generator;
pub mod lines;
pub mod options;
pub mod source;
pub mod state;

// Re-exports
pub use budget::{BudgetExt, TimeBudget};
pub use cancel::{CancelTimer, CancellationToken};
pub use counter::{count_to, CountTo};
pub use days::{Days, DaysOfWeek};
pub use error::{Result, YieldError};
pub use generator::{Generator, Yielder};
pub use lines::{lines, lines_with, LineReader};
pub use options::ReaderOptions;
pub use source::{read_lines_eagerly, ClosableSource, CloseHandle};
pub use state::{Lifecycle, ProducerState};
