//! Default sizes and fixed data shared by the producers.

/// Default `BufReader` capacity when a line reader opens a path.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Default chunk size for eager reads.
///
/// A forced close is observed at chunk boundaries, so this bounds how much
/// an eager read can still pull in after the source was invalidated.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;

/// Weekday names in enumeration order.
pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
