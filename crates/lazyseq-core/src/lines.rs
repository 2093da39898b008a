//! Lazy line reader.
//!
//! The reader opens its source on the first pull, hands out one line per
//! pull, and releases the source exactly once: at end of input, on the first
//! failure, or when the consumer abandons the traversal (explicitly or by
//! dropping the reader).

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, YieldError};
use crate::options::ReaderOptions;
use crate::state::{Lifecycle, ProducerState};

type Opener<R> = Box<dyn FnOnce() -> io::Result<R> + Send>;

/// Stream the lines of the file at `path` with default options.
pub fn lines(path: impl AsRef<Path>) -> LineReader<BufReader<File>> {
    lines_with(path, &ReaderOptions::default())
}

/// Stream the lines of the file at `path`.
///
/// Nothing is opened until the first pull; a missing file shows up as the
/// first element, `Err(YieldError::SourceUnavailable)`.
pub fn lines_with(path: impl AsRef<Path>, opts: &ReaderOptions) -> LineReader<BufReader<File>> {
    let path = path.as_ref().to_path_buf();
    let opts = opts.clone().normalize();
    let capacity = opts.buffer_capacity;
    let name = path.display().to_string();
    let opener: Opener<BufReader<File>> = Box::new(move || {
        File::open(&path).map(|file| BufReader::with_capacity(capacity, file))
    });
    LineReader {
        name,
        opener: Some(opener),
        reader: None,
        buf: Vec::new(),
        lossy_utf8: opts.lossy_utf8,
        state: ProducerState::NotStarted,
        failure: None,
        lines_read: 0,
    }
}

/// Lazy producer of text lines.
///
/// Line terminators (`\n` and `\r\n`) are stripped. Once the reader reaches
/// a terminal state every further pull returns `None`; a failure is reported
/// once and stays available through [`LineReader::failure`].
pub struct LineReader<R> {
    name: String,
    opener: Option<Opener<R>>,
    reader: Option<R>,
    buf: Vec<u8>,
    lossy_utf8: bool,
    state: ProducerState,
    failure: Option<YieldError>,
    lines_read: u64,
}

impl<R: BufRead> LineReader<R> {
    /// Read lines from an already open source.
    pub fn from_reader(reader: R) -> Self {
        Self::from_reader_with(reader, &ReaderOptions::default())
    }

    /// Read lines from an already open source with explicit options.
    pub fn from_reader_with(reader: R, opts: &ReaderOptions) -> Self {
        Self {
            name: "reader".to_string(),
            opener: None,
            reader: Some(reader),
            buf: Vec::new(),
            lossy_utf8: opts.lossy_utf8,
            state: ProducerState::NotStarted,
            failure: None,
            lines_read: 0,
        }
    }

    /// Name the source in log events and error context.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn ensure_open(&mut self) -> Result<()> {
        if self.reader.is_some() {
            return Ok(());
        }
        if let Some(open) = self.opener.take() {
            let reader = open()
                .map_err(|e| YieldError::source_unavailable(format!("open {}", self.name), e))?;
            debug!(source = %self.name, "opened line source");
            self.reader = Some(reader);
        }
        Ok(())
    }

    fn fail(&mut self, err: YieldError) -> Option<Result<String>> {
        warn!(source = %self.name, lines = self.lines_read, error = %err, "line source failed");
        self.state = ProducerState::Failed;
        self.failure = Some(err.clone());
        self.release();
        Some(Err(err))
    }
}

impl<R> LineReader<R> {
    /// Source name used in log events and error context.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of lines handed to the consumer so far.
    #[must_use]
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// The failure that ended the traversal, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&YieldError> {
        self.failure.as_ref()
    }

    /// Whether the source has been let go.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.reader.is_none() && self.opener.is_none()
    }

    /// Stop the traversal now and release the source.
    pub fn abandon(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = ProducerState::Abandoned;
        self.release();
    }

    fn release(&mut self) {
        self.opener = None;
        if let Some(reader) = self.reader.take() {
            drop(reader);
            debug!(
                source = %self.name,
                lines = self.lines_read,
                state = %self.state,
                "released line source"
            );
        }
    }
}

/// Read one line into `buf`, returning it without its terminator.
fn read_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    lossy_utf8: bool,
) -> io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    if lossy_utf8 {
        return Ok(Some(String::from_utf8_lossy(buf).into_owned()));
    }
    std::str::from_utf8(buf)
        .map(|line| Some(line.to_owned()))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminal() {
            return None;
        }
        if let Err(e) = self.ensure_open() {
            return self.fail(e);
        }
        let Some(reader) = self.reader.as_mut() else {
            self.state = ProducerState::Exhausted;
            return None;
        };
        match read_line(reader, &mut self.buf, self.lossy_utf8) {
            Ok(Some(line)) => {
                self.state = ProducerState::Producing;
                self.lines_read += 1;
                Some(Ok(line))
            }
            Ok(None) => {
                self.state = ProducerState::Exhausted;
                self.release();
                None
            }
            Err(e) => {
                let err = YieldError::source_unavailable(format!("read {}", self.name), e);
                self.fail(err)
            }
        }
    }
}

impl<R: BufRead> FusedIterator for LineReader<R> {}

impl<R> Lifecycle for LineReader<R> {
    fn state(&self) -> ProducerState {
        self.state
    }
}

impl<R> Drop for LineReader<R> {
    fn drop(&mut self) {
        self.abandon();
    }
}

impl<R> std::fmt::Debug for LineReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineReader")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("lines_read", &self.lines_read)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}
