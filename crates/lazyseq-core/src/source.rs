//! Eager reads over a source that can be closed from another thread.
//!
//! An eager read has no suspension point a consumer could stop at. The only
//! way to abort it is to invalidate the source it is reading: a
//! [`CloseHandle`] marks the source closed, and the read fails with
//! `SourceUnavailable` at its next chunk boundary instead of completing.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::{Result, YieldError};
use crate::lines::lines_with;
use crate::options::ReaderOptions;

struct Shared<R> {
    name: String,
    closed: AtomicBool,
    reader: Mutex<Option<R>>,
}

impl<R> Shared<R> {
    /// Drop the reader if it is still held. Safe to call from either side.
    fn release(&self, guard: &mut Option<R>) {
        if guard.take().is_some() {
            debug!(source = %self.name, "closed source released");
        }
    }
}

/// A byte source shared between one eager reader and any number of close handles.
///
/// A close is noticed between chunks: the read holds the source for the
/// duration of each `Read::read` call. This only cuts off sources whose reads
/// return; a read that blocks forever (an idle FIFO or socket) is never
/// interrupted.
pub struct ClosableSource<R> {
    shared: Arc<Shared<R>>,
    chunk_size: usize,
    lossy_utf8: bool,
}

impl ClosableSource<File> {
    /// Open the file at `path` for an eager read.
    pub fn open(path: impl AsRef<Path>, opts: &ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            YieldError::source_unavailable(format!("open {}", path.display()), e)
        })?;
        Ok(Self::new(file, opts).named(path.display().to_string()))
    }
}

impl<R: Read + Send + 'static> ClosableSource<R> {
    /// Wrap an already open source.
    pub fn new(reader: R, opts: &ReaderOptions) -> Self {
        let opts = opts.clone().normalize();
        Self {
            shared: Arc::new(Shared {
                name: "source".to_string(),
                closed: AtomicBool::new(false),
                reader: Mutex::new(Some(reader)),
            }),
            chunk_size: opts.chunk_size,
            lossy_utf8: opts.lossy_utf8,
        }
    }

    /// Close this source when `token` is cancelled.
    pub fn close_on(&self, token: &CancellationToken) {
        let handle = self.close_handle();
        token.register(move || handle.close());
    }
}

impl<R> ClosableSource<R> {
    /// Name the source in log events and error context.
    ///
    /// Only takes effect before any close handle has been created.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.name = name.into();
        }
        self
    }

    /// A handle that can close this source from any thread.
    #[must_use]
    pub fn close_handle(&self) -> CloseHandle<R> {
        CloseHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Whether the source has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Close the source and release it once no read holds it.
    pub fn close(&self) {
        self.close_handle().close();
    }
}

impl<R: Read> ClosableSource<R> {
    /// Read everything that is left into a `String`.
    ///
    /// Reads chunk by chunk. If the source is closed before the last chunk
    /// arrives, the read fails and nothing read so far is returned. Invalid
    /// UTF-8 fails the read unless the source was built with `lossy_utf8`.
    pub fn read_to_string(&self) -> Result<String> {
        let mut bytes = Vec::new();
        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            let mut guard = self.shared.reader.lock();
            if self.is_closed() {
                self.shared.release(&mut guard);
                return Err(self.closed_error());
            }
            let Some(reader) = guard.as_mut() else {
                return Err(self.closed_error());
            };
            let n = match reader.read(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.shared.release(&mut guard);
                    return Err(YieldError::source_unavailable(
                        format!("read {}", self.shared.name),
                        e,
                    ));
                }
            };
            drop(guard);
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..n]);
        }
        debug!(source = %self.shared.name, bytes = bytes.len(), "eager read complete");
        if self.lossy_utf8 {
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }
        String::from_utf8(bytes).map_err(|e| {
            YieldError::source_unavailable(
                format!("decode {}", self.shared.name),
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
        })
    }

    fn closed_error(&self) -> YieldError {
        YieldError::closed(format!("read {}", self.shared.name))
    }
}

/// Cloneable, thread-safe handle that closes a [`ClosableSource`].
pub struct CloseHandle<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for CloseHandle<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R> CloseHandle<R> {
    /// Mark the source closed.
    ///
    /// If no read is in flight the source is released immediately; otherwise
    /// the read releases it when it next checks in.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!(source = %self.shared.name, "closing source");
        if let Some(mut guard) = self.shared.reader.try_lock() {
            self.shared.release(&mut guard);
        }
    }
}

/// Read every line of `path` into memory before returning any of them.
pub fn read_lines_eagerly(path: impl AsRef<Path>, opts: &ReaderOptions) -> Result<Vec<String>> {
    lines_with(path, opts).collect()
}
