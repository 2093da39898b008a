//! Cancellation tokens and the delayed cancel timer.
//!
//! A token carries no cooperative checkpoints into the producers. It exists
//! for the one case that cannot stop by itself: an eager read with no
//! suspension point. Callbacks registered on the token invalidate whatever
//! that read is blocked on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::debug;

type Callback = Box<dyn FnOnce() + Send>;

struct Shared {
    cancelled: AtomicBool,
    callbacks: Mutex<Vec<Callback>>,
}

/// Shared cancellation flag with one-shot callbacks.
///
/// # Example
/// ```
/// use lazyseq_core::cancel::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

impl CancellationToken {
    /// Create a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                cancelled: AtomicBool::new(false),
                callbacks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation, running every registered callback once.
    ///
    /// Callbacks run on the calling thread. Cancelling twice is a no-op.
    pub fn cancel(&self) {
        let callbacks = {
            let mut guard = self.shared.callbacks.lock();
            if self.shared.cancelled.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *guard)
        };
        debug!(callbacks = callbacks.len(), "cancellation requested");
        for callback in callbacks {
            callback();
        }
    }

    /// Run `callback` when the token is cancelled, or right away if it already is.
    pub fn register(&self, callback: impl FnOnce() + Send + 'static) {
        let mut guard = self.shared.callbacks.lock();
        if self.is_cancelled() {
            drop(guard);
            callback();
            return;
        }
        guard.push(Box::new(callback));
    }

    /// Cancel this token once `delay` has elapsed.
    ///
    /// The timer runs on a background thread. Dropping the returned guard
    /// before it fires disarms it.
    pub fn cancel_after(&self, delay: Duration) -> CancelTimer {
        let (disarm, disarmed) = crossbeam_channel::bounded::<()>(1);
        let token = self.clone();
        let handle = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = disarmed.recv_timeout(delay) {
                debug!(?delay, "cancel timer fired");
                token.cancel();
            }
        });
        CancelTimer {
            disarm: Some(disarm),
            handle: Some(handle),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Guard for a pending [`CancellationToken::cancel_after`] timer.
///
/// Dropping it disarms the timer (if it has not fired) and waits for the
/// timer thread, including any callbacks it is running.
#[must_use = "dropping the timer disarms it"]
pub struct CancelTimer {
    disarm: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CancelTimer {
    /// Disarm the timer now.
    pub fn disarm(self) {
        drop(self);
    }
}

impl Drop for CancelTimer {
    fn drop(&mut self) {
        drop(self.disarm.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("cancel timer thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    use super::*;

    #[test]
    fn cancellation_token() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancellation_propagates_through_clone() {
        let token1 = CancellationToken::new();
        let token2 = token1.clone();
        token1.cancel();
        assert!(token2.is_cancelled());
    }

    #[test]
    fn callbacks_run_once() {
        let token = CancellationToken::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        token.register(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        token.cancel();
        token.cancel();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn register_after_cancel_runs_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        let hit = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&hit);
        token.register(move || flag.store(true, Ordering::SeqCst));
        assert!(hit.load(Ordering::SeqCst));
    }

    #[test]
    fn timer_fires_after_delay() {
        let token = CancellationToken::new();
        let start = Instant::now();
        let timer = token.cancel_after(Duration::from_millis(20));
        while !token.is_cancelled() {
            assert!(start.elapsed() < Duration::from_secs(5), "timer never fired");
            thread::sleep(Duration::from_millis(1));
        }
        assert!(start.elapsed() >= Duration::from_millis(20));
        drop(timer);
    }

    #[test]
    fn dropped_timer_never_fires() {
        let token = CancellationToken::new();
        let timer = token.cancel_after(Duration::from_millis(50));
        timer.disarm();
        thread::sleep(Duration::from_millis(80));
        assert!(!token.is_cancelled());
    }
}
