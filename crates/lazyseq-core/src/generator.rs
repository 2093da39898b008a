//! Closure-based generators.
//!
//! A [`Generator`] runs its body as a cooperative task on a helper thread.
//! Body and consumer hand control back and forth over zero-capacity
//! channels, so only one of them is ever running: the body starts on the
//! first pull, runs until it yields, and stays suspended until the next
//! pull.

use std::cell::Cell;
use std::iter::FusedIterator;
use std::panic;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use crate::error::{Result, YieldError};
use crate::state::{Lifecycle, ProducerState};

enum Message<T> {
    Item(T),
    Failed(YieldError),
}

/// Handle a generator body uses to hand elements to its consumer.
pub struct Yielder<T> {
    items: Sender<Message<T>>,
    resume: Receiver<()>,
    consumer_gone: Cell<bool>,
}

impl<T> Yielder<T> {
    /// Hand `value` to the consumer and suspend until it asks for more.
    ///
    /// Returns `Err(YieldError::Abandoned)` once the consumer is gone; the
    /// body should propagate it with `?` so its resources are released.
    pub fn yield_(&self, value: T) -> Result<()> {
        if self.items.send(Message::Item(value)).is_err() || self.resume.recv().is_err() {
            self.consumer_gone.set(true);
            return Err(YieldError::Abandoned);
        }
        Ok(())
    }
}

/// A lazy sequence produced by a closure that yields.
///
/// # Example
/// ```
/// use lazyseq_core::generator::Generator;
///
/// let evens = Generator::new(|co| {
///     for n in (0..10).step_by(2) {
///         co.yield_(n)?;
///     }
///     Ok(())
/// });
/// let collected: Vec<u32> = evens.collect::<Result<_, _>>().unwrap();
/// assert_eq!(collected, [0, 2, 4, 6, 8]);
/// ```
pub struct Generator<T> {
    resume: Option<Sender<()>>,
    items: Receiver<Message<T>>,
    handle: Option<JoinHandle<()>>,
    state: ProducerState,
}

impl<T: Send + 'static> Generator<T> {
    /// Create a generator. The body does not run until the first pull.
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce(&Yielder<T>) -> Result<()> + Send + 'static,
    {
        let (resume_tx, resume_rx) = crossbeam_channel::bounded::<()>(0);
        let (items_tx, items_rx) = crossbeam_channel::bounded::<Message<T>>(0);
        let handle = thread::spawn(move || {
            if resume_rx.recv().is_err() {
                return;
            }
            let yielder = Yielder {
                items: items_tx,
                resume: resume_rx,
                consumer_gone: Cell::new(false),
            };
            if let Err(e) = body(&yielder) {
                // Once the consumer is gone nobody is left to receive the error.
                if !yielder.consumer_gone.get() {
                    let _ = yielder.items.send(Message::Failed(e));
                }
            }
        });
        Self {
            resume: Some(resume_tx),
            items: items_rx,
            handle: Some(handle),
            state: ProducerState::NotStarted,
        }
    }
}

impl<T> Generator<T> {
    /// Stop the generator now.
    ///
    /// The suspended body sees `Abandoned` from its pending `yield_`, unwinds,
    /// and is joined before this returns.
    pub fn abandon(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = ProducerState::Abandoned;
        debug!("generator abandoned");
        self.finish();
    }

    fn finish(&mut self) {
        drop(self.resume.take());
        if let Some(handle) = self.handle.take() {
            if let Err(payload) = handle.join() {
                if !thread::panicking() && self.state != ProducerState::Abandoned {
                    panic::resume_unwind(payload);
                }
            }
        }
    }
}

impl<T> Iterator for Generator<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_terminal() {
            return None;
        }
        let resumed = self
            .resume
            .as_ref()
            .is_some_and(|resume| resume.send(()).is_ok());
        let received = if resumed { self.items.recv().ok() } else { None };
        match received {
            Some(Message::Item(value)) => {
                self.state = ProducerState::Producing;
                Some(Ok(value))
            }
            Some(Message::Failed(e)) => {
                self.state = ProducerState::Failed;
                self.finish();
                Some(Err(e))
            }
            None => {
                self.state = ProducerState::Exhausted;
                self.finish();
                None
            }
        }
    }
}

impl<T> FusedIterator for Generator<T> {}

impl<T> Lifecycle for Generator<T> {
    fn state(&self) -> ProducerState {
        self.state
    }
}

impl<T> Drop for Generator<T> {
    fn drop(&mut self) {
        self.abandon();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counting(bound: u64) -> Generator<u64> {
        Generator::new(move |co| {
            for n in 1..=bound {
                co.yield_(n)?;
            }
            Ok(())
        })
    }

    #[test]
    fn yields_in_order() {
        let values: Vec<u64> = counting(10).collect::<Result<_>>().unwrap();
        assert_eq!(values, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn body_waits_for_first_pull() {
        let started = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&started);
        let mut gen = Generator::new(move |co| {
            flag.store(true, Ordering::SeqCst);
            co.yield_(1)
        });
        thread::sleep(std::time::Duration::from_millis(20));
        assert!(!started.load(Ordering::SeqCst));
        assert_eq!(gen.state(), ProducerState::NotStarted);
        assert_eq!(gen.next().unwrap().unwrap(), 1);
        assert!(started.load(Ordering::SeqCst));
    }

    #[test]
    fn body_runs_only_between_pulls() {
        let produced = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&produced);
        let mut gen = Generator::new(move |co| {
            for n in 0..100 {
                counter.fetch_add(1, Ordering::SeqCst);
                co.yield_(n)?;
            }
            Ok(())
        });
        gen.next();
        gen.next();
        thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(produced.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn abandon_unwinds_body() {
        let released = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&released);
        let mut gen = Generator::new(move |co| {
            struct Guard(Arc<AtomicBool>);
            impl Drop for Guard {
                fn drop(&mut self) {
                    self.0.store(true, Ordering::SeqCst);
                }
            }
            let _guard = Guard(flag);
            let mut n = 0u64;
            loop {
                n += 1;
                co.yield_(n)?;
            }
        });
        let taken: Vec<u64> = gen.by_ref().take(3).map(Result::unwrap).collect();
        assert_eq!(taken, [1, 2, 3]);
        assert!(!released.load(Ordering::SeqCst));
        gen.abandon();
        assert!(released.load(Ordering::SeqCst));
        assert_eq!(gen.state(), ProducerState::Abandoned);
        assert!(gen.next().is_none());
    }

    #[test]
    fn dropping_unstarted_generator_is_clean() {
        let gen = counting(5);
        drop(gen);
    }

    #[test]
    fn body_error_is_last_element() {
        let mut gen = Generator::new(|co| {
            co.yield_("first")?;
            Err(YieldError::TimeoutExceeded(std::time::Duration::from_secs(1)))
        });
        assert_eq!(gen.next().unwrap().unwrap(), "first");
        assert!(matches!(
            gen.next(),
            Some(Err(YieldError::TimeoutExceeded(_)))
        ));
        assert_eq!(gen.state(), ProducerState::Failed);
        assert!(gen.next().is_none());
    }

    #[test]
    fn body_returning_abandoned_is_reported() {
        let mut gen = Generator::new(|co| {
            co.yield_(7u8)?;
            Err(YieldError::Abandoned)
        });
        assert_eq!(gen.next().unwrap().unwrap(), 7);
        assert!(matches!(gen.next(), Some(Err(YieldError::Abandoned))));
        assert_eq!(gen.state(), ProducerState::Failed);
        assert!(gen.next().is_none());
    }

    #[test]
    fn body_ignoring_abandonment_does_not_hang() {
        let mut gen = Generator::new(|co| {
            let _ = co.yield_(1u8);
            Err(YieldError::TimeoutExceeded(std::time::Duration::from_secs(1)))
        });
        assert_eq!(gen.next().unwrap().unwrap(), 1);
        gen.abandon();
        assert_eq!(gen.state(), ProducerState::Abandoned);
    }

    #[test]
    fn exhausted_generator_stays_done() {
        let mut gen = counting(1);
        assert_eq!(gen.next().unwrap().unwrap(), 1);
        assert!(gen.next().is_none());
        assert_eq!(gen.state(), ProducerState::Exhausted);
        assert!(gen.next().is_none());
    }

    #[test]
    #[should_panic(expected = "body blew up")]
    fn body_panic_reaches_consumer() {
        let mut gen: Generator<u8> = Generator::new(|_| panic!("body blew up"));
        gen.next();
    }
}
