//! Consumer-side wall-clock budgets.
//!
//! A budget belongs to whoever is pulling elements. Producers know nothing
//! about it: when the budget runs out the consumer simply stops pulling.

use std::iter::FusedIterator;
use std::time::{Duration, Instant};

use crate::error::{Result, YieldError};

/// A wall-clock budget with an absolute deadline.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    limit: Duration,
    deadline: Instant,
}

impl TimeBudget {
    /// Start a budget of `limit` from now.
    #[must_use]
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            deadline: Instant::now() + limit,
        }
    }

    /// The budget this was started with.
    #[must_use]
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Whether the deadline has passed.
    #[must_use]
    pub fn is_exceeded(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Return `TimeoutExceeded` once the deadline has passed.
    pub fn check(&self) -> Result<()> {
        if self.is_exceeded() {
            return Err(YieldError::TimeoutExceeded(self.limit));
        }
        Ok(())
    }

    /// Time left before the deadline.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

/// Stop pulling from an iterator once a [`TimeBudget`] runs out.
pub trait BudgetExt: Iterator + Sized {
    /// Yield `Ok(item)` while the budget holds, then one `Err(TimeoutExceeded)`.
    fn within_budget(self, budget: TimeBudget) -> WithinBudget<Self> {
        WithinBudget {
            inner: self,
            budget,
            done: false,
        }
    }

    /// Like [`BudgetExt::within_budget`] for iterators that already yield results.
    fn try_within_budget<T>(self, budget: TimeBudget) -> TryWithinBudget<Self>
    where
        Self: Iterator<Item = Result<T>>,
    {
        TryWithinBudget {
            inner: WithinBudget {
                inner: self,
                budget,
                done: false,
            },
        }
    }
}

impl<I: Iterator> BudgetExt for I {}

/// Iterator returned by [`BudgetExt::within_budget`].
#[derive(Debug)]
pub struct WithinBudget<I> {
    inner: I,
    budget: TimeBudget,
    done: bool,
}

impl<I> WithinBudget<I> {
    /// Give back the wrapped iterator, e.g. to abandon it explicitly.
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Iterator> Iterator for WithinBudget<I> {
    type Item = Result<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Err(e) = self.budget.check() {
            self.done = true;
            return Some(Err(e));
        }
        let item = self.inner.next();
        if item.is_none() {
            self.done = true;
        }
        item.map(Ok)
    }
}

impl<I: Iterator> FusedIterator for WithinBudget<I> {}

/// Iterator returned by [`BudgetExt::try_within_budget`].
#[derive(Debug)]
pub struct TryWithinBudget<I> {
    inner: WithinBudget<I>,
}

impl<I> TryWithinBudget<I> {
    /// Give back the wrapped iterator.
    pub fn into_inner(self) -> I {
        self.inner.into_inner()
    }
}

impl<T, I: Iterator<Item = Result<T>>> Iterator for TryWithinBudget<I> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|item| item.and_then(|inner| inner))
    }
}

impl<T, I: Iterator<Item = Result<T>>> FusedIterator for TryWithinBudget<I> {}
