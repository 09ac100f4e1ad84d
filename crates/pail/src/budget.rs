// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::{FailureReason, RetryAction, RetryReason, RetryRequest, RetryStrategy};

/// Attempt accounting for one logical call.
///
/// The budget counts retries that consumed it, never resets, and answers every retry question with
/// either a fixed delay or [`RetryAction::Stop`]. One budget is shared between the outer retry loop
/// of a [`RetryContext`][crate::RetryContext] and the client engine, which sees it through the
/// [`RetryStrategy`] attached to the per-call options.
///
/// `limit` is the number of additional attempts allowed after the first one.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use pail::{FailureReason, RetryAction, RetryBudget};
///
/// let budget = RetryBudget::new(1, Duration::from_millis(20));
///
/// assert_eq!(budget.consume(FailureReason::Transient), RetryAction::RetryAfter(Duration::from_millis(20)));
/// assert_eq!(budget.consume(FailureReason::Transient), RetryAction::Stop);
/// assert_eq!(budget.attempts(), 2);
/// ```
#[derive(Debug)]
pub struct RetryBudget {
    attempts: AtomicU32,
    limit: u32,
    delay: Duration,
    delegate: Option<Arc<dyn RetryStrategy>>,
}

impl RetryBudget {
    /// Creates a budget allowing `limit` additional attempts spaced by a fixed `delay`.
    #[must_use]
    pub fn new(limit: u32, delay: Duration) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            limit,
            delay,
            delegate: None,
        }
    }

    /// Forwards engine retry questions to a lower-level strategy after counting them.
    ///
    /// The delegate only answers questions asked through [`RetryBudget::decide`]. The outer loop
    /// keeps using [`RetryBudget::consume`] so it stays bounded by this budget's own limit.
    #[must_use]
    pub fn delegate(mut self, delegate: Arc<dyn RetryStrategy>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Number of counted retries so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Number of additional attempts allowed after the first one.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Fixed wait between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns `true` when a delegate strategy is attached.
    #[must_use]
    pub fn has_delegate(&self) -> bool {
        self.delegate.is_some()
    }

    /// Answers a retry question asked by the client engine.
    ///
    /// With a delegate, the counter is incremented unless the reason is an always-retry reason and
    /// the delegate's answer is returned. Without one, the decision is [`RetryBudget::consume`].
    pub fn decide(&self, request: &RetryRequest, reason: RetryReason) -> RetryAction {
        let failure = reason.failure_reason();

        match &self.delegate {
            Some(delegate) => {
                if failure != FailureReason::AlwaysRetry {
                    self.increment();
                }

                delegate.retry_after(request, reason)
            }
            None => self.consume(failure),
        }
    }

    /// Records a failed attempt and decides whether another one is allowed.
    ///
    /// [`FailureReason::AlwaysRetry`] is retried without touching the counter and
    /// [`FailureReason::Permanent`] stops without touching it. A transient failure increments the
    /// counter and stops once it exceeds the limit.
    #[cfg_attr(test, mutants::skip)] // Mutating the limit check causes infinite loops
    pub fn consume(&self, reason: FailureReason) -> RetryAction {
        match reason {
            FailureReason::Permanent => RetryAction::Stop,
            FailureReason::AlwaysRetry => RetryAction::RetryAfter(self.delay),
            FailureReason::Transient => {
                if self.increment() > self.limit {
                    RetryAction::Stop
                } else {
                    RetryAction::RetryAfter(self.delay)
                }
            }
        }
    }

    /// Increments the counter and returns the new value.
    fn increment(&self) -> u32 {
        let previous = match self
            .attempts
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_add(1)))
        {
            Ok(n) | Err(n) => n,
        };

        previous.saturating_add(1)
    }
}

impl RetryStrategy for RetryBudget {
    fn retry_after(&self, request: &RetryRequest, reason: RetryReason) -> RetryAction {
        self.decide(request, reason)
    }
}
