// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Binding of one logical call to a retry budget.

mod telemetry;

use std::borrow::Cow;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use tick::Clock;

pub(crate) use telemetry::Telemetry;

use crate::{
    CallOptions, Classifier, Cluster, Collection, FailureReason, QueryIndexManager, RetryAction, RetryBudget, RetryError,
    RetryOptions, RetryStrategy, StoreFailure, merge_options,
};

/// Runs one logical operation against a resource handle with bounded retries.
///
/// A context owns a fresh [`RetryBudget`] and exposes it two ways:
///
/// - [`RetryContext::strategy`] hands the budget to the client engine, which consults it before
///   each internal physical retry.
/// - [`RetryContext::run`] re-issues the whole operation after a classified failure, sleeping the
///   fixed delay between attempts.
///
/// Both paths share the same counter, so a transient failure is never counted twice against the
/// limit. Permanent failures are returned on first occurrence; always-retry failures are retried
/// without consuming the budget.
///
/// The operation is a closure receiving the borrowed handle and the [`AttemptArgs`] of the current
/// attempt, and returning the future of that attempt. Options built through
/// [`AttemptArgs::options`] carry the context's strategy. The future returned by [`run`][Self::run]
/// is `Send` whenever the handle, the operation and its futures are.
///
/// # Examples
///
/// ```
/// use pail::{ErrorKind, RetryContext, RetryOptions, StoreError};
/// use tick::ClockControl;
///
/// # async fn example() {
/// let clock = ClockControl::new().auto_advance_timers(true).to_clock();
/// let options = RetryOptions::new(&clock).retry_limit(2);
///
/// let context = RetryContext::new("ping", &options, &(), |_handle, args| async move {
///     if args.index() < 2 {
///         Err(StoreError::from_kind(ErrorKind::Timeout))
///     } else {
///         Ok("pong")
///     }
/// });
///
/// assert_eq!(context.run().await.ok(), Some("pong"));
/// assert_eq!(context.budget().attempts(), 2);
/// # }
/// ```
pub struct RetryContext<'h, H, E, F> {
    handle: &'h H,
    budget: Arc<RetryBudget>,
    clock: Clock,
    classifier: Classifier<E>,
    operation: F,
    telemetry: Telemetry,
}

impl<'h, H, E, F> RetryContext<'h, H, E, F> {
    /// Creates a context that classifies failures with `classifier`.
    pub fn with_classifier<T, Fut>(
        name: impl Into<Cow<'static, str>>,
        options: &RetryOptions,
        classifier: Classifier<E>,
        handle: &'h H,
        operation: F,
    ) -> Self
    where
        F: Fn(&'h H, AttemptArgs) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        Self {
            handle,
            budget: Arc::new(options.budget()),
            clock: options.get_clock().clone(),
            classifier,
            operation,
            telemetry: options.create_telemetry(name.into()),
        }
    }

    /// Replaces the classifier chosen at construction.
    ///
    /// This is a builder-style setter; the classifier in use is not observable.
    #[must_use]
    pub fn classify_with(self, classifier: Classifier<E>) -> Self {
        Self { classifier, ..self }
    }

    /// Returns the budget as the strategy the client engine consults for physical retries.
    #[must_use]
    pub fn strategy(&self) -> Arc<dyn RetryStrategy> {
        Arc::clone(&self.budget) as Arc<dyn RetryStrategy>
    }

    /// Returns the budget of this call.
    #[must_use]
    pub fn budget(&self) -> &RetryBudget {
        &self.budget
    }

    /// Runs the operation until it succeeds, fails permanently, or exhausts the budget.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Permanent`] with the original error when a failure is classified as
    /// permanent, and [`RetryError::Exhausted`] with the last error when the budget runs out.
    #[cfg_attr(test, mutants::skip)] // Mutating the loop exit causes infinite loops
    pub async fn run<T, Fut>(&self) -> Result<T, RetryError<E>>
    where
        F: Fn(&'h H, AttemptArgs) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut index = 0_u32;

        loop {
            let args = AttemptArgs {
                index,
                budget: Arc::clone(&self.budget),
            };

            let error = match (self.operation)(self.handle, args).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let reason = self.classifier.classify(&error);

            if reason == FailureReason::Permanent {
                self.telemetry.permanent(index);
                return Err(RetryError::Permanent(error));
            }

            match self.budget.consume(reason) {
                RetryAction::RetryAfter(delay) => {
                    self.telemetry.retry(index, reason, delay);
                    self.clock.delay(delay).await;
                    index = index.saturating_add(1);
                }
                RetryAction::Stop => {
                    self.telemetry.exhausted(index);
                    return Err(RetryError::Exhausted {
                        attempts: index.saturating_add(1),
                        last: error,
                    });
                }
            }
        }
    }
}

impl<'h, H, E: StoreFailure + 'static, F> RetryContext<'h, H, E, F> {
    /// Creates a context for any handle whose errors implement [`StoreFailure`].
    ///
    /// Failures are classified with [`Classifier::connectivity`].
    pub fn new<T, Fut>(name: impl Into<Cow<'static, str>>, options: &RetryOptions, handle: &'h H, operation: F) -> Self
    where
        F: Fn(&'h H, AttemptArgs) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        Self::with_classifier(name, options, Classifier::connectivity(), handle, operation)
    }
}

impl<'h, C: Cluster, F> RetryContext<'h, C, C::Error, F> {
    /// Creates a context for an operation against a cluster.
    pub fn cluster<T, Fut>(name: impl Into<Cow<'static, str>>, options: &RetryOptions, cluster: &'h C, operation: F) -> Self
    where
        F: Fn(&'h C, AttemptArgs) -> Fut,
        Fut: Future<Output = Result<T, C::Error>>,
    {
        Self::new(name, options, cluster, operation)
    }
}

impl<'h, C: Collection, F> RetryContext<'h, C, C::Error, F> {
    /// Creates a context for an operation against a collection.
    pub fn collection<T, Fut>(name: impl Into<Cow<'static, str>>, options: &RetryOptions, collection: &'h C, operation: F) -> Self
    where
        F: Fn(&'h C, AttemptArgs) -> Fut,
        Fut: Future<Output = Result<T, C::Error>>,
    {
        Self::new(name, options, collection, operation)
    }
}

impl<'h, M: QueryIndexManager, F> RetryContext<'h, M, M::Error, F> {
    /// Creates a context for an operation against a query index manager.
    pub fn index_manager<T, Fut>(name: impl Into<Cow<'static, str>>, options: &RetryOptions, manager: &'h M, operation: F) -> Self
    where
        F: Fn(&'h M, AttemptArgs) -> Fut,
        Fut: Future<Output = Result<T, M::Error>>,
    {
        Self::new(name, options, manager, operation)
    }
}

impl<H, E, F> Debug for RetryContext<'_, H, E, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryContext")
            .field("budget", &self.budget)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

/// Arguments passed to the operation for each attempt.
#[derive(Debug, Clone)]
pub struct AttemptArgs {
    index: u32,
    budget: Arc<RetryBudget>,
}

impl AttemptArgs {
    /// The zero-based index of the attempt.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns `true` for the first attempt.
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// The retry strategy of the call, for clients that take it directly.
    #[must_use]
    pub fn strategy(&self) -> Arc<dyn RetryStrategy> {
        Arc::clone(&self.budget) as Arc<dyn RetryStrategy>
    }

    /// Returns a copy of `options` carrying the strategy of the call.
    ///
    /// See [`merge_options`].
    #[must_use]
    pub fn options<O: CallOptions>(&self, options: Option<&O>) -> O {
        merge_options(options, self.strategy())
    }
}
