// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The retry strategy seam shared with the client engine.

use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;

use crate::FailureReason;

/// The reason a client engine reports when asking whether a physical attempt should be retried.
///
/// # Handling Unknown Variants
///
/// This enum is `#[non_exhaustive]`. Unrecognized variants should be treated as transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RetryReason {
    /// The request reached a node that no longer owns the partition.
    NotMyPartition,
    /// The collection identifier used by the request is stale.
    CollectionOutdated,
    /// The target node is not available.
    NodeNotAvailable,
    /// The target service is not available on any node.
    ServiceNotAvailable,
    /// No socket is currently open to the target node.
    SocketNotAvailable,
    /// The socket closed while the request was in flight.
    SocketClosedWhileInFlight,
    /// The server reported a temporary failure.
    TemporaryFailure,
    /// The document is locked by another request.
    DocumentLocked,
    /// The service reported that it is overloaded.
    ServiceOverloaded,
}

impl RetryReason {
    /// Returns `true` for routing reasons that are retried without consuming the budget.
    ///
    /// ```
    /// use pail::RetryReason;
    ///
    /// assert!(RetryReason::NotMyPartition.always_retry());
    /// assert!(!RetryReason::TemporaryFailure.always_retry());
    /// ```
    #[must_use]
    pub fn always_retry(self) -> bool {
        matches!(self, Self::NotMyPartition | Self::CollectionOutdated)
    }

    /// Maps the engine reason onto the classification used by the retry budget.
    #[must_use]
    pub fn failure_reason(self) -> FailureReason {
        if self.always_retry() {
            FailureReason::AlwaysRetry
        } else {
            FailureReason::Transient
        }
    }

    /// Returns the `snake_case` name of the reason.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotMyPartition => "not_my_partition",
            Self::CollectionOutdated => "collection_outdated",
            Self::NodeNotAvailable => "node_not_available",
            Self::ServiceNotAvailable => "service_not_available",
            Self::SocketNotAvailable => "socket_not_available",
            Self::SocketClosedWhileInFlight => "socket_closed_while_in_flight",
            Self::TemporaryFailure => "temporary_failure",
            Self::DocumentLocked => "document_locked",
            Self::ServiceOverloaded => "service_overloaded",
        }
    }
}

impl Display for RetryReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes the physical request a client engine wants to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRequest {
    operation: Cow<'static, str>,
    idempotent: bool,
    retry_attempts: u32,
}

impl RetryRequest {
    /// Creates a request description.
    ///
    /// `retry_attempts` is the number of physical retries the engine already made for this
    /// request.
    #[must_use]
    pub fn new(operation: impl Into<Cow<'static, str>>, idempotent: bool, retry_attempts: u32) -> Self {
        Self {
            operation: operation.into(),
            idempotent,
            retry_attempts,
        }
    }

    /// The name of the operation, for example `get` or `query`.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Whether the request can be repeated without side effects.
    #[must_use]
    pub fn idempotent(&self) -> bool {
        self.idempotent
    }

    /// The number of physical retries the engine already made.
    #[must_use]
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }
}

/// The answer a retry strategy gives to the client engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Retry after the given delay.
    RetryAfter(Duration),
    /// Give up and report the failure.
    Stop,
}

impl RetryAction {
    /// Returns the delay to wait before retrying, or `None` when the answer is [`RetryAction::Stop`].
    #[must_use]
    pub fn delay(self) -> Option<Duration> {
        match self {
            Self::RetryAfter(delay) => Some(delay),
            Self::Stop => None,
        }
    }

    /// Returns `true` when the answer is [`RetryAction::Stop`].
    #[must_use]
    pub fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// A strategy a client engine consults before each internal physical retry.
///
/// The engine may call it from many threads at once.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use pail::{RetryAction, RetryReason, RetryRequest, RetryStrategy};
///
/// #[derive(Debug)]
/// struct Never;
///
/// impl RetryStrategy for Never {
///     fn retry_after(&self, _request: &RetryRequest, _reason: RetryReason) -> RetryAction {
///         RetryAction::Stop
///     }
/// }
///
/// let request = RetryRequest::new("get", true, 0);
/// assert_eq!(Never.retry_after(&request, RetryReason::NodeNotAvailable), RetryAction::Stop);
/// ```
pub trait RetryStrategy: Debug + Send + Sync {
    /// Decides whether the engine should retry the request.
    fn retry_after(&self, request: &RetryRequest, reason: RetryReason) -> RetryAction;
}
