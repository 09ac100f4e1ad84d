// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types reported by store clients and by the retry machinery.

use std::fmt::{Display, Formatter};

use recoverable::{Recovery, RecoveryInfo};

use crate::RetryReason;

/// The kind of failure reported by a store client.
///
/// The first group of variants describes connectivity trouble that is expected to clear on its
/// own; see [`ErrorKind::is_transient`]. Everything else reflects a genuine application-level
/// outcome that retrying cannot change.
///
/// # Handling Unknown Variants
///
/// This enum is `#[non_exhaustive]`. When matching on it, treat unrecognized variants the same as
/// [`ErrorKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The client or the server is overloaded.
    Overload,
    /// The operation did not complete in time.
    Timeout,
    /// A generic network failure.
    Network,
    /// The request could not be dispatched to a node.
    DispatchFailure,
    /// The client is shutting down.
    Shutdown,
    /// No bucket is open on the connection.
    NoOpenBuckets,
    /// The client hit an internal error while handling the request.
    ClientInternal,
    /// The response stream was closed.
    StreamClosed,
    /// The response stream was disconnected.
    StreamDisconnected,
    /// The response stream consumer could not keep up.
    StreamTooSlow,
    /// The response stream changed state while in use.
    StreamStateChanged,

    /// The document does not exist.
    DocumentNotFound,
    /// The document already exists.
    DocumentExists,
    /// The compare-and-swap value did not match.
    CasMismatch,
    /// A sub-document path does not exist.
    PathNotFound,
    /// A sub-document path already exists.
    PathExists,
    /// A sub-document path points at a value of the wrong type.
    PathMismatch,
    /// The request was rejected as invalid.
    InvalidArgument,
    /// The credentials were rejected.
    AuthenticationFailure,
    /// The query could not be parsed.
    ParsingFailure,
    /// The requested index does not exist.
    IndexNotFound,
    /// An index with the same name already exists.
    IndexExists,
    /// Any other failure.
    Other,
}

impl ErrorKind {
    /// Returns `true` for the closed set of failures that look like transient connectivity trouble.
    ///
    /// ```
    /// use pail::ErrorKind;
    ///
    /// assert!(ErrorKind::Timeout.is_transient());
    /// assert!(!ErrorKind::DocumentNotFound.is_transient());
    /// ```
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Overload
                | Self::Timeout
                | Self::Network
                | Self::DispatchFailure
                | Self::Shutdown
                | Self::NoOpenBuckets
                | Self::ClientInternal
                | Self::StreamClosed
                | Self::StreamDisconnected
                | Self::StreamTooSlow
                | Self::StreamStateChanged
        )
    }

    /// Returns the `snake_case` name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overload => "overload",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::DispatchFailure => "dispatch_failure",
            Self::Shutdown => "shutdown",
            Self::NoOpenBuckets => "no_open_buckets",
            Self::ClientInternal => "client_internal",
            Self::StreamClosed => "stream_closed",
            Self::StreamDisconnected => "stream_disconnected",
            Self::StreamTooSlow => "stream_too_slow",
            Self::StreamStateChanged => "stream_state_changed",
            Self::DocumentNotFound => "document_not_found",
            Self::DocumentExists => "document_exists",
            Self::CasMismatch => "cas_mismatch",
            Self::PathNotFound => "path_not_found",
            Self::PathExists => "path_exists",
            Self::PathMismatch => "path_mismatch",
            Self::InvalidArgument => "invalid_argument",
            Self::AuthenticationFailure => "authentication_failure",
            Self::ParsingFailure => "parsing_failure",
            Self::IndexNotFound => "index_not_found",
            Self::IndexExists => "index_exists",
            Self::Other => "other",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure metadata the retry machinery needs from a store client error.
///
/// Implement this for the error type of a [`Cluster`][crate::Cluster],
/// [`Collection`][crate::Collection] or [`QueryIndexManager`][crate::QueryIndexManager] to use the
/// built-in [`Classifier::connectivity`][crate::Classifier::connectivity].
pub trait StoreFailure {
    /// The kind of failure.
    fn kind(&self) -> ErrorKind;

    /// The reason the client engine attached when it gave up on the request, if any.
    ///
    /// Engines report always-retry reasons such as [`RetryReason::NotMyPartition`] here when a
    /// request reached the wrong node and must be redirected.
    fn retry_reason(&self) -> Option<RetryReason> {
        None
    }
}

/// An error reported by a store client.
///
/// # Examples
///
/// ```
/// use pail::{ErrorKind, RetryReason, StoreError, StoreFailure};
///
/// let error = StoreError::from_kind(ErrorKind::Timeout);
/// assert_eq!(error.kind(), ErrorKind::Timeout);
///
/// let redirected = StoreError::from_kind(ErrorKind::DispatchFailure).with_retry_reason(RetryReason::NotMyPartition);
/// assert_eq!(StoreFailure::retry_reason(&redirected), Some(RetryReason::NotMyPartition));
/// ```
#[ohno::error]
#[display("store operation failed: {kind}")]
pub struct StoreError {
    kind: ErrorKind,
    retry_reason: Option<RetryReason>,
}

impl StoreError {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, None::<RetryReason>)
    }

    /// Creates an error of the given kind caused by another error.
    pub fn with_cause(kind: ErrorKind, cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(kind, None::<RetryReason>, cause)
    }

    /// Attaches the engine retry reason that accompanied this failure.
    #[must_use]
    pub fn with_retry_reason(mut self, reason: RetryReason) -> Self {
        self.retry_reason = Some(reason);
        self
    }

    /// Returns the kind of failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl StoreFailure for StoreError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn retry_reason(&self) -> Option<RetryReason> {
        self.retry_reason
    }
}

impl Recovery for StoreError {
    fn recovery(&self) -> RecoveryInfo {
        if self.kind.is_transient() || self.retry_reason.is_some_and(RetryReason::always_retry) {
            RecoveryInfo::retry()
        } else {
            RecoveryInfo::never()
        }
    }
}

/// The error returned when a retried operation does not succeed.
///
/// A permanent failure is returned as-is on its first occurrence: both its display output and its
/// source are those of the original error. When the retry budget runs out, the last observed
/// failure is kept inside [`RetryError::Exhausted`] so it can still be inspected.
///
/// # Examples
///
/// ```
/// use pail::{ErrorKind, RetryError, StoreError};
///
/// let error = RetryError::Exhausted {
///     attempts: 4,
///     last: StoreError::from_kind(ErrorKind::Timeout),
/// };
///
/// assert!(error.is_exhausted());
/// assert!(error.to_string().contains("retry limit breached"));
/// assert_eq!(error.into_inner().kind(), ErrorKind::Timeout);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The operation failed with an error that retrying cannot fix.
    #[error(transparent)]
    Permanent(E),

    /// Every allowed attempt failed with a retryable error.
    #[error("retry limit breached after {attempts} attempts (last error: {last})")]
    Exhausted {
        /// The number of attempts made, including the first one.
        attempts: u32,
        /// The failure observed on the final attempt.
        #[source]
        last: E,
    },
}

impl<E> RetryError<E> {
    /// Returns the underlying error.
    #[must_use]
    pub fn inner(&self) -> &E {
        match self {
            Self::Permanent(error) | Self::Exhausted { last: error, .. } => error,
        }
    }

    /// Consumes the wrapper and returns the underlying error.
    #[must_use]
    pub fn into_inner(self) -> E {
        match self {
            Self::Permanent(error) | Self::Exhausted { last: error, .. } => error,
        }
    }

    /// Returns `true` when the retry budget ran out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Returns the number of attempts made when the retry budget ran out.
    #[must_use]
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Exhausted { attempts, .. } => Some(*attempts),
            Self::Permanent(_) => None,
        }
    }
}
