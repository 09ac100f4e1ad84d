// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use recoverable::{Recovery, RecoveryKind};

use crate::StoreFailure;

/// How a failed attempt should be treated by the retry machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Connectivity trouble that is expected to clear; retry within the budget.
    Transient,
    /// A genuine application-level failure; surface it immediately.
    Permanent,
    /// A routing signal from the client engine; retry without consuming the budget.
    AlwaysRetry,
}

impl FailureReason {
    /// Returns the `snake_case` name of the reason.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::AlwaysRetry => "always_retry",
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a store failure using its kind and the engine retry reason attached to it.
///
/// An always-retry engine reason wins over the kind. Otherwise the closed set of transient kinds
/// (see [`ErrorKind::is_transient`][crate::ErrorKind::is_transient]) maps to
/// [`FailureReason::Transient`] and everything else to [`FailureReason::Permanent`].
///
/// ```
/// use pail::{ErrorKind, FailureReason, RetryReason, StoreError, classify};
///
/// assert_eq!(classify(&StoreError::from_kind(ErrorKind::Network)), FailureReason::Transient);
/// assert_eq!(classify(&StoreError::from_kind(ErrorKind::PathExists)), FailureReason::Permanent);
///
/// let moved = StoreError::from_kind(ErrorKind::Other).with_retry_reason(RetryReason::NotMyPartition);
/// assert_eq!(classify(&moved), FailureReason::AlwaysRetry);
/// ```
#[must_use]
pub fn classify<E: StoreFailure + ?Sized>(error: &E) -> FailureReason {
    if error.retry_reason().is_some_and(crate::RetryReason::always_retry) {
        return FailureReason::AlwaysRetry;
    }

    if error.kind().is_transient() {
        FailureReason::Transient
    } else {
        FailureReason::Permanent
    }
}

/// An injectable error classification function.
///
/// A retry context consults its classifier after every failed attempt. The built-in
/// [`Classifier::connectivity`] covers errors that implement [`StoreFailure`]; any other rule can
/// be supplied with [`Classifier::new`].
///
/// # Examples
///
/// ```
/// use pail::{Classifier, FailureReason};
///
/// let classifier = Classifier::new(|error: &std::io::Error| match error.kind() {
///     std::io::ErrorKind::TimedOut => FailureReason::Transient,
///     _ => FailureReason::Permanent,
/// });
///
/// let error = std::io::Error::from(std::io::ErrorKind::TimedOut);
/// assert_eq!(classifier.classify(&error), FailureReason::Transient);
/// ```
pub struct Classifier<E>(Arc<dyn Fn(&E) -> FailureReason + Send + Sync>);

impl<E> Classifier<E> {
    /// Creates a classifier from a function.
    #[must_use]
    pub fn new<F>(classify: F) -> Self
    where
        F: Fn(&E) -> FailureReason + Send + Sync + 'static,
    {
        Self(Arc::new(classify))
    }

    /// Classifies the given error.
    #[must_use]
    pub fn classify(&self, error: &E) -> FailureReason {
        (self.0)(error)
    }
}

impl<E: StoreFailure + 'static> Classifier<E> {
    /// Classifier for store failures; see [`classify`].
    #[must_use]
    pub fn connectivity() -> Self {
        Self::new(|error: &E| classify(error))
    }
}

impl<E: Recovery + 'static> Classifier<E> {
    /// Classifier driven by [`Recovery`] metadata.
    ///
    /// [`RecoveryKind::Retry`] and [`RecoveryKind::Unavailable`] are transient. Any other kind,
    /// including [`RecoveryKind::Unknown`], is permanent.
    #[must_use]
    pub fn from_recovery() -> Self {
        Self::new(|error: &E| match error.recovery().kind() {
            RecoveryKind::Retry | RecoveryKind::Unavailable => FailureReason::Transient,
            RecoveryKind::Never | RecoveryKind::Unknown | _ => FailureReason::Permanent,
        })
    }
}

impl<E> Clone for Classifier<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> Debug for Classifier<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier").finish()
    }
}
