// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::{Cas, RetryStrategy};

/// Per-call options that carry a retry strategy for the client engine.
///
/// Every options type handed to a [`Cluster`][crate::Cluster], [`Collection`][crate::Collection]
/// or [`QueryIndexManager`][crate::QueryIndexManager] implements this trait, which lets a retry
/// context attach its budget to caller-supplied options with [`merge_options`].
pub trait CallOptions: Clone + Default {
    /// The retry strategy the client engine should consult, if any.
    fn get_retry_strategy(&self) -> Option<&Arc<dyn RetryStrategy>>;

    /// Replaces the retry strategy.
    #[must_use]
    fn retry_strategy(self, strategy: Arc<dyn RetryStrategy>) -> Self;
}

/// Returns a copy of `options` whose retry strategy is `strategy`.
///
/// Every other setting is copied unchanged; missing options start from their defaults. The
/// caller's value is never modified.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use pail::{CallOptions, GetOptions, RetryBudget, merge_options};
///
/// let mine = GetOptions::new().timeout(Duration::from_secs(1));
/// let merged = merge_options(Some(&mine), Arc::new(RetryBudget::new(3, Duration::from_millis(20))));
///
/// assert_eq!(merged.get_timeout(), Some(Duration::from_secs(1)));
/// assert!(merged.get_retry_strategy().is_some());
/// assert!(mine.get_retry_strategy().is_none());
/// ```
#[must_use]
pub fn merge_options<O: CallOptions>(options: Option<&O>, strategy: Arc<dyn RetryStrategy>) -> O {
    options.cloned().unwrap_or_default().retry_strategy(strategy)
}

/// Defines an options struct with the timeout and retry strategy shared by every call.
macro_rules! call_options {
    ($(#[$meta:meta])* $name:ident { $($field:ident: $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            timeout: Option<Duration>,
            retry_strategy: Option<Arc<dyn RetryStrategy>>,
            $($field: $ty,)*
        }

        impl $name {
            /// Creates options with every setting at its default.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Sets the timeout the client applies to the call.
            #[must_use]
            pub fn timeout(mut self, timeout: Duration) -> Self {
                self.timeout = Some(timeout);
                self
            }

            /// Returns the timeout the client applies to the call.
            #[must_use]
            pub fn get_timeout(&self) -> Option<Duration> {
                self.timeout
            }
        }

        impl CallOptions for $name {
            fn get_retry_strategy(&self) -> Option<&Arc<dyn RetryStrategy>> {
                self.retry_strategy.as_ref()
            }

            fn retry_strategy(mut self, strategy: Arc<dyn RetryStrategy>) -> Self {
                self.retry_strategy = Some(strategy);
                self
            }
        }
    };
}

call_options! {
    /// Options for [`Collection::get`][crate::Collection::get].
    GetOptions {}
}

call_options! {
    /// Options for [`Collection::insert`][crate::Collection::insert].
    InsertOptions { expiry: Option<Duration> }
}

call_options! {
    /// Options for [`Collection::upsert`][crate::Collection::upsert].
    UpsertOptions { expiry: Option<Duration> }
}

call_options! {
    /// Options for [`Collection::replace`][crate::Collection::replace].
    ReplaceOptions { expiry: Option<Duration>, cas: Option<Cas> }
}

call_options! {
    /// Options for [`Collection::remove`][crate::Collection::remove].
    RemoveOptions { cas: Option<Cas> }
}

call_options! {
    /// Options for [`Collection::touch`][crate::Collection::touch].
    TouchOptions {}
}

call_options! {
    /// Options for [`Collection::counter`][crate::Collection::counter].
    CounterOptions { expiry: Option<Duration>, initial: Option<u64> }
}

call_options! {
    /// Options for [`Collection::bulk`][crate::Collection::bulk].
    BulkOptions {}
}

call_options! {
    /// Options for [`Collection::lookup_in`][crate::Collection::lookup_in].
    LookupInOptions { access_deleted: bool }
}

call_options! {
    /// Options for [`Collection::mutate_in`][crate::Collection::mutate_in].
    MutateInOptions { expiry: Option<Duration>, cas: Option<Cas>, store_semantics: StoreSemantics }
}

call_options! {
    /// Options for [`Cluster::query`][crate::Cluster::query].
    QueryOptions { consistency: ScanConsistency, parameters: QueryParameters, read_only: bool }
}

call_options! {
    /// Options for the [`QueryIndexManager`][crate::QueryIndexManager] calls.
    IndexOptions { ignore_if_exists: bool, ignore_if_missing: bool, deferred: bool }
}

/// Expiry setters shared by the write options.
macro_rules! expiry_accessors {
    ($($name:ident),*) => {
        $(
            impl $name {
                /// Sets the document expiry.
                #[must_use]
                pub fn expiry(mut self, expiry: Duration) -> Self {
                    self.expiry = Some(expiry);
                    self
                }

                /// Returns the document expiry.
                #[must_use]
                pub fn get_expiry(&self) -> Option<Duration> {
                    self.expiry
                }
            }
        )*
    };
}

/// CAS setters shared by the conditional write options.
macro_rules! cas_accessors {
    ($($name:ident),*) => {
        $(
            impl $name {
                /// Makes the write conditional on the document still having this CAS value.
                #[must_use]
                pub fn cas(mut self, cas: Cas) -> Self {
                    self.cas = Some(cas);
                    self
                }

                /// Returns the CAS value the write is conditional on.
                #[must_use]
                pub fn get_cas(&self) -> Option<Cas> {
                    self.cas
                }
            }
        )*
    };
}

expiry_accessors!(InsertOptions, UpsertOptions, ReplaceOptions, CounterOptions, MutateInOptions);
cas_accessors!(ReplaceOptions, RemoveOptions, MutateInOptions);

impl CounterOptions {
    /// Sets the value the counter is created with when the document does not exist.
    ///
    /// Without an initial value, counting a missing document fails.
    #[must_use]
    pub fn initial(mut self, initial: u64) -> Self {
        self.initial = Some(initial);
        self
    }

    /// Returns the value a missing counter is created with.
    #[must_use]
    pub fn get_initial(&self) -> Option<u64> {
        self.initial
    }
}

impl LookupInOptions {
    /// Allows reading extended attributes of deleted documents.
    #[must_use]
    pub fn access_deleted(mut self, access_deleted: bool) -> Self {
        self.access_deleted = access_deleted;
        self
    }

    /// Returns whether deleted documents can be read.
    #[must_use]
    pub fn get_access_deleted(&self) -> bool {
        self.access_deleted
    }
}

impl MutateInOptions {
    /// Sets how the document itself is written.
    #[must_use]
    pub fn store_semantics(mut self, store_semantics: StoreSemantics) -> Self {
        self.store_semantics = store_semantics;
        self
    }

    /// Returns how the document itself is written.
    #[must_use]
    pub fn get_store_semantics(&self) -> StoreSemantics {
        self.store_semantics
    }
}

impl QueryOptions {
    /// Sets the scan consistency.
    #[must_use]
    pub fn consistency(mut self, consistency: ScanConsistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// Returns the scan consistency.
    #[must_use]
    pub fn get_consistency(&self) -> ScanConsistency {
        self.consistency
    }

    /// Sets the statement parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: QueryParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Returns the statement parameters.
    #[must_use]
    pub fn get_parameters(&self) -> &QueryParameters {
        &self.parameters
    }

    /// Marks the statement as read-only.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Returns whether the statement is read-only.
    #[must_use]
    pub fn get_read_only(&self) -> bool {
        self.read_only
    }
}

impl IndexOptions {
    /// Succeeds without error when the index already exists.
    #[must_use]
    pub fn ignore_if_exists(mut self, ignore: bool) -> Self {
        self.ignore_if_exists = ignore;
        self
    }

    /// Returns whether an existing index is ignored.
    #[must_use]
    pub fn get_ignore_if_exists(&self) -> bool {
        self.ignore_if_exists
    }

    /// Succeeds without error when the index to drop does not exist.
    #[must_use]
    pub fn ignore_if_missing(mut self, ignore: bool) -> Self {
        self.ignore_if_missing = ignore;
        self
    }

    /// Returns whether a missing index is ignored.
    #[must_use]
    pub fn get_ignore_if_missing(&self) -> bool {
        self.ignore_if_missing
    }

    /// Creates the index without building it.
    #[must_use]
    pub fn deferred(mut self, deferred: bool) -> Self {
        self.deferred = deferred;
        self
    }

    /// Returns whether the index build is deferred.
    #[must_use]
    pub fn get_deferred(&self) -> bool {
        self.deferred
    }
}

/// How a sub-document mutation treats the enclosing document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StoreSemantics {
    /// The document must exist.
    #[default]
    Replace,
    /// The document is created when missing.
    Upsert,
    /// The document must not exist.
    Insert,
}

/// Consistency requirements of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScanConsistency {
    /// Indexes are read as they are, without waiting for pending mutations.
    #[default]
    NotBounded,
    /// Indexes include every mutation made before the query was issued.
    RequestPlus,
    /// Indexes include the mutations made by this client before the query was issued.
    StatementPlus,
}

/// Parameters bound into a query statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QueryParameters {
    /// The statement has no parameters.
    #[default]
    None,
    /// `$1`, `$2`, ... parameters.
    Positional(Vec<Value>),
    /// `$name` parameters.
    Named(Map<String, Value>),
}

impl QueryParameters {
    /// Builds parameters from a loose list of values.
    ///
    /// An empty list means no parameters. When the first value is a JSON object, its entries are
    /// used as named parameters and the remaining values are ignored. Otherwise every value is a
    /// positional parameter.
    ///
    /// ```
    /// use pail::QueryParameters;
    /// use serde_json::json;
    ///
    /// assert_eq!(QueryParameters::from_values(vec![]), QueryParameters::None);
    /// assert_eq!(
    ///     QueryParameters::from_values(vec![json!(1), json!("a")]),
    ///     QueryParameters::Positional(vec![json!(1), json!("a")])
    /// );
    /// assert!(matches!(
    ///     QueryParameters::from_values(vec![json!({ "id": 7 })]),
    ///     QueryParameters::Named(_)
    /// ));
    /// ```
    #[must_use]
    pub fn from_values(mut values: Vec<Value>) -> Self {
        if values.is_empty() {
            return Self::None;
        }

        if let Some(Value::Object(named)) = values.first_mut() {
            return Self::Named(std::mem::take(named));
        }

        Self::Positional(values)
    }

    /// Returns `true` when there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Positional(values) => values.is_empty(),
            Self::Named(values) => values.is_empty(),
        }
    }
}
