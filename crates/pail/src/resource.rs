// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Capability traits implemented by store clients, and the values they return.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use serde_json::Value;

use crate::{
    BulkOptions, CounterOptions, GetOptions, IndexOptions, InsertOptions, LookupInOptions, MultiResult, MutateInOptions,
    QueryOptions, RemoveOptions, ReplaceOptions, StoreFailure, SubdocOp, TouchOptions, UpsertOptions,
};

/// Compare-and-swap value identifying one version of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cas(u64);

impl Cas {
    /// Wraps a raw CAS value.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw CAS value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for Cas {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A whole document read from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct GetResult {
    content: Value,
    cas: Cas,
}

impl GetResult {
    /// Creates a result.
    #[must_use]
    pub fn new(content: Value, cas: Cas) -> Self {
        Self { content, cas }
    }

    /// The document body.
    #[must_use]
    pub fn content(&self) -> &Value {
        &self.content
    }

    /// Consumes the result and returns the document body.
    #[must_use]
    pub fn into_content(self) -> Value {
        self.content
    }

    /// The CAS value of the document that was read.
    #[must_use]
    pub fn cas(&self) -> Cas {
        self.cas
    }
}

/// The outcome of a whole-document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    cas: Cas,
}

impl MutationResult {
    /// Creates a result.
    #[must_use]
    pub fn new(cas: Cas) -> Self {
        Self { cas }
    }

    /// The CAS value of the document after the write.
    #[must_use]
    pub fn cas(&self) -> Cas {
        self.cas
    }
}

/// The outcome of a document counter update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterResult {
    value: u64,
    cas: Cas,
}

impl CounterResult {
    /// Creates a result.
    #[must_use]
    pub fn new(value: u64, cas: Cas) -> Self {
        Self { value, cas }
    }

    /// The counter value after the update.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// The CAS value of the counter document after the update.
    #[must_use]
    pub fn cas(&self) -> Cas {
        self.cas
    }
}

/// One whole-document operation of a bulk batch.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BulkOp {
    /// Reads a document.
    Get {
        /// Document key.
        key: String,
    },
    /// Creates a document that must not exist yet.
    Insert {
        /// Document key.
        key: String,
        /// Document body.
        value: Value,
    },
    /// Creates or overwrites a document.
    Upsert {
        /// Document key.
        key: String,
        /// Document body.
        value: Value,
    },
    /// Overwrites a document, optionally guarded by a CAS value.
    Replace {
        /// Document key.
        key: String,
        /// Document body.
        value: Value,
        /// Expected CAS value.
        cas: Option<Cas>,
    },
    /// Removes a document, optionally guarded by a CAS value.
    Remove {
        /// Document key.
        key: String,
        /// Expected CAS value.
        cas: Option<Cas>,
    },
    /// Updates the expiry of a document.
    Touch {
        /// Document key.
        key: String,
        /// New expiry.
        expiry: Duration,
    },
    /// Adds `delta` to a counter document, creating it with `initial` when given.
    Counter {
        /// Document key.
        key: String,
        /// Signed amount to add.
        delta: i64,
        /// Value to create the counter with when it does not exist.
        initial: Option<u64>,
    },
}

impl BulkOp {
    /// The key of the document this operation targets.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Get { key }
            | Self::Insert { key, .. }
            | Self::Upsert { key, .. }
            | Self::Replace { key, .. }
            | Self::Remove { key, .. }
            | Self::Touch { key, .. }
            | Self::Counter { key, .. } => key,
        }
    }
}

/// The per-document outcome of one [`BulkOp`].
#[derive(Debug, Clone, PartialEq)]
pub struct BulkResult {
    key: String,
    cas: Option<Cas>,
    content: Option<Value>,
}

impl BulkResult {
    /// Creates a result.
    #[must_use]
    pub fn new(key: impl Into<String>, cas: Option<Cas>, content: Option<Value>) -> Self {
        Self {
            key: key.into(),
            cas,
            content,
        }
    }

    /// The document key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The CAS value reported for the document, if the operation produced one.
    #[must_use]
    pub fn cas(&self) -> Option<Cas> {
        self.cas
    }

    /// The returned content: the body for reads, the new value for counters.
    #[must_use]
    pub fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }
}

/// Rows returned by a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    rows: Vec<Value>,
}

impl QueryResult {
    /// Creates a result.
    #[must_use]
    pub fn new(rows: Vec<Value>) -> Self {
        Self { rows }
    }

    /// The returned rows, in the order the service produced them.
    #[must_use]
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    /// Consumes the result and returns the rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Value> {
        self.rows
    }
}

/// Description of a query index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    name: String,
    bucket: String,
    keys: Vec<String>,
    is_primary: bool,
}

impl IndexInfo {
    /// Creates an index description.
    #[must_use]
    pub fn new(name: impl Into<String>, bucket: impl Into<String>, keys: Vec<String>, is_primary: bool) -> Self {
        Self {
            name: name.into(),
            bucket: bucket.into(),
            keys,
            is_primary,
        }
    }

    /// The index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bucket the index belongs to.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The indexed expressions.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Whether this is the primary index of the bucket.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

/// A connected cluster that runs queries.
pub trait Cluster: Send + Sync {
    /// The error reported by the client.
    type Error: StoreFailure + Error + Send + Sync + 'static;

    /// Runs a query statement.
    fn query(&self, statement: &str, options: &QueryOptions) -> impl Future<Output = Result<QueryResult, Self::Error>> + Send;
}

/// A connected collection of documents.
pub trait Collection: Send + Sync {
    /// The error reported by the client.
    type Error: StoreFailure + Error + Send + Sync + 'static;

    /// Reads a whole document.
    fn get(&self, key: &str, options: &GetOptions) -> impl Future<Output = Result<GetResult, Self::Error>> + Send;

    /// Creates a document that must not exist yet.
    fn insert(
        &self,
        key: &str,
        value: &Value,
        options: &InsertOptions,
    ) -> impl Future<Output = Result<MutationResult, Self::Error>> + Send;

    /// Creates or overwrites a document.
    fn upsert(
        &self,
        key: &str,
        value: &Value,
        options: &UpsertOptions,
    ) -> impl Future<Output = Result<MutationResult, Self::Error>> + Send;

    /// Overwrites a document that must exist.
    fn replace(
        &self,
        key: &str,
        value: &Value,
        options: &ReplaceOptions,
    ) -> impl Future<Output = Result<MutationResult, Self::Error>> + Send;

    /// Removes a document.
    fn remove(&self, key: &str, options: &RemoveOptions) -> impl Future<Output = Result<MutationResult, Self::Error>> + Send;

    /// Updates the expiry of a document.
    fn touch(
        &self,
        key: &str,
        expiry: Duration,
        options: &TouchOptions,
    ) -> impl Future<Output = Result<MutationResult, Self::Error>> + Send;

    /// Adds `delta` to a counter document and returns the new value.
    ///
    /// A missing document is created from [`CounterOptions::get_initial`] when set and fails
    /// otherwise.
    fn counter(
        &self,
        key: &str,
        delta: i64,
        options: &CounterOptions,
    ) -> impl Future<Output = Result<CounterResult, Self::Error>> + Send;

    /// Submits several whole-document operations as one batch.
    ///
    /// The returned results follow the order of `ops`. The batch fails as a whole when any
    /// operation fails.
    fn bulk(&self, ops: &[BulkOp], options: &BulkOptions) -> impl Future<Output = Result<Vec<BulkResult>, Self::Error>> + Send;

    /// Runs a batch of sub-document lookups against one document.
    ///
    /// The returned fields follow the order of `ops`.
    fn lookup_in(
        &self,
        key: &str,
        ops: &[SubdocOp],
        options: &LookupInOptions,
    ) -> impl Future<Output = Result<MultiResult, Self::Error>> + Send;

    /// Runs a batch of sub-document mutations against one document as a single atomic request.
    ///
    /// The returned fields follow the order of `ops`.
    fn mutate_in(
        &self,
        key: &str,
        ops: &[SubdocOp],
        options: &MutateInOptions,
    ) -> impl Future<Output = Result<MultiResult, Self::Error>> + Send;
}

/// Manages the query indexes of a cluster.
pub trait QueryIndexManager: Send + Sync {
    /// The error reported by the client.
    type Error: StoreFailure + Error + Send + Sync + 'static;

    /// Creates the primary index of a bucket.
    fn create_primary_index(&self, bucket: &str, options: &IndexOptions) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Creates a secondary index over the given expressions.
    fn create_index(
        &self,
        bucket: &str,
        name: &str,
        keys: &[String],
        options: &IndexOptions,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Drops a secondary index.
    fn drop_index(&self, bucket: &str, name: &str, options: &IndexOptions) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Lists the indexes of a bucket.
    fn get_all_indexes(
        &self,
        bucket: &str,
        options: &IndexOptions,
    ) -> impl Future<Output = Result<Vec<IndexInfo>, Self::Error>> + Send;
}
