// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Bounded, classification-driven retries for clustered document-store clients.
//!
//! This crate sits between application code and a multi-node document-store client. It retries an
//! operation a bounded number of times when the failure looks like transient connectivity trouble
//! (timeouts, overload, dropped streams, a node going away) and surfaces every other failure
//! (document missing, CAS conflict, invalid request) on first occurrence.
//!
//! # Retry Protocol
//!
//! Retries happen at two levels that share one [`RetryBudget`]:
//!
//! - The **client engine** retries individual physical requests internally. Before each one it asks
//!   the [`RetryStrategy`] attached to the per-call options, which is the budget itself.
//! - The **outer loop** in [`RetryContext::run`] re-issues the whole logical call after a failure
//!   the engine gave up on, sleeping a fixed delay between attempts.
//!
//! Because both levels count against the same budget, a transient failure is never retried more
//! often than the configured limit allows. Routing failures such as [`RetryReason::NotMyPartition`]
//! are always retried and never consume the budget.
//!
//! # Core Types
//!
//! - [`RetryOptions`]: Pipeline-wide settings: clock, limit, delay, delegate strategy and logging.
//! - [`RetryContext`]: Binds one logical operation to a fresh budget and runs it.
//! - [`Classifier`]: Decides whether a failure is transient, permanent or always-retry.
//! - [`RetryError`]: Either the original permanent error or the exhausted wrapper around the last one.
//! - [`LookupIn`] and [`MutateIn`]: Builders for batched sub-document requests retried as one unit.
//! - [`RetryCollection`], [`RetryCluster`] and [`RetryIndexManager`]: Wrappers that run every client
//!   call inside its own retry context.
//!
//! # Quick Start
//!
//! ```
//! use pail::{Collection, RetryCollection, RetryError, RetryOptions};
//! use serde_json::json;
//! use tick::Clock;
//!
//! async fn save<C: Collection>(collection: C, clock: &Clock) -> Result<(), RetryError<C::Error>> {
//!     let options = RetryOptions::new(clock).name("orders").retry_limit(3);
//!     let orders = RetryCollection::new(collection, options);
//!
//!     orders.upsert("order::1", &json!({ "total": 42 }), None).await?;
//!
//!     orders
//!         .mutate_in("order::1")
//!         .array_append("history", json!("paid"))
//!         .counter("version", 1)
//!         .execute()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! > **Note**: Delays are awaited on a [`Clock`][tick::Clock] from the [`tick`] crate, passed in
//! > through [`RetryOptions::new`]. Tests can drive it with `tick::ClockControl`.
//!
//! # Recovery Metadata
//!
//! [`StoreError`] implements [`Recovery`], and [`Classifier::from_recovery`] classifies any error
//! type that does, so errors from other crates in the same ecosystem plug in directly.
//!
//! ## Features
//!
//! - `logs`: Emits `pail.retry`, `pail.retry.exhausted` and `pail.retry.permanent` events through
//!   `tracing` when enabled with `RetryOptions::enable_logs`.
//! - `serde`: Enables `RetryConfig` for loading retry settings from configuration files.

#[doc(inline)]
pub use recoverable::{Recovery, RecoveryInfo, RecoveryKind};

mod budget;
mod classify;
mod constants;
mod context;
mod error;
mod facade;
mod options;
mod resource;
mod strategy;
mod subdoc;

pub use budget::RetryBudget;
pub use classify::{Classifier, FailureReason, classify};
pub use context::{AttemptArgs, RetryContext};
pub use error::{ErrorKind, RetryError, StoreError, StoreFailure};
pub use facade::{RetryCluster, RetryCollection, RetryIndexManager};
#[cfg(any(feature = "serde", test))]
pub use options::{ConfigError, RetryConfig};
pub use options::{
    BulkOptions, CallOptions, CounterOptions, GetOptions, IndexOptions, InsertOptions, LookupInOptions, MutateInOptions,
    QueryOptions, QueryParameters, RemoveOptions, ReplaceOptions, RetryOptions, ScanConsistency, StoreSemantics, TouchOptions,
    UpsertOptions, merge_options,
};
pub use resource::{
    BulkOp, BulkResult, Cas, Cluster, Collection, CounterResult, GetResult, IndexInfo, MutationResult, QueryIndexManager,
    QueryResult,
};
pub use strategy::{RetryAction, RetryReason, RetryRequest, RetryStrategy};
pub use subdoc::{FieldResult, FieldStatus, LookupIn, MultiResult, MutateIn, SubdocFlags, SubdocOp, SubdocOpKind, SubdocValue};

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
pub(crate) mod testing;
