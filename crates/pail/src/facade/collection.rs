// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use serde_json::Value;

use crate::{
    BulkOp, BulkOptions, BulkResult, Collection, CounterOptions, CounterResult, GetOptions, GetResult, InsertOptions, LookupIn,
    MutateIn, MutationResult, RemoveOptions, ReplaceOptions, RetryContext, RetryError, RetryOptions, TouchOptions, UpsertOptions,
};

/// A collection whose calls are retried.
///
/// Every call runs in a fresh [`RetryContext`] built from the same [`RetryOptions`], so calls never
/// share a retry budget.
///
/// # Examples
///
/// ```
/// use pail::{Collection, RetryCollection, RetryError};
/// use serde_json::json;
///
/// async fn rename<C: Collection>(collection: &RetryCollection<C>) -> Result<(), RetryError<C::Error>> {
///     let current = collection.get("user::1", None).await?;
///     println!("renaming {}", current.content()["name"]);
///
///     collection.mutate_in("user::1").replace("name", json!("pail")).execute().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RetryCollection<C> {
    collection: C,
    options: RetryOptions,
}

impl<C: Collection> RetryCollection<C> {
    /// Wraps a collection.
    #[must_use]
    pub fn new(collection: C, options: RetryOptions) -> Self {
        Self { collection, options }
    }

    /// The wrapped collection.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.collection
    }

    /// The retry settings applied to every call.
    #[must_use]
    pub fn retry_options(&self) -> &RetryOptions {
        &self.options
    }

    /// Reads a whole document.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn get(&self, key: &str, options: Option<&GetOptions>) -> Result<GetResult, RetryError<C::Error>> {
        RetryContext::collection("get", &self.options, &self.collection, move |collection, args| async move {
            collection.get(key, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Creates a document that must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn insert(
        &self,
        key: &str,
        value: &Value,
        options: Option<&InsertOptions>,
    ) -> Result<MutationResult, RetryError<C::Error>> {
        RetryContext::collection("insert", &self.options, &self.collection, move |collection, args| async move {
            collection.insert(key, value, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Creates or overwrites a document.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn upsert(
        &self,
        key: &str,
        value: &Value,
        options: Option<&UpsertOptions>,
    ) -> Result<MutationResult, RetryError<C::Error>> {
        RetryContext::collection("upsert", &self.options, &self.collection, move |collection, args| async move {
            collection.upsert(key, value, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Overwrites a document that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn replace(
        &self,
        key: &str,
        value: &Value,
        options: Option<&ReplaceOptions>,
    ) -> Result<MutationResult, RetryError<C::Error>> {
        RetryContext::collection("replace", &self.options, &self.collection, move |collection, args| async move {
            collection.replace(key, value, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Removes a document.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn remove(&self, key: &str, options: Option<&RemoveOptions>) -> Result<MutationResult, RetryError<C::Error>> {
        RetryContext::collection("remove", &self.options, &self.collection, move |collection, args| async move {
            collection.remove(key, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Updates the expiry of a document.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn touch(
        &self,
        key: &str,
        expiry: Duration,
        options: Option<&TouchOptions>,
    ) -> Result<MutationResult, RetryError<C::Error>> {
        RetryContext::collection("touch", &self.options, &self.collection, move |collection, args| async move {
            collection.touch(key, expiry, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Adds `delta` to the counter document `key`.
    ///
    /// Set [`CounterOptions::initial`] to create a missing counter instead of failing.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn counter(
        &self,
        key: &str,
        delta: i64,
        options: Option<&CounterOptions>,
    ) -> Result<CounterResult, RetryError<C::Error>> {
        RetryContext::collection("counter", &self.options, &self.collection, move |collection, args| async move {
            collection.counter(key, delta, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Submits several whole-document operations as one batch.
    ///
    /// A transient failure resubmits the whole batch.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the batch fails permanently or the retry budget runs out.
    pub async fn bulk(&self, ops: &[BulkOp], options: Option<&BulkOptions>) -> Result<Vec<BulkResult>, RetryError<C::Error>> {
        RetryContext::collection("bulk", &self.options, &self.collection, move |collection, args| async move {
            collection.bulk(ops, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Starts a batch of sub-document lookups against `key`.
    pub fn lookup_in(&self, key: impl Into<String>) -> LookupIn<'_, C> {
        LookupIn::new(&self.collection, &self.options, key)
    }

    /// Starts a batch of sub-document mutations against `key`.
    pub fn mutate_in(&self, key: impl Into<String>) -> MutateIn<'_, C> {
        MutateIn::new(&self.collection, &self.options, key)
    }
}
