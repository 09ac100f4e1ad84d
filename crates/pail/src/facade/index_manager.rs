// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{IndexInfo, IndexOptions, QueryIndexManager, RetryContext, RetryError, RetryOptions};

/// A query index manager whose calls are retried.
#[derive(Debug, Clone)]
pub struct RetryIndexManager<M> {
    manager: M,
    options: RetryOptions,
}

impl<M: QueryIndexManager> RetryIndexManager<M> {
    /// Wraps an index manager.
    #[must_use]
    pub fn new(manager: M, options: RetryOptions) -> Self {
        Self { manager, options }
    }

    /// The wrapped index manager.
    #[must_use]
    pub fn inner(&self) -> &M {
        &self.manager
    }

    /// Creates the primary index of `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn create_primary_index(&self, bucket: &str, options: Option<&IndexOptions>) -> Result<(), RetryError<M::Error>> {
        RetryContext::index_manager("create_primary_index", &self.options, &self.manager, move |manager, args| async move {
            manager.create_primary_index(bucket, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Creates a secondary index named `name` over `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn create_index(
        &self,
        bucket: &str,
        name: &str,
        keys: &[String],
        options: Option<&IndexOptions>,
    ) -> Result<(), RetryError<M::Error>> {
        RetryContext::index_manager("create_index", &self.options, &self.manager, move |manager, args| async move {
            manager.create_index(bucket, name, keys, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Drops the secondary index named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn drop_index(&self, bucket: &str, name: &str, options: Option<&IndexOptions>) -> Result<(), RetryError<M::Error>> {
        RetryContext::index_manager("drop_index", &self.options, &self.manager, move |manager, args| async move {
            manager.drop_index(bucket, name, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Lists the indexes of `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the call fails permanently or the retry budget runs out.
    pub async fn get_all_indexes(&self, bucket: &str, options: Option<&IndexOptions>) -> Result<Vec<IndexInfo>, RetryError<M::Error>> {
        RetryContext::index_manager("get_all_indexes", &self.options, &self.manager, move |manager, args| async move {
            manager.get_all_indexes(bucket, &args.options(options)).await
        })
        .run()
        .await
    }
}
