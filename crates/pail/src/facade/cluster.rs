// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde_json::Value;

use crate::{
    Cluster, QueryOptions, QueryParameters, QueryResult, RetryContext, RetryError, RetryOptions, ScanConsistency,
};

/// A cluster whose queries are retried.
///
/// Every query runs in a fresh [`RetryContext`] built from the same [`RetryOptions`].
#[derive(Debug, Clone)]
pub struct RetryCluster<C> {
    cluster: C,
    options: RetryOptions,
}

impl<C: Cluster> RetryCluster<C> {
    /// Wraps a cluster.
    #[must_use]
    pub fn new(cluster: C, options: RetryOptions) -> Self {
        Self { cluster, options }
    }

    /// The wrapped cluster.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.cluster
    }

    /// The retry settings applied to every query.
    #[must_use]
    pub fn retry_options(&self) -> &RetryOptions {
        &self.options
    }

    /// Runs a query statement.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the query fails permanently or the retry budget runs out.
    pub async fn query(&self, statement: &str, options: Option<&QueryOptions>) -> Result<QueryResult, RetryError<C::Error>> {
        RetryContext::cluster("query", &self.options, &self.cluster, move |cluster, args| async move {
            cluster.query(statement, &args.options(options)).await
        })
        .run()
        .await
    }

    /// Runs a query statement with the given consistency and loosely typed parameters.
    ///
    /// See [`QueryParameters::from_values`] for how `parameters` are bound.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the query fails permanently or the retry budget runs out.
    pub async fn query_with_consistency(
        &self,
        statement: &str,
        consistency: ScanConsistency,
        parameters: Vec<Value>,
    ) -> Result<QueryResult, RetryError<C::Error>> {
        let options = QueryOptions::new()
            .consistency(consistency)
            .parameters(QueryParameters::from_values(parameters));

        self.query(statement, Some(&options)).await
    }

    /// Runs a query statement without waiting for pending index updates.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the query fails permanently or the retry budget runs out.
    pub async fn query_not_bounded(&self, statement: &str, parameters: Vec<Value>) -> Result<QueryResult, RetryError<C::Error>> {
        self.query_with_consistency(statement, ScanConsistency::NotBounded, parameters).await
    }

    /// Runs a query statement that observes every mutation made before it was issued.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the query fails permanently or the retry budget runs out.
    pub async fn query_request_plus(&self, statement: &str, parameters: Vec<Value>) -> Result<QueryResult, RetryError<C::Error>> {
        self.query_with_consistency(statement, ScanConsistency::RequestPlus, parameters).await
    }

    /// Runs a query statement that observes every mutation this client made before it was issued.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the query fails permanently or the retry budget runs out.
    pub async fn query_statement_plus(&self, statement: &str, parameters: Vec<Value>) -> Result<QueryResult, RetryError<C::Error>> {
        self.query_with_consistency(statement, ScanConsistency::StatementPlus, parameters).await
    }
}
