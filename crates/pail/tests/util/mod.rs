// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(dead_code, reason = "Not every test binary uses every fake")]

//! Scripted client fakes shared by the integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use pail::{
    BulkOp, BulkOptions, BulkResult, CallOptions, Cas, Cluster, Collection, CounterOptions, CounterResult, ErrorKind, FieldResult,
    FieldStatus, GetOptions, GetResult, IndexInfo, IndexOptions, InsertOptions, LookupInOptions, MultiResult, MutateInOptions, MutationResult, QueryIndexManager, QueryOptions,
    QueryParameters, QueryResult, RemoveOptions, ReplaceOptions, RetryAction, RetryOptions, RetryReason, RetryRequest,
    ScanConsistency, StoreError, SubdocOp, TouchOptions, UpsertOptions,
};
use serde_json::{Value, json};
use tick::{Clock, ClockControl};

/// Retry options on a clock that fires every delay immediately.
pub fn retry_options() -> RetryOptions {
    RetryOptions::new(clock()).name("integration")
}

pub fn clock() -> Clock {
    ClockControl::new().auto_advance_timers(true).to_clock()
}

/// One request the fake received.
#[derive(Debug, Clone)]
pub struct Submission {
    pub operation: &'static str,
    pub key: String,
    pub ops: Vec<SubdocOp>,
    pub bulk: Vec<BulkOp>,
    pub had_strategy: bool,
    pub timeout: Option<Duration>,
    pub expiry: Option<Duration>,
    pub cas: Option<Cas>,
}

/// Failures the fake reports, in order, before it starts succeeding.
///
/// Engine reasons model routing trouble the client engine handles internally: before each
/// request the fake asks the strategy attached to the call options whether to keep going.
#[derive(Debug, Default)]
pub struct Script {
    failures: Mutex<VecDeque<StoreError>>,
    engine_reasons: Mutex<VecDeque<RetryReason>>,
    engine_calls: Mutex<u32>,
    submissions: Mutex<Vec<Submission>>,
}

impl Script {
    pub fn fail_with(self, error: StoreError) -> Self {
        self.failures.lock().expect("lock poisoned").push_back(error);
        self
    }

    pub fn fail_times(self, times: usize, error: impl Fn() -> StoreError) -> Self {
        (0..times).fold(self, |script, _| script.fail_with(error()))
    }

    pub fn engine_retries(self, reason: RetryReason, times: usize) -> Self {
        self.engine_reasons.lock().expect("lock poisoned").extend(std::iter::repeat_n(reason, times));
        self
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().expect("lock poisoned").clone()
    }

    /// How many times the engine consulted the attached strategy.
    pub fn engine_calls(&self) -> u32 {
        *self.engine_calls.lock().expect("lock poisoned")
    }

    fn record<O: CallOptions>(&self, submission: Submission, options: &O) -> Result<(), StoreError> {
        let submission = Submission {
            had_strategy: options.get_retry_strategy().is_some(),
            ..submission
        };
        self.submissions.lock().expect("lock poisoned").push(submission.clone());

        self.run_engine(submission.operation, options)?;

        let failure = self.failures.lock().expect("lock poisoned").pop_front();
        failure.map_or(Ok(()), Err)
    }

    fn run_engine<O: CallOptions>(&self, operation: &'static str, options: &O) -> Result<(), StoreError> {
        let mut attempts = 0;

        loop {
            let next = self.engine_reasons.lock().expect("lock poisoned").pop_front();
            let Some(reason) = next else {
                return Ok(());
            };

            let Some(strategy) = options.get_retry_strategy() else {
                return Err(StoreError::from_kind(ErrorKind::Timeout).with_retry_reason(reason));
            };

            *self.engine_calls.lock().expect("lock poisoned") += 1;

            match strategy.retry_after(&RetryRequest::new(operation, true, attempts), reason) {
                RetryAction::RetryAfter(_) => attempts += 1,
                RetryAction::Stop => {
                    return Err(StoreError::from_kind(ErrorKind::Timeout).with_retry_reason(reason));
                }
            }
        }
    }
}

fn submission(operation: &'static str, key: &str) -> Submission {
    Submission {
        operation,
        key: key.to_string(),
        ops: Vec::new(),
        bulk: Vec::new(),
        had_strategy: false,
        timeout: None,
        expiry: None,
        cas: None,
    }
}

/// A collection that replays a [`Script`].
#[derive(Debug, Default)]
pub struct FakeCollection {
    pub script: Script,
}

impl FakeCollection {
    pub fn new(script: Script) -> Self {
        Self { script }
    }

    fn fields(ops: &[SubdocOp]) -> Vec<FieldResult> {
        ops.iter()
            .map(|op| FieldResult::new(op.path(), FieldStatus::Success, Some(json!(op.path()))))
            .collect()
    }
}

impl Collection for FakeCollection {
    type Error = StoreError;

    async fn get(&self, key: &str, options: &GetOptions) -> Result<GetResult, StoreError> {
        let submission = Submission {
            timeout: options.get_timeout(),
            ..submission("get", key)
        };
        self.script.record(submission, options)?;
        Ok(GetResult::new(json!({ "key": key }), Cas::new(1)))
    }

    async fn insert(&self, key: &str, _value: &Value, options: &InsertOptions) -> Result<MutationResult, StoreError> {
        self.script.record(submission("insert", key), options)?;
        Ok(MutationResult::new(Cas::new(2)))
    }

    async fn upsert(&self, key: &str, _value: &Value, options: &UpsertOptions) -> Result<MutationResult, StoreError> {
        self.script.record(submission("upsert", key), options)?;
        Ok(MutationResult::new(Cas::new(3)))
    }

    async fn replace(&self, key: &str, _value: &Value, options: &ReplaceOptions) -> Result<MutationResult, StoreError> {
        let submission = Submission {
            cas: options.get_cas(),
            ..submission("replace", key)
        };
        self.script.record(submission, options)?;
        Ok(MutationResult::new(Cas::new(4)))
    }

    async fn remove(&self, key: &str, options: &RemoveOptions) -> Result<MutationResult, StoreError> {
        self.script.record(submission("remove", key), options)?;
        Ok(MutationResult::new(Cas::new(5)))
    }

    async fn touch(&self, key: &str, _expiry: Duration, options: &TouchOptions) -> Result<MutationResult, StoreError> {
        self.script.record(submission("touch", key), options)?;
        Ok(MutationResult::new(Cas::new(6)))
    }

    async fn counter(&self, key: &str, delta: i64, options: &CounterOptions) -> Result<CounterResult, StoreError> {
        let submission = Submission {
            expiry: options.get_expiry(),
            ..submission("counter", key)
        };
        self.script.record(submission, options)?;

        let Some(initial) = options.get_initial() else {
            return Err(StoreError::from_kind(ErrorKind::DocumentNotFound));
        };
        Ok(CounterResult::new(initial.saturating_add_signed(delta), Cas::new(9)))
    }

    async fn bulk(&self, ops: &[BulkOp], options: &BulkOptions) -> Result<Vec<BulkResult>, StoreError> {
        let submission = Submission {
            bulk: ops.to_vec(),
            ..submission("bulk", "")
        };
        self.script.record(submission, options)?;

        Ok(ops
            .iter()
            .zip(10..)
            .map(|(op, cas)| match op {
                BulkOp::Get { key } => BulkResult::new(key.as_str(), Some(Cas::new(cas)), Some(json!({ "key": key }))),
                op => BulkResult::new(op.key(), Some(Cas::new(cas)), None),
            })
            .collect())
    }

    async fn lookup_in(&self, key: &str, ops: &[SubdocOp], options: &LookupInOptions) -> Result<MultiResult, StoreError> {
        let submission = Submission {
            ops: ops.to_vec(),
            ..submission("lookup_in", key)
        };
        self.script.record(submission, options)?;
        Ok(MultiResult::new(Cas::new(7), Self::fields(ops)))
    }

    async fn mutate_in(&self, key: &str, ops: &[SubdocOp], options: &MutateInOptions) -> Result<MultiResult, StoreError> {
        let submission = Submission {
            ops: ops.to_vec(),
            cas: options.get_cas(),
            ..submission("mutate_in", key)
        };
        self.script.record(submission, options)?;
        Ok(MultiResult::new(Cas::new(8), Self::fields(ops)))
    }
}

/// A cluster that replays a [`Script`] and remembers how each query was bound.
#[derive(Debug, Default)]
pub struct FakeCluster {
    pub script: Script,
    pub queries: Mutex<Vec<(String, ScanConsistency, QueryParameters)>>,
}

impl FakeCluster {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            queries: Mutex::default(),
        }
    }
}

impl Cluster for FakeCluster {
    type Error = StoreError;

    async fn query(&self, statement: &str, options: &QueryOptions) -> Result<QueryResult, StoreError> {
        self.queries.lock().expect("lock poisoned").push((
            statement.to_string(),
            options.get_consistency(),
            options.get_parameters().clone(),
        ));
        self.script.record(submission("query", statement), options)?;
        Ok(QueryResult::new(vec![json!({ "statement": statement })]))
    }
}

/// An index manager that replays a [`Script`].
#[derive(Debug, Default)]
pub struct FakeIndexManager {
    pub script: Script,
}

impl FakeIndexManager {
    pub fn new(script: Script) -> Self {
        Self { script }
    }
}

impl QueryIndexManager for FakeIndexManager {
    type Error = StoreError;

    async fn create_primary_index(&self, bucket: &str, options: &IndexOptions) -> Result<(), StoreError> {
        self.script.record(submission("create_primary_index", bucket), options)
    }

    async fn create_index(&self, bucket: &str, name: &str, _keys: &[String], options: &IndexOptions) -> Result<(), StoreError> {
        self.script.record(submission("create_index", &format!("{bucket}/{name}")), options)
    }

    async fn drop_index(&self, bucket: &str, name: &str, options: &IndexOptions) -> Result<(), StoreError> {
        self.script.record(submission("drop_index", &format!("{bucket}/{name}")), options)
    }

    async fn get_all_indexes(&self, bucket: &str, options: &IndexOptions) -> Result<Vec<IndexInfo>, StoreError> {
        self.script.record(submission("get_all_indexes", bucket), options)?;
        Ok(vec![IndexInfo::new("#primary", bucket, Vec::new(), true)])
    }
}
