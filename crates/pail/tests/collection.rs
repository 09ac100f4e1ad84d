// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "This is a test module")]

//! Integration tests for the retried collection wrapper using only public API.

mod util;

use std::time::Duration;

use pail::{
    BulkOp, Cas, CounterOptions, ErrorKind, GetOptions, ReplaceOptions, RetryCollection, RetryReason, StoreError,
};
use serde_json::json;
use util::{FakeCollection, Script, clock, retry_options};

#[tokio::test]
async fn get_forwards_caller_options_and_attaches_strategy() {
    let collection = RetryCollection::new(FakeCollection::default(), retry_options());
    let options = GetOptions::new().timeout(Duration::from_secs(2));

    let result = collection.get("user::1", Some(&options)).await.expect("get must succeed");

    assert_eq!(result.content(), &json!({ "key": "user::1" }));
    assert_eq!(result.cas(), Cas::new(1));

    let submissions = collection.inner().script.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].timeout, Some(Duration::from_secs(2)));
    assert!(submissions[0].had_strategy);
}

#[tokio::test]
async fn every_call_gets_its_own_budget() {
    let collection = RetryCollection::new(
        FakeCollection::new(Script::default().fail_times(4, || StoreError::from_kind(ErrorKind::Timeout))),
        retry_options().retry_limit(2),
    );

    let first = collection.upsert("a", &json!(1), None).await.expect_err("first call must exhaust");
    assert_eq!(first.attempts(), Some(3));

    let second = collection.remove("a", None).await.expect("second call starts from a fresh budget");
    assert_eq!(second.cas(), Cas::new(5));

    let operations: Vec<_> = collection.inner().script.submissions().iter().map(|s| s.operation).collect();
    assert_eq!(operations, ["upsert", "upsert", "upsert", "remove", "remove"]);
}

#[tokio::test]
async fn replace_keeps_cas_across_attempts() {
    let collection = RetryCollection::new(
        FakeCollection::new(Script::default().fail_with(StoreError::from_kind(ErrorKind::DispatchFailure))),
        retry_options(),
    );
    let options = ReplaceOptions::new().cas(Cas::new(7));

    collection
        .replace("a", &json!({ "v": 2 }), Some(&options))
        .await
        .expect("replace must succeed");

    let submissions = collection.inner().script.submissions();
    assert_eq!(submissions.len(), 2);
    assert!(submissions.iter().all(|s| s.cas == Some(Cas::new(7))));
}

#[tokio::test]
async fn cas_mismatch_surfaces_immediately() {
    let collection = RetryCollection::new(
        FakeCollection::new(Script::default().fail_with(StoreError::from_kind(ErrorKind::CasMismatch))),
        retry_options(),
    );

    let error = collection.insert("a", &json!(1), None).await.expect_err("conflict must surface");

    assert!(!error.is_exhausted());
    assert_eq!(error.inner().kind(), ErrorKind::CasMismatch);
    assert_eq!(collection.inner().script.submissions().len(), 1);
}

#[tokio::test]
async fn routing_failures_do_not_consume_budget() {
    let collection = RetryCollection::new(
        FakeCollection::new(Script::default().fail_times(6, || {
            StoreError::from_kind(ErrorKind::Other).with_retry_reason(RetryReason::CollectionOutdated)
        })),
        retry_options().retry_limit(0),
    );

    collection.touch("a", Duration::from_secs(60), None).await.expect("routing failures are retried");

    assert_eq!(collection.inner().script.submissions().len(), 7);
}

#[tokio::test]
async fn delay_is_awaited_between_attempts() {
    let clock = clock();
    let collection = RetryCollection::new(
        FakeCollection::new(Script::default().fail_times(2, || StoreError::from_kind(ErrorKind::Overload))),
        pail::RetryOptions::new(&clock).delay(Duration::from_millis(40)),
    );

    let stopwatch = clock.stopwatch();
    collection.get("a", None).await.expect("get must succeed");

    assert_eq!(stopwatch.elapsed(), Duration::from_millis(80));
}

#[tokio::test]
async fn recovers_within_limit_after_fixed_delays() {
    let clock = clock();
    let collection = RetryCollection::new(
        FakeCollection::new(Script::default().fail_times(3, || StoreError::from_kind(ErrorKind::Timeout))),
        pail::RetryOptions::new(&clock).retry_limit(3).delay(Duration::from_millis(10)),
    );

    let stopwatch = clock.stopwatch();
    collection.get("a", None).await.expect("fourth attempt succeeds");

    assert_eq!(stopwatch.elapsed(), Duration::from_millis(30));
    assert_eq!(collection.inner().script.submissions().len(), 4);
}

#[tokio::test]
async fn counter_is_retried_with_initial_and_expiry() {
    let collection = RetryCollection::new(
        FakeCollection::new(Script::default().fail_with(StoreError::from_kind(ErrorKind::Overload))),
        retry_options(),
    );
    let options = CounterOptions::new().initial(10).expiry(Duration::from_secs(300));

    let result = collection.counter("hits", -3, Some(&options)).await.expect("counter must succeed");

    assert_eq!(result.value(), 7);
    assert_eq!(result.cas(), Cas::new(9));

    let submissions = collection.inner().script.submissions();
    assert_eq!(submissions.len(), 2);
    assert!(
        submissions
            .iter()
            .all(|s| s.operation == "counter" && s.expiry == Some(Duration::from_secs(300)) && s.had_strategy)
    );
}

#[tokio::test]
async fn counter_on_missing_document_without_initial_surfaces() {
    let collection = RetryCollection::new(FakeCollection::default(), retry_options());

    let error = collection.counter("hits", 1, None).await.expect_err("missing counter must surface");

    assert!(!error.is_exhausted());
    assert_eq!(error.inner().kind(), ErrorKind::DocumentNotFound);
    assert_eq!(collection.inner().script.submissions().len(), 1);
}

#[tokio::test]
async fn bulk_resubmits_the_whole_batch() {
    let collection = RetryCollection::new(
        FakeCollection::new(Script::default().fail_times(2, || StoreError::from_kind(ErrorKind::Timeout))),
        retry_options().retry_limit(2),
    );
    let ops = vec![
        BulkOp::Get { key: "a".to_string() },
        BulkOp::Upsert {
            key: "b".to_string(),
            value: json!({ "v": 1 }),
        },
        BulkOp::Counter {
            key: "c".to_string(),
            delta: 1,
            initial: Some(0),
        },
    ];

    let results = collection.bulk(&ops, None).await.expect("third attempt succeeds");

    let keys: Vec<_> = results.iter().map(pail::BulkResult::key).collect();
    assert_eq!(keys, ["a", "b", "c"]);
    assert_eq!(results[0].content(), Some(&json!({ "key": "a" })));

    let submissions = collection.inner().script.submissions();
    assert_eq!(submissions.len(), 3);
    assert!(submissions.iter().all(|s| s.operation == "bulk" && s.bulk == ops));
}
