// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Retry configuration and the per-call options handed to store clients.

mod call;
#[cfg(any(feature = "serde", test))]
mod config;

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

pub use call::{
    BulkOptions, CallOptions, CounterOptions, GetOptions, IndexOptions, InsertOptions, LookupInOptions, MutateInOptions,
    QueryOptions, QueryParameters, RemoveOptions, ReplaceOptions, ScanConsistency, StoreSemantics, TouchOptions, UpsertOptions,
    merge_options,
};
#[cfg(any(feature = "serde", test))]
pub use config::{ConfigError, RetryConfig};
use tick::Clock;

use crate::RetryBudget;
use crate::constants::{DEFAULT_DELAY, DEFAULT_PIPELINE_NAME, DEFAULT_RETRY_LIMIT};
use crate::context::Telemetry;

/// Retry settings shared by every call made through one pipeline.
///
/// A `RetryOptions` value is a recipe: each logical call gets its own fresh
/// [`RetryBudget`] from [`RetryOptions::budget`], so attempts are never shared between calls.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use pail::RetryOptions;
/// use tick::Clock;
///
/// # fn example(clock: Clock) {
/// let options = RetryOptions::new(&clock)
///     .name("orders")
///     .retry_limit(5)
///     .delay(Duration::from_millis(50));
///
/// let budget = options.budget();
/// assert_eq!(budget.limit(), 5);
/// assert_eq!(budget.attempts(), 0);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RetryOptions {
    clock: Clock,
    name: Cow<'static, str>,
    retry_limit: u32,
    delay: Duration,
    delegate: Option<Arc<dyn crate::RetryStrategy>>,
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
}

impl RetryOptions {
    /// Creates options with a clock. Initializes with `name = "default"`, three additional
    /// attempts and a 20 ms delay.
    pub fn new(clock: impl AsRef<Clock>) -> Self {
        Self {
            clock: clock.as_ref().clone(),
            name: Cow::Borrowed(DEFAULT_PIPELINE_NAME),
            retry_limit: DEFAULT_RETRY_LIMIT,
            delay: DEFAULT_DELAY,
            delegate: None,
            #[cfg(any(feature = "logs", test))]
            logs_enabled: false,
        }
    }

    /// Sets the pipeline name for telemetry correlation. Prefer `snake_case`.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the number of additional attempts allowed after the first one.
    ///
    /// `0` disables retries for transient failures. Always-retry failures are still retried.
    #[must_use]
    pub fn retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Sets the fixed wait between attempts.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets a lower-level strategy that answers the client engine's retry questions.
    #[must_use]
    pub fn delegate(mut self, delegate: Arc<dyn crate::RetryStrategy>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Enables structured logging for retry events.
    #[must_use]
    #[cfg(any(feature = "logs", test))]
    pub fn enable_logs(self) -> Self {
        Self {
            logs_enabled: true,
            ..self
        }
    }

    /// Applies serialized settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configured delay is negative.
    #[cfg(any(feature = "serde", test))]
    pub fn config(self, config: &RetryConfig) -> Result<Self, ConfigError> {
        Ok(self.retry_limit(config.retry_limit).delay(config.delay()?))
    }

    /// Creates a fresh budget for one logical call.
    #[must_use]
    pub fn budget(&self) -> RetryBudget {
        let budget = RetryBudget::new(self.retry_limit, self.delay);

        match &self.delegate {
            Some(delegate) => budget.delegate(Arc::clone(delegate)),
            None => budget,
        }
    }

    /// Returns the clock used to wait between attempts.
    #[must_use]
    pub fn get_clock(&self) -> &Clock {
        &self.clock
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the number of additional attempts allowed after the first one.
    #[must_use]
    pub fn get_retry_limit(&self) -> u32 {
        self.retry_limit
    }

    /// Returns the fixed wait between attempts.
    #[must_use]
    pub fn get_delay(&self) -> Duration {
        self.delay
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    pub(crate) fn create_telemetry(&self, operation_name: Cow<'static, str>) -> Telemetry {
        Telemetry {
            #[cfg(any(feature = "logs", test))]
            pipeline_name: self.name.clone(),
            #[cfg(any(feature = "logs", test))]
            operation_name,
            #[cfg(any(feature = "logs", test))]
            logs_enabled: self.logs_enabled,
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::{FailureReason, RetryAction, RetryReason, RetryRequest, RetryStrategy};

    assert_impl_all!(RetryOptions: Send, Sync, Clone, std::fmt::Debug);

    #[derive(Debug)]
    struct Stop;

    impl RetryStrategy for Stop {
        fn retry_after(&self, _request: &RetryRequest, _reason: RetryReason) -> RetryAction {
            RetryAction::Stop
        }
    }

    #[test]
    fn defaults() {
        let options = RetryOptions::new(Clock::new_frozen());

        assert_eq!(options.get_name(), DEFAULT_PIPELINE_NAME);
        assert_eq!(options.get_retry_limit(), 3);
        assert_eq!(options.get_delay(), Duration::from_millis(20));
        assert!(options.delegate.is_none());
        assert!(!options.logs_enabled);
    }

    #[test]
    fn setters() {
        let options = RetryOptions::new(Clock::new_frozen())
            .name(String::from("custom_pipeline"))
            .retry_limit(7)
            .delay(Duration::from_secs(1))
            .enable_logs();

        assert_eq!(options.get_name(), "custom_pipeline");
        assert_eq!(options.get_retry_limit(), 7);
        assert_eq!(options.get_delay(), Duration::from_secs(1));
        assert!(options.logs_enabled);
    }

    #[test]
    fn budget_is_fresh_per_call() {
        let options = RetryOptions::new(Clock::new_frozen()).retry_limit(1);

        let first = options.budget();
        assert_eq!(first.consume(FailureReason::Transient), RetryAction::RetryAfter(Duration::from_millis(20)));
        assert_eq!(first.attempts(), 1);

        let second = options.budget();
        assert_eq!(second.attempts(), 0);
        assert_eq!(second.limit(), 1);
    }

    #[test]
    fn budget_carries_delegate() {
        let options = RetryOptions::new(Clock::new_frozen()).delegate(Arc::new(Stop));
        let budget = options.budget();

        assert!(budget.has_delegate());
        assert_eq!(
            budget.decide(&RetryRequest::new("get", true, 0), RetryReason::NotMyPartition),
            RetryAction::Stop
        );
    }

    #[test]
    fn config_applies_values() {
        let config: RetryConfig = serde_json::from_str(r#"{ "retry_limit": 9, "delay": "PT0.5S" }"#).expect("valid json");
        let options = RetryOptions::new(Clock::new_frozen())
            .config(&config)
            .expect("valid configuration");

        assert_eq!(options.get_retry_limit(), 9);
        assert_eq!(options.get_delay(), Duration::from_millis(500));
    }

    #[test]
    fn config_rejects_negative_delay() {
        let config: RetryConfig = serde_json::from_str(r#"{ "delay": "-PT1S" }"#).expect("valid json");
        let error = RetryOptions::new(Clock::new_frozen())
            .config(&config)
            .expect_err("negative delay must be rejected");

        assert_eq!(error.field(), "delay");
    }

    #[test]
    fn telemetry_uses_pipeline_name() {
        let options = RetryOptions::new(Clock::new_frozen()).name("orders");
        let telemetry = options.create_telemetry("get".into());

        assert_eq!(telemetry.pipeline_name, "orders");
        assert_eq!(telemetry.operation_name, "get");
        assert!(!telemetry.logs_enabled);
    }
}
