// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::FailureReason;

/// Emits retry events for one operation of one pipeline.
#[derive(Debug, Clone)]
pub(crate) struct Telemetry {
    #[cfg(any(feature = "logs", test))]
    pub(crate) pipeline_name: std::borrow::Cow<'static, str>,
    #[cfg(any(feature = "logs", test))]
    pub(crate) operation_name: std::borrow::Cow<'static, str>,
    #[cfg(any(feature = "logs", test))]
    pub(crate) logs_enabled: bool,
}

impl Telemetry {
    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    pub(crate) fn retry(&self, attempt_index: u32, reason: FailureReason, delay: Duration) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "pail.retry",
                tracing::Level::WARN,
                pipeline.name = %self.pipeline_name,
                operation.name = %self.operation_name,
                retry.attempt.index = attempt_index,
                retry.reason = %reason,
                retry.delay = delay.as_secs_f32(),
            );
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    pub(crate) fn exhausted(&self, attempt_index: u32) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "pail.retry.exhausted",
                tracing::Level::ERROR,
                pipeline.name = %self.pipeline_name,
                operation.name = %self.operation_name,
                retry.attempt.index = attempt_index,
                retry.reason = %FailureReason::Transient,
            );
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    pub(crate) fn permanent(&self, attempt_index: u32) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "pail.retry.permanent",
                tracing::Level::DEBUG,
                pipeline.name = %self.pipeline_name,
                operation.name = %self.operation_name,
                retry.attempt.index = attempt_index,
                retry.reason = %FailureReason::Permanent,
            );
        }
    }
}
