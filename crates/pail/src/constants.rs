// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// Default number of additional attempts after the first one.
///
/// Three extra attempts ride out a node failover or a short burst of overload on a healthy
/// cluster without holding callers for long.
pub(crate) const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Default fixed wait between attempts.
///
/// Connectivity hiccups on a cluster usually clear well inside a second, so a short constant
/// delay is preferred over a growing backoff schedule.
pub(crate) const DEFAULT_DELAY: Duration = Duration::from_millis(DEFAULT_DELAY_MILLIS as u64);

/// [`DEFAULT_DELAY`] in milliseconds, for settings that do not hold a [`Duration`].
pub(crate) const DEFAULT_DELAY_MILLIS: u16 = 20;

/// Pipeline name used when none is configured.
pub(crate) const DEFAULT_PIPELINE_NAME: &str = "default";
