// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DELAY_MILLIS, DEFAULT_RETRY_LIMIT};

/// Serializable retry settings.
///
/// Missing fields take their defaults: three additional attempts and a 20 ms delay. The delay
/// accepts both ISO 8601 (`"PT0.5S"`) and friendly (`"500ms"`) duration strings.
///
/// Apply it with [`RetryOptions::config`][crate::RetryOptions::config].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct RetryConfig {
    /// Number of additional attempts after the first one.
    pub retry_limit: u32,
    /// Fixed wait between attempts. Must not be negative.
    pub delay: SignedDuration,
}

impl RetryConfig {
    /// Returns the delay as a [`Duration`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configured delay is negative.
    pub fn delay(&self) -> Result<Duration, ConfigError> {
        Duration::try_from(self.delay).map_err(|error| ConfigError::caused_by("delay", error))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_limit: DEFAULT_RETRY_LIMIT,
            delay: SignedDuration::from_millis(i64::from(DEFAULT_DELAY_MILLIS)),
        }
    }
}

/// An invalid value in a [`RetryConfig`].
#[ohno::error]
#[display("invalid retry configuration: {field}")]
pub struct ConfigError {
    field: String,
}

impl ConfigError {
    /// The name of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}
