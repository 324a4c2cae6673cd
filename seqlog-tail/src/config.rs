//! Configuration for a tailing consumer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use seqlog_core::ConfigError;

use crate::retry::RetryPolicy;
use crate::traits::PublisherId;

/// Settings for one [`TailingConsumer`](crate::TailingConsumer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailConfig {
    /// Identity the cursor is stored under.
    #[serde(default = "default_publisher_id")]
    pub publisher_id: PublisherId,

    /// Maximum events requested per fetch.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Delay between attempts after a repository or sink failure.
    #[serde(default = "default_retry_interval", with = "humantime_serde")]
    pub retry_interval: Duration,
}

fn default_publisher_id() -> PublisherId {
    PublisherId(0)
}

fn default_batch_size() -> u64 {
    5000
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(60)
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            publisher_id: default_publisher_id(),
            batch_size: default_batch_size(),
            retry_interval: default_retry_interval(),
        }
    }
}

impl TailConfig {
    /// Create a default config for the given identity.
    #[must_use]
    pub fn new(publisher_id: PublisherId) -> Self {
        Self {
            publisher_id,
            ..Self::default()
        }
    }

    /// Set the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the retry interval.
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Retry policy derived from `retry_interval`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.retry_interval)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroSize {
                field: "batch_size",
            });
        }
        Ok(())
    }
}
