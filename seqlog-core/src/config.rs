//! Configuration for the event log engine.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Capacities for the ring buffer and the engine's two mailboxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Number of most recent events kept in memory.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,

    /// Bound of the publish mailbox. Publishers wait while it is full.
    #[serde(default = "default_publish_queue_size")]
    pub publish_queue_size: usize,

    /// Bound of the fetch-request mailbox.
    #[serde(default = "default_fetch_queue_size")]
    pub fetch_queue_size: usize,
}

fn default_event_buffer_size() -> usize {
    5000
}

fn default_publish_queue_size() -> usize {
    5000
}

fn default_fetch_queue_size() -> usize {
    10
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: default_event_buffer_size(),
            publish_queue_size: default_publish_queue_size(),
            fetch_queue_size: default_fetch_queue_size(),
        }
    }
}

impl LogConfig {
    /// Set the ring-buffer capacity.
    #[must_use]
    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    /// Set the publish mailbox bound.
    #[must_use]
    pub fn with_publish_queue_size(mut self, size: usize) -> Self {
        self.publish_queue_size = size;
        self
    }

    /// Set the fetch mailbox bound.
    #[must_use]
    pub fn with_fetch_queue_size(mut self, size: usize) -> Self {
        self.fetch_queue_size = size;
        self
    }

    /// Check that every capacity is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("event_buffer_size", self.event_buffer_size),
            ("publish_queue_size", self.publish_queue_size),
            ("fetch_queue_size", self.fetch_queue_size),
        ];
        match sizes.into_iter().find(|(_, size)| *size == 0) {
            Some((field, _)) => Err(ConfigError::ZeroSize { field }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = LogConfig::default();

        assert_eq!(config.event_buffer_size, 5000);
        assert_eq!(config.publish_queue_size, 5000);
        assert_eq!(config.fetch_queue_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_pattern() {
        let config = LogConfig::default()
            .with_event_buffer_size(8)
            .with_publish_queue_size(5)
            .with_fetch_queue_size(5);

        assert_eq!(config.event_buffer_size, 8);
        assert_eq!(config.publish_queue_size, 5);
        assert_eq!(config.fetch_queue_size, 5);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let config = LogConfig::default().with_event_buffer_size(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroSize {
                field: "event_buffer_size"
            })
        );

        let config = LogConfig::default().with_fetch_queue_size(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroSize {
                field: "fetch_queue_size"
            })
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: LogConfig = serde_json::from_str(r#"{"event_buffer_size": 64}"#).unwrap();

        assert_eq!(config.event_buffer_size, 64);
        assert_eq!(config.publish_queue_size, 5000);
        assert_eq!(config.fetch_queue_size, 10);
    }
}
