//! Configuration file loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use seqlog_core::LogConfig;
use seqlog_tail::TailConfig;

/// Everything the CLI reads from its config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log: LogConfig,
    pub tail: TailConfig,
}

/// Load configuration from `path`, or defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    config.log.validate()?;
    config.tail.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use seqlog_tail::PublisherId;

    #[test]
    fn no_path_gives_defaults() {
        let config = load(None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seqlog.toml");
        std::fs::write(
            &path,
            r#"
[log]
event_buffer_size = 8

[tail]
publisher_id = 4
retry_interval = "250ms"
"#,
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();

        assert_eq!(config.log.event_buffer_size, 8);
        assert_eq!(config.log.fetch_queue_size, 10);
        assert_eq!(config.tail.publisher_id, PublisherId(4));
        assert_eq!(config.tail.batch_size, 5000);
        assert_eq!(config.tail.retry_interval, Duration::from_millis(250));
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seqlog.toml");
        std::fs::write(&path, "[log]\npublish_queue_size = 0\n").unwrap();

        let err = load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("publish_queue_size"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
