//! Watcher configuration
//!
//! YAML-backed configuration for the price watcher: where the page lives,
//! which items it shows, and how long notifications stay up.

use crate::client::PageLocation;
use crate::notify::NotificationTimings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub feed: FeedConfig,
    pub page: PageConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Host and port the page was served from, e.g. `localhost:7070`
    pub host: String,
    /// Whether the page came over TLS (selects `wss://`)
    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Path the watcher renders, `/items` or `/items/<id>`
    #[serde(default = "default_page_path")]
    pub path: String,
    /// Items seeded into the page model at startup
    #[serde(default)]
    pub items: Vec<ItemSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSeed {
    pub id: String,
    pub name: String,
    pub starting_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a notification stays fully visible, in milliseconds
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,
    /// Exit transition length, in milliseconds
    #[serde(default = "default_exit_ms")]
    pub exit_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            dwell_ms: default_dwell_ms(),
            exit_ms: default_exit_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_path() -> String {
    "/items".to_string()
}

fn default_dwell_ms() -> u64 {
    15_000
}

fn default_exit_ms() -> u64 {
    500
}

impl WatcherConfig {
    /// Load configuration from a YAML file
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let config: WatcherConfig = serde_yaml::from_str(&yaml_content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.feed.host.is_empty() {
            return Err(ConfigError::ValidationError(
                "feed.host must not be empty".to_string(),
            ));
        }

        if !self.page.path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "page.path must start with '/'".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for item in &self.page.items {
            if item.id.is_empty() {
                return Err(ConfigError::ValidationError(
                    "page.items entries must have a non-empty id".to_string(),
                ));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate item id: {}",
                    item.id
                )));
            }
            if item.starting_price < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "item {} has a negative starting_price",
                    item.id
                )));
            }
        }

        if self.notifications.dwell_ms == 0 {
            return Err(ConfigError::ValidationError(
                "notifications.dwell_ms must be greater than 0".to_string(),
            ));
        }

        if self.notifications.exit_ms == 0 {
            return Err(ConfigError::ValidationError(
                "notifications.exit_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Page location derived from the feed section
    pub fn location(&self) -> PageLocation {
        PageLocation::new(&self.feed.host, self.feed.secure)
    }

    /// Notification timings derived from the notifications section
    pub fn timings(&self) -> NotificationTimings {
        NotificationTimings {
            dwell: Duration::from_millis(self.notifications.dwell_ms),
            exit: Duration::from_millis(self.notifications.exit_ms),
            ..NotificationTimings::default()
        }
    }

    /// Log a startup summary
    pub fn log(&self) {
        info!("Watcher configuration:");
        info!("  feed host: {} (secure: {})", self.feed.host, self.feed.secure);
        info!("  page path: {}", self.page.path);
        info!("  items: {}", self.page.items.len());
        info!(
            "  notifications: dwell {}ms, exit {}ms",
            self.notifications.dwell_ms, self.notifications.exit_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_yaml() -> &'static str {
        r#"
log_level: debug
feed:
  host: "localhost:7070"
page:
  path: "/items"
  items:
    - id: "vinyl-042"
      name: "Signed LP"
      starting_price: 100.0
    - id: "comic-007"
      name: "Comic #7"
      starting_price: 55.0
notifications:
  dwell_ms: 15000
  exit_ms: 500
"#
    }

    fn load_from_str(yaml: &str) -> Result<WatcherConfig> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        WatcherConfig::load(file.path())
    }

    #[test]
    fn loads_a_full_config() {
        let config = load_from_str(sample_yaml()).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.feed.host, "localhost:7070");
        assert!(!config.feed.secure);
        assert_eq!(config.page.items.len(), 2);
        assert_eq!(config.page.items[0].id, "vinyl-042");
        assert_eq!(config.notifications.dwell_ms, 15_000);
    }

    #[test]
    fn defaults_fill_in_missing_sections() {
        let config = load_from_str(
            r#"
feed:
  host: "localhost:7070"
page: {}
"#,
        )
        .unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.page.path, "/items");
        assert!(config.page.items.is_empty());
        assert_eq!(config.notifications.dwell_ms, 15_000);
        assert_eq!(config.notifications.exit_ms, 500);
    }

    #[test]
    fn rejects_empty_host() {
        let result = load_from_str(
            r#"
feed:
  host: ""
page: {}
"#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn rejects_duplicate_item_ids() {
        let result = load_from_str(
            r#"
feed:
  host: "localhost:7070"
page:
  items:
    - id: "vinyl-042"
      name: "A"
      starting_price: 1.0
    - id: "vinyl-042"
      name: "B"
      starting_price: 2.0
"#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn rejects_bad_path() {
        let result = load_from_str(
            r#"
feed:
  host: "localhost:7070"
page:
  path: "items"
"#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let result = WatcherConfig::load("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn location_and_timings_derive_from_sections() {
        let config = load_from_str(sample_yaml()).unwrap();

        let location = config.location();
        assert_eq!(location.host, "localhost:7070");
        assert!(!location.secure);

        let timings = config.timings();
        assert_eq!(timings.dwell, Duration::from_millis(15_000));
        assert_eq!(timings.exit, Duration::from_millis(500));
        assert_eq!(timings.entrance_frame, NotificationTimings::default().entrance_frame);
    }
}
