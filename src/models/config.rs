//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// connpass API client settings
    #[serde(default)]
    pub connpass: ConnpassConfig,

    /// Discovery batching behavior
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Storage backend settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Notification publishing settings
    #[serde(default)]
    pub notifications: NotifyConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Configuration built from defaults plus environment overrides.
    ///
    /// This is the Lambda path; the CLI loads a TOML file first and applies
    /// the environment on top.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply environment variable overrides.
    ///
    /// The connpass API key is secret material and is only ever read from
    /// the environment (`CONNPASS_API_KEY`), never from the config file.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = get("CONNPASS_API_BASE") {
            self.connpass.base_url = base;
        }
        if let Some(key) = get("CONNPASS_API_KEY") {
            self.connpass.api_key = Some(key);
        }
        if let Some(keyword) = get("SEARCH_KEYWORD") {
            self.connpass.keyword = keyword;
        }
        if let Some(count) = get("SEARCH_COUNT") {
            if let Ok(n) = count.parse() {
                self.connpass.count = n;
            }
        }
        if let Some(table) = get("STUDY_SESSIONS_TABLE") {
            self.storage.table_name = table;
        }
        if let Some(enabled) = get("NOTIFICATIONS_ENABLED") {
            if let Ok(b) = enabled.parse() {
                self.notifications.enabled = b;
            }
        }
        if let Some(arn) = get("SNS_TOPIC_ARN") {
            self.notifications.topic_arn = Some(arn);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.connpass.keyword.trim().is_empty() {
            return Err(AppError::validation("connpass.keyword is empty"));
        }
        if self.connpass.user_agent.trim().is_empty() {
            return Err(AppError::validation("connpass.user_agent is empty"));
        }
        if self.connpass.timeout_secs == 0 {
            return Err(AppError::validation("connpass.timeout_secs must be > 0"));
        }
        if self.connpass.count == 0 {
            return Err(AppError::validation("connpass.count must be > 0"));
        }
        if self.connpass.count > 100 {
            return Err(AppError::validation(
                "connpass.count exceeds the API maximum of 100",
            ));
        }
        if url::Url::parse(&self.connpass.base_url).is_err() {
            return Err(AppError::validation(format!(
                "connpass.base_url is not a valid URL: {}",
                self.connpass.base_url
            )));
        }
        if self.discovery.batch_size == 0 {
            return Err(AppError::validation("discovery.batch_size must be > 0"));
        }
        Ok(())
    }
}

/// connpass API client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnpassConfig {
    /// Base URL of the connpass API
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// API key sent as the `X-API-Key` header. Environment only
    /// (`CONNPASS_API_KEY`); values in the config file are ignored.
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Search keyword
    #[serde(default = "defaults::keyword")]
    pub keyword: String,

    /// Result cap per search (the API allows at most 100)
    #[serde(default = "defaults::count")]
    pub count: usize,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Fixed wait before the single rate-limit retry, in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for ConnpassConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            api_key: None,
            keyword: defaults::keyword(),
            count: defaults::count(),
            timeout_secs: defaults::timeout(),
            retry_delay_ms: defaults::retry_delay(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Discovery batching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Events processed per batch
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Fixed sleep between batches in milliseconds
    #[serde(default = "defaults::batch_delay")]
    pub batch_delay_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::batch_size(),
            batch_delay_ms: defaults::batch_delay(),
        }
    }
}

/// Storage backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// DynamoDB table holding the study sessions
    #[serde(default = "defaults::table_name")]
    pub table_name: String,

    /// Root directory for the local JSON store (CLI runs)
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            table_name: defaults::table_name(),
            data_dir: defaults::data_dir(),
        }
    }
}

/// Notification publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Whether notifications are published at all
    #[serde(default = "defaults::notifications_enabled")]
    pub enabled: bool,

    /// SNS topic ARN; notifications are skipped when missing or empty
    #[serde(default)]
    pub topic_arn: Option<String>,

    /// Timeout for a single publish call in seconds
    #[serde(default = "defaults::publish_timeout")]
    pub publish_timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::notifications_enabled(),
            topic_arn: None,
            publish_timeout_secs: defaults::publish_timeout(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // connpass defaults
    pub fn base_url() -> String {
        "https://connpass.com/api/v2".into()
    }
    pub fn keyword() -> String {
        "広島".into()
    }
    pub fn count() -> usize {
        100
    }
    pub fn timeout() -> u64 {
        30
    }
    // connpass allows roughly one request per second
    pub fn retry_delay() -> u64 {
        1000
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; StudyScout/1.0)".into()
    }

    // Discovery defaults
    pub fn batch_size() -> usize {
        5
    }
    pub fn batch_delay() -> u64 {
        1000
    }

    // Storage defaults
    pub fn table_name() -> String {
        "study-sessions".into()
    }
    pub fn data_dir() -> PathBuf {
        PathBuf::from("data")
    }

    // Notification defaults
    pub fn notifications_enabled() -> bool {
        true
    }
    pub fn publish_timeout() -> u64 {
        5
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_keyword() {
        let mut config = Config::default();
        config.connpass.keyword = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let mut config = Config::default();
        config.discovery.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_count_over_api_maximum() {
        let mut config = Config::default();
        config.connpass.count = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.connpass.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn overrides_apply_from_environment_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CONNPASS_API_KEY", "secret"),
            ("SEARCH_KEYWORD", "呉"),
            ("SEARCH_COUNT", "25"),
            ("STUDY_SESSIONS_TABLE", "sessions-dev"),
            ("NOTIFICATIONS_ENABLED", "false"),
            ("SNS_TOPIC_ARN", "arn:aws:sns:ap-northeast-1:123456789012:mod"),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.connpass.api_key.as_deref(), Some("secret"));
        assert_eq!(config.connpass.keyword, "呉");
        assert_eq!(config.connpass.count, 25);
        assert_eq!(config.storage.table_name, "sessions-dev");
        assert!(!config.notifications.enabled);
        assert_eq!(
            config.notifications.topic_arn.as_deref(),
            Some("arn:aws:sns:ap-northeast-1:123456789012:mod")
        );
    }

    #[test]
    fn unparseable_numeric_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|name| {
            (name == "SEARCH_COUNT").then(|| "lots".to_string())
        });
        assert_eq!(config.connpass.count, 100);
    }

    #[test]
    fn api_key_in_file_is_ignored() {
        let toml = r#"
            [connpass]
            api_key = "from-file"
            keyword = "広島"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.connpass.api_key.is_none());
    }
}
