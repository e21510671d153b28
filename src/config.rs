//! Configuration module for rssy.

use serde::Deserialize;
use std::path::Path;

use chrono_tz::Tz;

use crate::{Result, RssyError};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/rssy.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/rssy.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Background job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Timezone used for daily triggers and "yesterday" calculations.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Owners whose feeds are refreshed. Empty means every feed in the store.
    #[serde(default)]
    pub users: Vec<String>,
    /// Feed refresh tick in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Minimum age of a feed's watermark before it is fetched again.
    #[serde(default = "default_min_refetch")]
    pub min_refetch_secs: i64,
    /// Number of feeds refreshed concurrently within one cycle.
    #[serde(default = "default_refresh_concurrency")]
    pub refresh_concurrency: usize,
    /// Tick for the daily notify and AI summary jobs in seconds.
    #[serde(default = "default_daily_tick")]
    pub daily_tick_secs: u64,
    /// Width of the HH:MM trigger window in minutes.
    #[serde(default = "default_trigger_window")]
    pub trigger_window_minutes: u32,
    /// Auto-cleanup tick in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
    /// TTL of the feed metadata and preference caches in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_timezone() -> String {
    "Asia/Shanghai".to_string()
}

fn default_refresh_interval() -> u64 {
    1800 // 30 minutes
}

fn default_min_refetch() -> i64 {
    3600 // 1 hour
}

fn default_refresh_concurrency() -> usize {
    4
}

fn default_daily_tick() -> u64 {
    60
}

fn default_trigger_window() -> u32 {
    10
}

fn default_cleanup_interval() -> u64 {
    6 * 3600
}

fn default_cache_ttl() -> u64 {
    3600
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            users: Vec::new(),
            refresh_interval_secs: default_refresh_interval(),
            min_refetch_secs: default_min_refetch(),
            refresh_concurrency: default_refresh_concurrency(),
            daily_tick_secs: default_daily_tick(),
            trigger_window_minutes: default_trigger_window(),
            cleanup_interval_secs: default_cleanup_interval(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl SchedulerConfig {
    /// Parse the configured timezone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| RssyError::Config(format!("unknown timezone: {}", self.timezone)))
    }
}

/// Feed fetching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Lookback window in days for feeds that were never fetched.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// User agent sent with feed requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_lookback_days() -> i64 {
    7
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_user_agent() -> String {
    "rssy/0.1 (feed fetcher)".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
            user_agent: default_user_agent(),
        }
    }
}

/// Language model configuration for daily summaries.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key. Summaries fall back to a grouped digest when unset.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the chat completions API.
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    /// Model name.
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Maximum characters of article content included in the prompt.
    #[serde(default = "default_content_cap")]
    pub content_cap: usize,
    /// Request timeout in seconds.
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

fn default_ai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_content_cap() -> usize {
    500
}

fn default_ai_timeout() -> u64 {
    60
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_ai_endpoint(),
            model: default_ai_model(),
            content_cap: default_content_cap(),
            timeout_secs: default_ai_timeout(),
        }
    }
}

/// Digest notification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Webhook URL receiving `{title, content, description}`. Empty disables dispatch.
    #[serde(default)]
    pub webhook_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

fn default_notify_timeout() -> u64 {
    15
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_secs: default_notify_timeout(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Feed fetching configuration.
    #[serde(default)]
    pub feed: FeedConfig,
    /// AI summary configuration.
    #[serde(default)]
    pub ai: AiConfig,
    /// Notification configuration.
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RssyError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RssyError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `OPENAI_API_KEY`: completion API key
    /// - `OPENAI_ENDPOINT`: completion API base URL
    /// - `RSSY_NOTIFY_WEBHOOK`: digest webhook URL
    /// - `RSSY_DB`: database path
    pub fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 4] = [
            ("OPENAI_API_KEY", &mut self.ai.api_key),
            ("OPENAI_ENDPOINT", &mut self.ai.endpoint),
            ("RSSY_NOTIFY_WEBHOOK", &mut self.notify.webhook_url),
            ("RSSY_DB", &mut self.database.path),
        ];
        for (name, target) in overrides {
            if let Ok(value) = std::env::var(name) {
                if !value.is_empty() {
                    *target = value;
                }
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.scheduler.tz()?;

        let intervals = [
            ("scheduler.refresh_interval_secs", self.scheduler.refresh_interval_secs),
            ("scheduler.daily_tick_secs", self.scheduler.daily_tick_secs),
            ("scheduler.cleanup_interval_secs", self.scheduler.cleanup_interval_secs),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(RssyError::Config(format!("{name} must be greater than 0")));
            }
        }
        if self.scheduler.refresh_concurrency == 0 {
            return Err(RssyError::Config(
                "scheduler.refresh_concurrency must be greater than 0".to_string(),
            ));
        }
        if self.scheduler.trigger_window_minutes == 0 || self.scheduler.trigger_window_minutes > 60
        {
            return Err(RssyError::Config(
                "scheduler.trigger_window_minutes must be between 1 and 60".to_string(),
            ));
        }

        url::Url::parse(&self.ai.endpoint)
            .map_err(|e| RssyError::Config(format!("invalid ai.endpoint: {e}")))?;
        if !self.notify.webhook_url.is_empty() {
            url::Url::parse(&self.notify.webhook_url)
                .map_err(|e| RssyError::Config(format!("invalid notify.webhook_url: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database.path, "data/rssy.db");
        assert_eq!(config.logging.level, "info");

        assert_eq!(config.scheduler.timezone, "Asia/Shanghai");
        assert!(config.scheduler.users.is_empty());
        assert_eq!(config.scheduler.refresh_interval_secs, 1800);
        assert_eq!(config.scheduler.min_refetch_secs, 3600);
        assert_eq!(config.scheduler.daily_tick_secs, 60);
        assert_eq!(config.scheduler.trigger_window_minutes, 10);

        assert_eq!(config.feed.lookback_days, 7);
        assert_eq!(config.ai.content_cap, 500);
        assert!(config.ai.api_key.is_empty());
        assert!(config.notify.webhook_url.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[database]
path = "/tmp/feeds.db"

[scheduler]
timezone = "UTC"
users = ["reader@example.com"]
refresh_interval_secs = 600

[notify]
webhook_url = "https://hooks.example.com/send/abc"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.database.path, "/tmp/feeds.db");
        assert_eq!(config.scheduler.timezone, "UTC");
        assert_eq!(config.scheduler.users, vec!["reader@example.com"]);
        assert_eq!(config.scheduler.refresh_interval_secs, 600);
        // Unspecified values keep their defaults
        assert_eq!(config.scheduler.min_refetch_secs, 3600);
        assert_eq!(config.feed.total_timeout_secs, 30);
        assert_eq!(
            config.notify.webhook_url,
            "https://hooks.example.com/send/abc"
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.scheduler.refresh_concurrency, 4);
    }

    #[test]
    fn test_load_with_env_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scheduler]\ntimezone = \"UTC\"\n").unwrap();

        let config = Config::load_with_env(&path).unwrap();
        assert_eq!(config.scheduler.timezone, "UTC");

        let missing = Config::load_with_env(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(RssyError::Io(_))));
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("[scheduler\nusers = 1");
        assert!(matches!(result, Err(RssyError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_timezone() {
        let mut config = Config::default();
        config.scheduler.timezone = "Mars/Olympus".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown timezone"));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.scheduler.daily_tick_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("daily_tick_secs"));
    }

    #[test]
    fn test_validate_rejects_bad_webhook() {
        let mut config = Config::default();
        config.notify.webhook_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scheduler_tz() {
        let config = SchedulerConfig::default();
        assert_eq!(config.tz().unwrap(), chrono_tz::Asia::Shanghai);
    }
}
