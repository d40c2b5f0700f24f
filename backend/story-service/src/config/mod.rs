use paging::PagingConfig;
use serde::Deserialize;
use story_api::ApiConfig;

use crate::error::{Result, ServiceError};

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub log: LogConfig,
}

/// `STORY_FEED_*` variables
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Defaults to the page size
    #[serde(default)]
    pub prefetch_distance: Option<u32>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            prefetch_distance: None,
        }
    }
}

impl FeedConfig {
    pub fn paging(&self) -> PagingConfig {
        let config = PagingConfig::new(self.page_size);
        match self.prefetch_distance {
            Some(distance) => config.with_prefetch_distance(distance),
            None => config,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level", rename = "story_log_level")]
    pub level: String,
    #[serde(default, rename = "log_format")]
    pub format: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

impl LogConfig {
    pub fn json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("json"))
    }
}

fn default_page_size() -> u32 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load `.env` (if present) and read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let api: ApiConfig = envy::prefixed("STORY_API_").from_iter(vars.clone())?;
        let feed: FeedConfig = envy::prefixed("STORY_FEED_").from_iter(vars.clone())?;
        let log: LogConfig = envy::from_iter(vars)?;

        let config = Config { api, feed, log };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.feed.paging().validate()?;
        if self.log.level.trim().is_empty() {
            return Err(ServiceError::Config("STORY_LOG_LEVEL must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(Vec::new()).unwrap();
        assert_eq!(config.api.base(), "https://story-api.dicoding.dev/v1");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.feed.paging(), PagingConfig::new(20));
        assert_eq!(config.log.level, "info");
        assert!(!config.log.json());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("STORY_API_BASE_URL", "http://localhost:8080/v1"),
            ("STORY_FEED_PAGE_SIZE", "10"),
            ("STORY_FEED_PREFETCH_DISTANCE", "3"),
            ("STORY_LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.api.base(), "http://localhost:8080/v1");
        assert_eq!(config.feed.paging().page_size, 10);
        assert_eq!(config.feed.paging().prefetch_distance, 3);
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            Config::from_vars(vars(&[("STORY_FEED_PAGE_SIZE", "0")])),
            Err(ServiceError::Config(_))
        ));
        assert!(matches!(
            Config::from_vars(vars(&[("STORY_API_BASE_URL", "ftp://example.com")])),
            Err(ServiceError::Config(_))
        ));
        assert!(matches!(
            Config::from_vars(vars(&[("STORY_FEED_PAGE_SIZE", "many")])),
            Err(ServiceError::Config(_))
        ));
    }
}
