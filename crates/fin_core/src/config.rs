//! Settings read once at startup and shared read-only afterwards.

use chrono::NaiveTime;
use std::time::Duration;
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_FEED_URL: &str = "https://eventregistry.org/api/v1/article/getArticles";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub endpoint: Url,
    pub api_key: String,
    pub timeout: Duration,
}

impl FeedConfig {
    pub fn new(endpoint: &str, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl EnrichmentConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{} cannot be used as a base URL", base_url)));
        }
        // Url::join replaces the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Wall-clock time of day (local time) at which the daily cycle fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub at: NaiveTime,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { at: NaiveTime::MIN }
    }
}

impl ScheduleConfig {
    pub fn parse(value: &str) -> Result<Self> {
        NaiveTime::parse_from_str(value.trim(), "%H:%M")
            .map(|at| Self { at })
            .map_err(|e| Error::Config(format!("invalid schedule time '{}': {}", value, e)))
    }
}
