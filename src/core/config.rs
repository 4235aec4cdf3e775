use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::error::ConfigurationError;

#[derive(Debug, Clone)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub notification: NotificationConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub poll_interval: Duration,
    pub retry_interval: Duration,
    pub max_history: usize,
    pub wallapop_max_age: Duration,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub port: Option<u16>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig {
                poll_interval: Duration::from_secs(15),
                retry_interval: Duration::from_secs(5),
                max_history: 500,
                wallapop_max_age: Duration::from_secs(5400),
                sources: vec!["subito".to_string(), "wallapop".to_string()],
            },
            http: HttpConfig {
                timeout: Duration::from_secs(20),
            },
            notification: NotificationConfig { webhook_url: None },
            monitoring: MonitoringConfig {
                port: None,
                log_level: "info".to_string(),
            },
        }
    }
}

impl Config {
    /// Loads `.env` (if present) and reads every setting from the environment,
    /// falling back to the defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Config {
            crawler: CrawlerConfig {
                poll_interval: secs_or(&lookup, "POLL_INTERVAL_SECS", defaults.crawler.poll_interval)?,
                retry_interval: secs_or(&lookup, "RETRY_INTERVAL_SECS", defaults.crawler.retry_interval)?,
                max_history: parse_or(&lookup, "MAX_HISTORY", defaults.crawler.max_history)?,
                wallapop_max_age: secs_or(
                    &lookup,
                    "WALLAPOP_MAX_AGE_SECS",
                    defaults.crawler.wallapop_max_age,
                )?,
                sources: match lookup("SOURCES") {
                    Some(raw) => raw
                        .split(',')
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect(),
                    None => defaults.crawler.sources,
                },
            },
            http: HttpConfig {
                timeout: secs_or(&lookup, "HTTP_TIMEOUT_SECS", defaults.http.timeout)?,
            },
            notification: NotificationConfig {
                webhook_url: lookup("NOTIFY_WEBHOOK_URL").filter(|url| !url.trim().is_empty()),
            },
            monitoring: MonitoringConfig {
                port: match lookup("MONITORING_PORT") {
                    Some(raw) => Some(parse_value("MONITORING_PORT", &raw)?),
                    None => None,
                },
                log_level: lookup("LOG_LEVEL").unwrap_or(defaults.monitoring.log_level),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.crawler.retry_interval >= self.crawler.poll_interval {
            return Err(ConfigurationError::RetryNotShorter {
                retry: self.crawler.retry_interval,
                poll: self.crawler.poll_interval,
            });
        }
        if self.crawler.max_history < 2 {
            return Err(ConfigurationError::HistoryCapacity(self.crawler.max_history));
        }
        if self.crawler.sources.is_empty() {
            return Err(ConfigurationError::NoSources);
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigurationError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidSetting {
            key,
            value: raw.to_string(),
        })
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn secs_or<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default.as_secs()).map(Duration::from_secs)
}
