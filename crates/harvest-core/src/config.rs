use std::time::Duration;

use crate::error::AppError;
use crate::scheduler::DEFAULT_SWEEP_INTERVAL;
use crate::throttle::DEFAULT_MIN_DELAY;

pub const DEFAULT_USER_AGENT: &str = "Harvest-Scraper/1.0";
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_ROBOTS_TIMEOUT: Duration = Duration::from_secs(5);

/// Harvesting configuration, shared by the CLI and the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// Minimum delay between two requests to the same host.
    pub min_delay: Duration,
    /// Delay between the end of one scheduled sweep and the start of the next.
    pub sweep_interval: Duration,
    /// Request timeout for pages and feeds.
    pub page_timeout: Duration,
    pub robots_timeout: Duration,
    pub user_agent: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            min_delay: DEFAULT_MIN_DELAY,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            page_timeout: DEFAULT_PAGE_TIMEOUT,
            robots_timeout: DEFAULT_ROBOTS_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HarvestConfig {
    /// Load from `HARVEST_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let min_delay = match lookup("HARVEST_MIN_DELAY_MS") {
            None => defaults.min_delay,
            Some(raw) => Duration::from_millis(parse_number("HARVEST_MIN_DELAY_MS", &raw)?),
        };
        let sweep_interval = match lookup("HARVEST_SWEEP_INTERVAL_SECS") {
            None => defaults.sweep_interval,
            Some(raw) => Duration::from_secs(parse_positive("HARVEST_SWEEP_INTERVAL_SECS", &raw)?),
        };
        let page_timeout = match lookup("HARVEST_PAGE_TIMEOUT_SECS") {
            None => defaults.page_timeout,
            Some(raw) => Duration::from_secs(parse_positive("HARVEST_PAGE_TIMEOUT_SECS", &raw)?),
        };
        let robots_timeout = match lookup("HARVEST_ROBOTS_TIMEOUT_SECS") {
            None => defaults.robots_timeout,
            Some(raw) => Duration::from_secs(parse_positive("HARVEST_ROBOTS_TIMEOUT_SECS", &raw)?),
        };
        let user_agent = match lookup("HARVEST_USER_AGENT") {
            Some(ua) if !ua.trim().is_empty() => ua.trim().to_string(),
            Some(_) => {
                return Err(AppError::ConfigError(
                    "HARVEST_USER_AGENT must not be blank".into(),
                ));
            }
            None => defaults.user_agent,
        };

        Ok(Self {
            min_delay,
            sweep_interval,
            page_timeout,
            robots_timeout,
            user_agent,
        })
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!(
            "Invalid {key} '{raw}': must be a non-negative integer"
        ))
    })
}

fn parse_positive(key: &str, raw: &str) -> Result<u64, AppError> {
    match parse_number(key, raw)? {
        0 => Err(AppError::ConfigError(format!("{key} must be at least 1"))),
        n => Ok(n),
    }
}
