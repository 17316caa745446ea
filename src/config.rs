//! Runtime settings for the scraper and its cache.
//!
//! Every field has a default, so a partial config (from serde or from the
//! environment) fills in the rest.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{HltvError, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.hltv.org";
// Each of these ends up added to an `Instant`.
const MAX_REQUEST_INTERVAL_SECS: u64 = 3_600;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
const MAX_REFRESH_INTERVAL_SECS: u64 = 7 * 86_400;
const MAX_WARMUP_DELAY_SECS: u64 = 86_400;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Settings shared by the fetcher, the match cache and the refresh driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Minimum spacing between two upstream requests.
    pub request_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Maximum snapshot age for a cached read.
    pub freshness_window_secs: u64,
    /// Only the head of the results feed is considered recent.
    pub results_limit: usize,
    pub refresh_interval_secs: u64,
    /// Delay before the refresh driver's first cycle.
    pub warmup_delay_secs: u64,
    pub preload_min_importance: u8,
    pub preload_max_count: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_interval_secs: 3,
            request_timeout_secs: 15,
            freshness_window_secs: 1800,
            results_limit: 20,
            refresh_interval_secs: 1800,
            warmup_delay_secs: 10,
            preload_min_importance: 1,
            preload_max_count: 20,
        }
    }
}

impl ScraperConfig {
    /// Defaults overlaid with any `HLTV_*` environment variables that are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup("HLTV_BASE_URL") {
            config.base_url = url;
        }
        if let Some(agent) = lookup("HLTV_USER_AGENT") {
            config.user_agent = agent;
        }
        override_parsed(&lookup, "HLTV_REQUEST_INTERVAL_SECS", &mut config.request_interval_secs)?;
        override_parsed(&lookup, "HLTV_REQUEST_TIMEOUT_SECS", &mut config.request_timeout_secs)?;
        override_parsed(&lookup, "HLTV_FRESHNESS_WINDOW_SECS", &mut config.freshness_window_secs)?;
        override_parsed(&lookup, "HLTV_RESULTS_LIMIT", &mut config.results_limit)?;
        override_parsed(&lookup, "HLTV_REFRESH_INTERVAL_SECS", &mut config.refresh_interval_secs)?;
        override_parsed(&lookup, "HLTV_WARMUP_DELAY_SECS", &mut config.warmup_delay_secs)?;
        override_parsed(&lookup, "HLTV_PRELOAD_MIN_IMPORTANCE", &mut config.preload_min_importance)?;
        override_parsed(&lookup, "HLTV_PRELOAD_MAX_COUNT", &mut config.preload_max_count)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the rest of the crate cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(HltvError::Config(format!(
                "base_url must be an http(s) url, got {:?}",
                self.base_url
            )));
        }
        check_range("request_interval_secs", self.request_interval_secs, 0, MAX_REQUEST_INTERVAL_SECS)?;
        check_range("request_timeout_secs", self.request_timeout_secs, 1, MAX_REQUEST_TIMEOUT_SECS)?;
        check_range("refresh_interval_secs", self.refresh_interval_secs, 1, MAX_REFRESH_INTERVAL_SECS)?;
        check_range("warmup_delay_secs", self.warmup_delay_secs, 0, MAX_WARMUP_DELAY_SECS)?;
        if self.preload_min_importance > 5 {
            return Err(HltvError::Config(
                "preload_min_importance must be within 0..=5".into(),
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_secs(self.request_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn warmup_delay(&self) -> Duration {
        Duration::from_secs(self.warmup_delay_secs)
    }
}

fn check_range(name: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(HltvError::Config(format!(
            "{name} must be within {min}..={max}, got {value}"
        )))
    }
}

fn override_parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> Result<()>
where
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| HltvError::Config(format!("{key}={raw:?}: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ScraperConfig::default();
        assert_eq!(config.request_interval(), Duration::from_secs(3));
        assert_eq!(config.freshness_window(), Duration::from_secs(1800));
        assert_eq!(config.results_limit, 20);
        assert_eq!(config.preload_max_count, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = ScraperConfig::from_lookup(lookup_from(&[
            ("HLTV_BASE_URL", "http://localhost:8080/"),
            ("HLTV_REQUEST_INTERVAL_SECS", "5"),
            ("HLTV_PRELOAD_MAX_COUNT", " 7 "),
        ]))
        .unwrap();
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.request_interval_secs, 5);
        assert_eq!(config.preload_max_count, 7);
        assert_eq!(config.freshness_window_secs, 1800);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = ScraperConfig::from_lookup(lookup_from(&[(
            "HLTV_FRESHNESS_WINDOW_SECS",
            "half an hour",
        )]))
        .unwrap_err();
        assert!(matches!(err, HltvError::Config(_)));

        let err = ScraperConfig::from_lookup(lookup_from(&[("HLTV_BASE_URL", "hltv.org")]))
            .unwrap_err();
        assert!(matches!(err, HltvError::Config(_)));
    }

    #[test]
    fn test_rejects_out_of_range_durations() {
        let err = ScraperConfig::from_lookup(lookup_from(&[(
            "HLTV_REQUEST_INTERVAL_SECS",
            "18446744073709551615",
        )]))
        .unwrap_err();
        assert!(matches!(err, HltvError::Config(_)));

        for config in [
            ScraperConfig {
                warmup_delay_secs: u64::MAX,
                ..Default::default()
            },
            ScraperConfig {
                refresh_interval_secs: 0,
                ..Default::default()
            },
            ScraperConfig {
                request_timeout_secs: u64::MAX,
                ..Default::default()
            },
        ] {
            assert!(matches!(config.validate(), Err(HltvError::Config(_))));
        }

        let edge = ScraperConfig {
            request_interval_secs: 3_600,
            warmup_delay_secs: 86_400,
            ..Default::default()
        };
        assert!(edge.validate().is_ok());
    }
}
