// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the document submission throttle.
//!
//! Defaults target the CRPT "create document" endpoint with a quota of
//! ten requests per second and no lifetime budget.

use crate::error::ThrottleError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Top-level configuration for the submission client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Quota, budget and retry configuration
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Target endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Document creation endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in milliseconds (default: 30000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Unit of time a quota window spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
}

/// Quota, budget and retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Length of one quota window (default: second)
    #[serde(default = "default_time_unit")]
    pub time_unit: TimeUnit,

    /// Explicit window length in milliseconds, overrides `time_unit`
    #[serde(default)]
    pub window_ms: Option<u64>,

    /// Requests permitted per window (default: 10)
    #[serde(default = "default_request_limit")]
    pub request_limit: u32,

    /// Successful submissions permitted over the throttle's lifetime
    #[serde(default)]
    pub total_budget: Option<u64>,

    /// Retry policy for transient failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Serve callers waiting for quota in arrival order (default: false)
    #[serde(default)]
    pub fair: bool,
}

/// Retry policy for transient submission failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per document including the first; `None` retries forever
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Delay between attempts in milliseconds; `None` waits one full window
    #[serde(default)]
    pub delay_ms: Option<u64>,

    /// Add up to 30% random jitter to the delay (default: false)
    #[serde(default)]
    pub jitter: bool,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Collect Prometheus metrics (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

// Default value functions
fn default_endpoint() -> String {
    "https://ismp.crpt.ru/api/v3/lk/documents/create".to_string()
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_time_unit() -> TimeUnit {
    TimeUnit::Second
}

fn default_request_limit() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

/// Whole milliseconds in `duration`, rounded up and saturating.
fn millis_ceil(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            time_unit: default_time_unit(),
            window_ms: None,
            request_limit: default_request_limit(),
            total_budget: None,
            retry: RetryConfig::default(),
            fair: false,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Config {
    /// Build a configuration from named variables, falling back to defaults
    /// for anything missing or unparseable.
    ///
    /// Recognised names: `CRPT_API_URL`, `CRPT_TIMEOUT_MS`,
    /// `THROTTLE_TIME_UNIT`, `THROTTLE_WINDOW_MS`, `THROTTLE_REQUEST_LIMIT`,
    /// `THROTTLE_TOTAL_BUDGET`, `THROTTLE_MAX_ATTEMPTS`,
    /// `THROTTLE_RETRY_DELAY_MS`, `THROTTLE_RETRY_JITTER`, `THROTTLE_FAIR`,
    /// `METRICS_ENABLED`.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: FromStr>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
            var(name).and_then(|v| v.trim().parse().ok())
        }

        Config {
            api: ApiConfig {
                endpoint: var("CRPT_API_URL").unwrap_or_else(default_endpoint),
                timeout_ms: parsed(&var, "CRPT_TIMEOUT_MS").unwrap_or_else(default_timeout_ms),
            },
            throttle: ThrottleConfig {
                time_unit: var("THROTTLE_TIME_UNIT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(default_time_unit),
                window_ms: parsed(&var, "THROTTLE_WINDOW_MS"),
                request_limit: parsed(&var, "THROTTLE_REQUEST_LIMIT")
                    .unwrap_or_else(default_request_limit),
                total_budget: parsed(&var, "THROTTLE_TOTAL_BUDGET"),
                retry: RetryConfig {
                    max_attempts: parsed(&var, "THROTTLE_MAX_ATTEMPTS"),
                    delay_ms: parsed(&var, "THROTTLE_RETRY_DELAY_MS"),
                    jitter: parsed(&var, "THROTTLE_RETRY_JITTER").unwrap_or(false),
                },
                fair: parsed(&var, "THROTTLE_FAIR").unwrap_or(false),
            },
            metrics: MetricsConfig {
                enabled: parsed(&var, "METRICS_ENABLED").unwrap_or_else(default_true),
            },
        }
    }
}

impl ApiConfig {
    /// Get the per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl TimeUnit {
    /// Duration of one unit
    pub fn duration(self) -> Duration {
        match self {
            Self::Second => Duration::from_secs(1),
            Self::Minute => Duration::from_secs(60),
            Self::Hour => Duration::from_secs(60 * 60),
            Self::Day => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = ThrottleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(Self::Second),
            "m" | "min" | "minute" | "minutes" => Ok(Self::Minute),
            "h" | "hour" | "hours" => Ok(Self::Hour),
            "d" | "day" | "days" => Ok(Self::Day),
            other => Err(ThrottleError::InvalidConfig(format!(
                "unknown time unit: {other}"
            ))),
        }
    }
}

impl ThrottleConfig {
    /// Configuration with an explicit window and per-window limit.
    ///
    /// The window is rounded up to whole milliseconds.
    pub fn new(window: Duration, request_limit: u32) -> Self {
        Self {
            window_ms: Some(millis_ceil(window)),
            request_limit,
            ..Default::default()
        }
    }

    /// Builder-style: set the lifetime submission budget
    pub fn budget(mut self, total_budget: u64) -> Self {
        self.total_budget = Some(total_budget);
        self
    }

    /// Builder-style: set the retry policy
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style: enable FIFO service of waiting callers
    pub fn fair(mut self, fair: bool) -> Self {
        self.fair = fair;
        self
    }

    /// Get the quota window duration
    pub fn window(&self) -> Duration {
        self.window_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.time_unit.duration())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ThrottleError> {
        if self.request_limit == 0 {
            return Err(ThrottleError::InvalidConfig(
                "request_limit must be positive".to_string(),
            ));
        }
        if self.window().is_zero() {
            return Err(ThrottleError::InvalidConfig(
                "window must be positive".to_string(),
            ));
        }
        if self.total_budget == Some(0) {
            return Err(ThrottleError::InvalidConfig(
                "total_budget must be positive when set".to_string(),
            ));
        }
        if self.retry.max_attempts == Some(0) {
            return Err(ThrottleError::InvalidConfig(
                "retry.max_attempts must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl RetryConfig {
    /// Retry at most `max_attempts` times in total, waiting `delay` between attempts.
    pub fn bounded(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            delay_ms: Some(millis_ceil(delay)),
            jitter: false,
        }
    }

    /// Whether another attempt is permitted after `attempts` have been made.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }

    /// Delay before the next attempt, defaulting to one quota window.
    pub fn delay(&self, window: Duration) -> Duration {
        let delay = self.delay_ms.map(Duration::from_millis).unwrap_or(window);
        if self.jitter {
            use rand::Rng;
            let jitter = rand::thread_rng().gen_range(0.0..0.3);
            delay + delay.mul_f64(jitter)
        } else {
            delay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.throttle.request_limit, 10);
        assert_eq!(config.throttle.window(), Duration::from_secs(1));
        assert!(config.throttle.total_budget.is_none());
        assert!(config.throttle.retry.max_attempts.is_none());
        assert!(config.api.endpoint.ends_with("/documents/create"));
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_window_override() {
        let config = ThrottleConfig {
            time_unit: TimeUnit::Hour,
            window_ms: Some(250),
            ..Default::default()
        };
        assert_eq!(config.window(), Duration::from_millis(250));
    }

    #[test]
    fn test_time_unit_parsing() {
        assert_eq!("minute".parse::<TimeUnit>().unwrap(), TimeUnit::Minute);
        assert_eq!(" H ".parse::<TimeUnit>().unwrap(), TimeUnit::Hour);
        assert!("fortnight".parse::<TimeUnit>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limit_and_budget() {
        assert!(ThrottleConfig::new(Duration::from_secs(1), 0).validate().is_err());
        assert!(ThrottleConfig::new(Duration::ZERO, 5).validate().is_err());
        assert!(ThrottleConfig::new(Duration::from_secs(1), 5)
            .budget(0)
            .validate()
            .is_err());
        assert!(ThrottleConfig::new(Duration::from_secs(1), 5)
            .budget(3)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_sub_millisecond_durations_round_up() {
        let config = ThrottleConfig::new(Duration::from_micros(500), 1);
        assert_eq!(config.window(), Duration::from_millis(1));
        assert!(config.validate().is_ok());

        let config = ThrottleConfig::new(Duration::from_micros(1500), 1);
        assert_eq!(config.window(), Duration::from_millis(2));

        let retry = RetryConfig::bounded(2, Duration::from_nanos(1));
        assert_eq!(retry.delay(Duration::from_secs(1)), Duration::from_millis(1));
    }

    #[test]
    fn test_from_vars_reads_every_setting() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CRPT_API_URL", "http://localhost:9000/create"),
            ("CRPT_TIMEOUT_MS", "1500"),
            ("THROTTLE_TIME_UNIT", "minute"),
            ("THROTTLE_REQUEST_LIMIT", "7"),
            ("THROTTLE_TOTAL_BUDGET", "20"),
            ("THROTTLE_MAX_ATTEMPTS", "4"),
            ("THROTTLE_RETRY_DELAY_MS", "250"),
            ("THROTTLE_RETRY_JITTER", "true"),
            ("THROTTLE_FAIR", "true"),
            ("METRICS_ENABLED", "false"),
        ]);
        let config = Config::from_vars(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.api.endpoint, "http://localhost:9000/create");
        assert_eq!(config.api.timeout(), Duration::from_millis(1500));
        assert_eq!(config.throttle.window(), Duration::from_secs(60));
        assert_eq!(config.throttle.request_limit, 7);
        assert_eq!(config.throttle.total_budget, Some(20));
        assert_eq!(config.throttle.retry.max_attempts, Some(4));
        assert_eq!(config.throttle.retry.delay_ms, Some(250));
        assert!(config.throttle.retry.jitter);
        assert!(config.throttle.fair);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_from_vars_falls_back_to_defaults() {
        let config = Config::from_vars(|name| match name {
            "THROTTLE_REQUEST_LIMIT" => Some("lots".to_string()),
            _ => None,
        });

        assert_eq!(config.throttle.request_limit, 10);
        assert_eq!(config.throttle.window(), Duration::from_secs(1));
        assert!(config.throttle.retry.delay_ms.is_none());
        assert!(!config.throttle.retry.jitter);
        assert!(config.metrics.enabled);
        assert!(config.api.endpoint.ends_with("/documents/create"));
    }

    #[test]
    fn test_retry_delay_defaults_to_window() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay(Duration::from_secs(2)), Duration::from_secs(2));
        assert!(retry.allows_retry(u32::MAX - 1));
    }

    #[test]
    fn test_bounded_retry() {
        let retry = RetryConfig::bounded(3, Duration::from_millis(100));
        assert!(retry.allows_retry(2));
        assert!(!retry.allows_retry(3));
        assert_eq!(retry.delay(Duration::from_secs(5)), Duration::from_millis(100));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let retry = RetryConfig {
            jitter: true,
            ..Default::default()
        };
        for _ in 0..50 {
            let delay = retry.delay(Duration::from_secs(1));
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_millis(1300));
        }
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: Config = serde_json::from_str(
            r#"{"throttle": {"time_unit": "minute", "request_limit": 5, "total_budget": 100}}"#,
        )
        .unwrap();
        assert_eq!(config.throttle.window(), Duration::from_secs(60));
        assert_eq!(config.throttle.request_limit, 5);
        assert_eq!(config.throttle.total_budget, Some(100));
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
    }
}
