//! Global scheduler configuration.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::activity::MonitorSettings;
use crate::core::error::{AppResult, SchedulerError};
use crate::util::serde::{duration_ms, option_duration_ms};

/// Prefix of the environment variables read by [`GlobalConfig::from_env`].
pub const ENV_PREFIX: &str = "LOAD_SCHEDULER_";

/// Scheduler-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Maximum simultaneous loader invocations (>= 1).
    pub max_concurrent_loads: usize,
    /// How often the activity monitor checks for idleness.
    #[serde(with = "duration_ms")]
    pub idle_poll_interval: Duration,
    /// Quiet time after which the consumer counts as idle.
    #[serde(with = "duration_ms")]
    pub idle_threshold: Duration,
    /// Retry bound for tasks without an override.
    pub default_max_retries: u32,
    /// Delay before a failed task is resubmitted, for tasks without an override.
    #[serde(with = "duration_ms")]
    pub default_retry_delay: Duration,
    /// Per-attempt deadline; `None` lets an attempt run indefinitely.
    #[serde(with = "option_duration_ms")]
    pub load_timeout: Option<Duration>,
    /// Window over which activity pulses raise task priority.
    #[serde(with = "duration_ms")]
    pub activity_window: Duration,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            max_concurrent_loads: 2,
            idle_poll_interval: Duration::from_millis(250),
            idle_threshold: Duration::from_millis(2000),
            default_max_retries: 3,
            default_retry_delay: Duration::from_millis(1000),
            load_timeout: Some(Duration::from_secs(30)),
            activity_window: Duration::from_secs(10),
        }
    }
}

impl GlobalConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.max_concurrent_loads == 0 {
            return Err(SchedulerError::InvalidConfig(
                "max_concurrent_loads must be at least 1".into(),
            ));
        }
        if self.idle_poll_interval.is_zero() {
            return Err(SchedulerError::InvalidConfig(
                "idle_poll_interval must be greater than 0".into(),
            ));
        }
        if self.idle_threshold.is_zero() {
            return Err(SchedulerError::InvalidConfig(
                "idle_threshold must be greater than 0".into(),
            ));
        }
        if self.load_timeout.is_some_and(|t| t.is_zero()) {
            return Err(SchedulerError::InvalidConfig(
                "load_timeout must be greater than 0 when set".into(),
            ));
        }
        if self.activity_window.is_zero() {
            return Err(SchedulerError::InvalidConfig(
                "activity_window must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields take defaults.
    pub fn from_json_str(input: &str) -> Result<Self, SchedulerError> {
        let cfg: Self = serde_json::from_str(input)
            .map_err(|e| SchedulerError::InvalidConfig(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `LOAD_SCHEDULER_*` environment variables,
    /// loading a `.env` file first if present. Unset variables take defaults.
    ///
    /// Durations are integer milliseconds; `LOAD_SCHEDULER_LOAD_TIMEOUT_MS=0`
    /// disables the load timeout.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        if let Some(v) = env_parse::<usize>("MAX_CONCURRENT_LOADS")? {
            cfg.max_concurrent_loads = v;
        }
        if let Some(v) = env_parse::<u64>("IDLE_POLL_INTERVAL_MS")? {
            cfg.idle_poll_interval = Duration::from_millis(v);
        }
        if let Some(v) = env_parse::<u64>("IDLE_THRESHOLD_MS")? {
            cfg.idle_threshold = Duration::from_millis(v);
        }
        if let Some(v) = env_parse::<u32>("DEFAULT_MAX_RETRIES")? {
            cfg.default_max_retries = v;
        }
        if let Some(v) = env_parse::<u64>("DEFAULT_RETRY_DELAY_MS")? {
            cfg.default_retry_delay = Duration::from_millis(v);
        }
        if let Some(v) = env_parse::<u64>("LOAD_TIMEOUT_MS")? {
            cfg.load_timeout = (v > 0).then(|| Duration::from_millis(v));
        }
        if let Some(v) = env_parse::<u64>("ACTIVITY_WINDOW_MS")? {
            cfg.activity_window = Duration::from_millis(v);
        }
        cfg.validate().context("invalid scheduler configuration from environment")?;
        Ok(cfg)
    }

    /// Activity monitor settings derived from this configuration.
    pub const fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            poll_interval: self.idle_poll_interval,
            idle_threshold: self.idle_threshold,
            activity_window: self.activity_window,
        }
    }

    /// Return a copy with the patch applied (not validated).
    #[must_use]
    pub fn patched(&self, patch: &ConfigPatch) -> Self {
        Self {
            max_concurrent_loads: patch
                .max_concurrent_loads
                .unwrap_or(self.max_concurrent_loads),
            idle_poll_interval: patch.idle_poll_interval.unwrap_or(self.idle_poll_interval),
            idle_threshold: patch.idle_threshold.unwrap_or(self.idle_threshold),
            default_max_retries: patch
                .default_max_retries
                .unwrap_or(self.default_max_retries),
            default_retry_delay: patch
                .default_retry_delay
                .unwrap_or(self.default_retry_delay),
            load_timeout: patch.load_timeout.unwrap_or(self.load_timeout),
            activity_window: patch.activity_window.unwrap_or(self.activity_window),
        }
    }
}

/// Partial update for [`GlobalConfig`]; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    /// New concurrency budget.
    pub max_concurrent_loads: Option<usize>,
    /// New idle poll interval.
    pub idle_poll_interval: Option<Duration>,
    /// New idle threshold.
    pub idle_threshold: Option<Duration>,
    /// New default retry bound.
    pub default_max_retries: Option<u32>,
    /// New default retry delay.
    pub default_retry_delay: Option<Duration>,
    /// New load timeout; `Some(None)` disables it.
    pub load_timeout: Option<Option<Duration>>,
    /// New activity window.
    pub activity_window: Option<Duration>,
}

impl ConfigPatch {
    /// Patch only the concurrency budget.
    pub fn max_concurrent_loads(value: usize) -> Self {
        Self {
            max_concurrent_loads: Some(value),
            ..Self::default()
        }
    }

    /// Whether the patch touches the activity monitor settings.
    pub const fn affects_monitor(&self) -> bool {
        self.idle_poll_interval.is_some()
            || self.idle_threshold.is_some()
            || self.activity_window.is_some()
    }
}

fn env_parse<T>(name: &str) -> AppResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let key = format!("{ENV_PREFIX}{name}");
    match std::env::var(&key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("failed to parse {key}={raw}")),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {key}")),
    }
}
