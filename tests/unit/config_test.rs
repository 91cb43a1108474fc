//! Tests for configuration validation

use std::time::Duration;

use prometheus_load_scheduler::config::{ConfigPatch, GlobalConfig};
use prometheus_load_scheduler::core::SchedulerError;

#[test]
fn test_default_config() {
    let config = GlobalConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.max_concurrent_loads, 2);
    assert_eq!(config.idle_threshold, Duration::from_millis(2000));
    assert_eq!(config.default_max_retries, 3);
    assert_eq!(config.load_timeout, Some(Duration::from_secs(30)));
}

#[test]
fn test_config_invalid_concurrency() {
    let invalid = GlobalConfig {
        max_concurrent_loads: 0,
        ..GlobalConfig::default()
    };
    assert!(matches!(invalid.validate(), Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_config_invalid_poll_interval() {
    let invalid = GlobalConfig {
        idle_poll_interval: Duration::ZERO,
        ..GlobalConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_timeout() {
    let invalid = GlobalConfig {
        load_timeout: Some(Duration::ZERO),
        ..GlobalConfig::default()
    };
    assert!(invalid.validate().is_err());

    let disabled = GlobalConfig {
        load_timeout: None,
        ..GlobalConfig::default()
    };
    assert!(disabled.validate().is_ok());
}

#[test]
fn test_config_from_json_partial() {
    let config = GlobalConfig::from_json_str(
        r#"{ "max_concurrent_loads": 4, "idle_threshold": 1000, "load_timeout": null }"#,
    )
    .unwrap();
    assert_eq!(config.max_concurrent_loads, 4);
    assert_eq!(config.idle_threshold, Duration::from_millis(1000));
    assert_eq!(config.load_timeout, None);
    assert_eq!(config.default_retry_delay, Duration::from_millis(1000));
}

#[test]
fn test_config_from_json_rejects_invalid() {
    let err = GlobalConfig::from_json_str(r#"{ "max_concurrent_loads": 0 }"#).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfig(_)));
    assert!(GlobalConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_json_serialization() {
    let config = GlobalConfig::default();
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["idle_poll_interval"], 250);
    assert_eq!(json["load_timeout"], 30_000);
}

#[test]
fn test_patch_affects_monitor() {
    let patch = ConfigPatch {
        idle_threshold: Some(Duration::from_millis(500)),
        ..ConfigPatch::default()
    };
    assert!(patch.affects_monitor());
    assert!(!ConfigPatch::max_concurrent_loads(3).affects_monitor());
}
