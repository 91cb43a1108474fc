//! Tests for utilities

use std::time::Duration;

use prometheus_load_scheduler::util::clock::{monotonic_now, now_ms};
use prometheus_load_scheduler::util::serde::duration_ms;

#[test]
fn test_now_ms_monotonicish() {
    let a = now_ms();
    let b = now_ms();
    assert!(b >= a);
}

#[tokio::test(start_paused = true)]
async fn test_monotonic_now_follows_paused_clock() {
    let start = monotonic_now();
    tokio::time::advance(Duration::from_millis(40)).await;
    assert_eq!(monotonic_now() - start, Duration::from_millis(40));
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Wrapper {
    #[serde(with = "duration_ms")]
    delay: Duration,
}

#[test]
fn test_duration_ms_format() {
    let json = serde_json::to_string(&Wrapper {
        delay: Duration::from_millis(1250),
    })
    .unwrap();
    assert_eq!(json, r#"{"delay":1250}"#);
    let back: Wrapper = serde_json::from_str(r#"{"delay":75}"#).unwrap();
    assert_eq!(back.delay, Duration::from_millis(75));
}

#[test]
fn test_tracing_init_is_idempotent() {
    prometheus_load_scheduler::util::init_test_tracing();
    prometheus_load_scheduler::util::init_test_tracing();
    prometheus_load_scheduler::util::init_tracing();
    tracing::info!("telemetry initialised");
}
