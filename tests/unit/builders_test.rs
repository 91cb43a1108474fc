//! Tests for builder modules

use std::sync::Arc;
use std::time::Duration;

use prometheus_load_scheduler::builders::SchedulerBuilder;
use prometheus_load_scheduler::config::GlobalConfig;
use prometheus_load_scheduler::core::{
    ActivityMonitor, AuditAction, Importance, InMemoryAuditSink, LoadFailure, Loader, LoaderFn, SchedulerError,
    TaskDeclaration, Trigger,
};
use prometheus_load_scheduler::runtime::TokioSpawner;

fn noop_loader() -> impl Loader {
    LoaderFn::new(|_id: String| async move { Ok::<(), LoadFailure>(()) })
}

#[tokio::test]
async fn test_builder_defaults() {
    let builder = SchedulerBuilder::new(noop_loader(), TokioSpawner::current());
    assert_eq!(builder.configuration(), &GlobalConfig::default());
    let scheduler = builder.build().unwrap();
    assert_eq!(scheduler.global_config().max_concurrent_loads, 2);
}

#[tokio::test]
async fn test_builder_rejects_invalid_config() {
    let result = SchedulerBuilder::new(noop_loader(), TokioSpawner::current())
        .config(GlobalConfig {
            max_concurrent_loads: 0,
            ..GlobalConfig::default()
        })
        .build();
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_builder_applies_config_to_shared_monitor() {
    let monitor = ActivityMonitor::default();
    let config = GlobalConfig {
        idle_threshold: Duration::from_millis(750),
        ..GlobalConfig::default()
    };
    let _scheduler = SchedulerBuilder::new(noop_loader(), TokioSpawner::current())
        .config(config)
        .monitor(monitor.clone())
        .build()
        .unwrap();
    assert_eq!(monitor.settings().idle_threshold, Duration::from_millis(750));
}

#[tokio::test]
async fn test_builder_wires_audit_sink() {
    let sink = Arc::new(InMemoryAuditSink::new(16));
    let scheduler = SchedulerBuilder::new(noop_loader(), TokioSpawner::current())
        .audit(sink.clone())
        .build()
        .unwrap();

    scheduler
        .register(TaskDeclaration::new(
            "panel",
            Importance::Low,
            Trigger::OnIdle,
            Duration::from_millis(20),
        ))
        .unwrap();
    assert_eq!(sink.actions_for("panel"), vec![AuditAction::Registered]);
}

#[tokio::test]
async fn test_builder_reads_environment() {
    std::env::set_var("LOAD_SCHEDULER_MAX_CONCURRENT_LOADS", "5");
    std::env::set_var("LOAD_SCHEDULER_LOAD_TIMEOUT_MS", "0");
    let builder = SchedulerBuilder::new(noop_loader(), TokioSpawner::current())
        .config_from_env()
        .unwrap();
    assert_eq!(builder.configuration().max_concurrent_loads, 5);
    assert_eq!(builder.configuration().load_timeout, None);
    assert_eq!(builder.build().unwrap().global_config().max_concurrent_loads, 5);

    std::env::set_var("LOAD_SCHEDULER_MAX_CONCURRENT_LOADS", "many");
    let result = SchedulerBuilder::new(noop_loader(), TokioSpawner::current()).config_from_env();
    assert!(result.is_err());

    std::env::remove_var("LOAD_SCHEDULER_MAX_CONCURRENT_LOADS");
    std::env::remove_var("LOAD_SCHEDULER_LOAD_TIMEOUT_MS");
}
