//! Tests for audit sink

use prometheus_load_scheduler::core::{
    build_audit_event, AuditAction, AuditSink, InMemoryAuditSink, TracingAuditSink,
};
use serde_json::json;

#[test]
fn test_in_memory_audit_sink() {
    let sink = InMemoryAuditSink::new(10);

    let event = build_audit_event("task1", AuditAction::Enqueued, Some(json!({ "priority": 45.0 })));
    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, event.event_id);
    assert_eq!(events[0].task_id, "task1");
    assert_eq!(events[0].action, AuditAction::Enqueued);
}

#[test]
fn test_audit_sink_overflow() {
    let sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("task1", AuditAction::Registered, None));
    sink.record(build_audit_event("task2", AuditAction::Registered, None));
    sink.record(build_audit_event("task3", AuditAction::Registered, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].task_id, "task2"); // First one popped
    assert_eq!(events[1].task_id, "task3");
}

#[test]
fn test_actions_for_filters_by_task() {
    let sink = InMemoryAuditSink::new(10);
    sink.record(build_audit_event("a", AuditAction::Registered, None));
    sink.record(build_audit_event("b", AuditAction::Registered, None));
    sink.record(build_audit_event("a", AuditAction::Enqueued, None));

    assert_eq!(
        sink.actions_for("a"),
        vec![AuditAction::Registered, AuditAction::Enqueued]
    );
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event("task1", AuditAction::Failed, Some(json!({ "error": "boom" })));

    assert!(!event.event_id.is_empty());
    assert_eq!(event.task_id, "task1");
    assert_eq!(event.action.as_str(), "failed");
    assert_eq!(event.payload, Some(json!({ "error": "boom" })));
    assert!(event.created_at_ms > 0);

    let other = build_audit_event("task1", AuditAction::Failed, None);
    assert_ne!(event.event_id, other.event_id);
}

#[test]
fn test_tracing_sink_accepts_events() {
    let sink = TracingAuditSink;
    sink.record(build_audit_event("task1", AuditAction::Succeeded, None));
}
