//! Tests for error types

use std::time::Duration;

use prometheus_load_scheduler::core::{LoadFailure, SchedulerError, TaskStatus};

#[test]
fn test_unknown_task_error() {
    let err = SchedulerError::UnknownTask("charts".to_string());
    assert_eq!(format!("{}", err), "unknown task: charts");
}

#[test]
fn test_duplicate_task_error() {
    let err = SchedulerError::DuplicateTask("charts".to_string());
    assert_eq!(format!("{}", err), "duplicate task: charts");
}

#[test]
fn test_cancelled_error() {
    let err = SchedulerError::TaskCancelled("charts".to_string());
    assert_eq!(format!("{}", err), "task cancelled: charts");
}

#[test]
fn test_invalid_transition_error() {
    let err = SchedulerError::InvalidTransition {
        task_id: "charts".to_string(),
        from: TaskStatus::Loaded,
        to: TaskStatus::Queued,
    };
    assert_eq!(format!("{}", err), "invalid transition for charts: Loaded -> Queued");
}

#[test]
fn test_load_failure_messages() {
    assert_eq!(LoadFailure::new("network down").to_string(), "network down");
    assert_eq!(
        LoadFailure::timed_out(Duration::from_millis(1500)).to_string(),
        "load timed out after 1500ms"
    );
    assert_eq!(LoadFailure::panicked().to_string(), "loader panicked");
}
