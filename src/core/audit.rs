//! Audit sink implementations.
//!
//! The scheduler emits one structured event per lifecycle step. Where the
//! events end up is the integrator's concern; this module ships a bounded
//! in-memory sink for tests and dev, and a sink that forwards to `tracing`.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;

/// Lifecycle action recorded by an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Task declaration accepted.
    Registered,
    /// Task entered the ready queue.
    Enqueued,
    /// Loader invocation dispatched.
    Started,
    /// Loader reported success.
    Succeeded,
    /// Loader failed and a retry was scheduled.
    Retried,
    /// Loader failed and retries are exhausted.
    Failed,
    /// Task cancelled before a load attempt started.
    Cancelled,
    /// Task removed from the registry.
    Unregistered,
}

impl AuditAction {
    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Enqueued => "enqueued",
            Self::Started => "started",
            Self::Succeeded => "succeeded",
            Self::Retried => "retried",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unregistered => "unregistered",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Related task identifier.
    pub task_id: String,
    /// Action taken.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Relevant state fields (priority, retry count, error, ...).
    pub payload: Option<serde_json::Value>,
}

/// Audit sink abstraction.
///
/// Called outside the scheduler's coordinator lock, possibly from several
/// runtime threads.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Actions recorded for one task, oldest first.
    pub fn actions_for(&self, task_id: &str) -> Vec<AuditAction> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.task_id == task_id)
            .map(|e| e.action)
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that forwards events to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        let payload = event
            .payload
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        tracing::info!(
            target: "load_scheduler::audit",
            event_id = %event.event_id,
            task_id = %event.task_id,
            action = %event.action,
            created_at_ms = %event.created_at_ms,
            payload = %payload,
            "audit"
        );
    }
}

/// Helper to build an audit event with a fresh id and the current time.
pub fn build_audit_event(
    task_id: impl Into<String>,
    action: AuditAction,
    payload: Option<serde_json::Value>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        task_id: task_id.into(),
        action,
        created_at_ms: now_ms(),
        payload,
    }
}
