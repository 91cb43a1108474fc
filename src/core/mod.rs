//! Core scheduling abstractions: tasks, triggers, priority, queueing and dispatch.

pub mod activity;
pub mod audit;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod priority;
pub mod queue;
pub mod registry;
pub mod scheduler;
pub mod spawn;
pub mod task;

pub use activity::{ActivityMonitor, ActivityState, MonitorSettings, SubscriptionId};
pub use audit::{
    build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink,
};
pub use error::{AppResult, LoadFailure, SchedulerError};
pub use loader::{LoadOutcome, Loader, LoaderFn};
pub use metrics::{MetricsAggregator, MetricsSnapshot};
pub use priority::{PriorityScorer, ScoringWeights};
pub use queue::{QueueEntry, ReadyQueue};
pub use registry::{Epoch, TaskEntry, TaskRegistry};
pub use scheduler::Scheduler;
pub use spawn::Spawn;
pub use task::{
    Condition, Importance, TaskDeclaration, TaskId, TaskState, TaskStatus, Trigger,
};
