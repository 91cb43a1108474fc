//! Task declarations, triggers, and lifecycle state.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::util::clock::Instant;

/// Unique task key.
pub type TaskId = String;

/// Ordinal priority class assigned at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Lowest class.
    Low,
    /// Default class.
    Medium,
    /// Elevated class.
    High,
    /// Highest class.
    Critical,
}

impl Importance {
    /// Base weight used by the priority scorer.
    pub const fn base_weight(self) -> f64 {
        match self {
            Self::Critical => 100.0,
            Self::High => 75.0,
            Self::Medium => 50.0,
            Self::Low => 25.0,
        }
    }
}

/// Predicate evaluated by condition triggers.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn() -> bool + Send + Sync>);

impl Condition {
    /// Wrap a predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Evaluate the predicate.
    pub fn evaluate(&self) -> bool {
        (self.0)()
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}

/// When a task becomes eligible for enqueue.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Enqueue at registration.
    Immediate,
    /// Enqueue on every idle transition while still pending.
    OnIdle,
    /// Enqueue on the next idle transition only.
    OnNextIdle,
    /// Enqueue when the named event fires.
    OnEvent(String),
    /// Enqueue the first time the predicate holds.
    OnCondition(Condition),
}

impl Trigger {
    /// Build a condition trigger from a closure.
    pub fn condition<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self::OnCondition(Condition::new(predicate))
    }

    /// Short name used in logs and audit payloads.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::OnIdle => "on_idle",
            Self::OnNextIdle => "on_next_idle",
            Self::OnEvent(_) => "on_event",
            Self::OnCondition(_) => "on_condition",
        }
    }

    /// Whether this trigger fires at most once.
    pub const fn is_one_shot(&self) -> bool {
        matches!(
            self,
            Self::OnNextIdle | Self::OnEvent(_) | Self::OnCondition(_)
        )
    }
}

/// Immutable description of a deferred load.
#[derive(Debug, Clone)]
pub struct TaskDeclaration {
    /// Unique key.
    pub id: TaskId,
    /// Priority class.
    pub importance: Importance,
    /// Enqueue condition.
    pub trigger: Trigger,
    /// Cost estimate, used only for scoring.
    pub estimated_cost: Duration,
    /// Per-task override of the global retry bound.
    pub max_retries: Option<u32>,
    /// Per-task override of the global retry delay.
    pub retry_delay: Option<Duration>,
}

impl TaskDeclaration {
    /// Declare a task with no retry overrides.
    pub fn new(
        id: impl Into<TaskId>,
        importance: Importance,
        trigger: Trigger,
        estimated_cost: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            importance,
            trigger,
            estimated_cost,
            max_retries: None,
            retry_delay: None,
        }
    }

    /// Override the retry bound.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Override the retry delay.
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = Some(retry_delay);
        self
    }

    /// Check the declaration can be registered.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("task id must not be empty".into());
        }
        if self.estimated_cost.is_zero() {
            return Err(format!("task `{}`: estimated_cost must be positive", self.id));
        }
        if let Trigger::OnEvent(name) = &self.trigger {
            if name.is_empty() {
                return Err(format!("task `{}`: event name must not be empty", self.id));
            }
        }
        Ok(())
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Registered, waiting for its trigger (or for a retry timer).
    Pending,
    /// In the ready queue.
    Queued,
    /// Loader invocation in flight.
    Loading,
    /// Loader succeeded.
    Loaded,
    /// Retries exhausted.
    Failed,
    /// Cancelled before a load attempt started.
    Cancelled,
}

impl TaskStatus {
    /// Whether the state machine allows `self -> next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending | Self::Failed, Self::Queued)
                | (Self::Queued, Self::Loading)
                | (Self::Loading, Self::Loaded | Self::Failed | Self::Pending)
                | (Self::Pending | Self::Queued, Self::Cancelled)
        )
    }

    /// No further transitions happen without an explicit request.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Loaded | Self::Failed | Self::Cancelled)
    }
}

/// Mutable lifecycle state, owned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskState {
    /// Current status.
    pub status: TaskStatus,
    /// Failed attempts that were retried.
    pub retry_count: u32,
    /// Start of the latest attempt.
    pub started_at: Option<Instant>,
    /// End of the latest attempt.
    pub finished_at: Option<Instant>,
    /// Failure message, set only in `Failed`.
    pub last_error: Option<String>,
    /// When the outstanding retry timer resubmits, if any.
    pub next_retry_at: Option<Instant>,
}

impl TaskState {
    /// Fresh state for a newly registered task.
    pub const fn pending() -> Self {
        Self {
            status: TaskStatus::Pending,
            retry_count: 0,
            started_at: None,
            finished_at: None,
            last_error: None,
            next_retry_at: None,
        }
    }

    /// Duration of the latest completed attempt.
    pub fn actual_duration(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end.saturating_duration_since(start)),
            _ => None,
        }
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_weights() {
        assert_eq!(Importance::Critical.base_weight(), 100.0);
        assert_eq!(Importance::High.base_weight(), 75.0);
        assert_eq!(Importance::Medium.base_weight(), 50.0);
        assert_eq!(Importance::Low.base_weight(), 25.0);
        assert!(Importance::Critical > Importance::Low);
    }

    #[test]
    fn test_transitions() {
        use TaskStatus::*;
        assert!(Pending.can_transition_to(Queued));
        assert!(Queued.can_transition_to(Loading));
        assert!(Loading.can_transition_to(Pending));
        assert!(Loading.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Queued));
        assert!(Queued.can_transition_to(Cancelled));
        assert!(!Loading.can_transition_to(Cancelled));
        assert!(!Loaded.can_transition_to(Queued));
        assert!(!Cancelled.can_transition_to(Queued));
        assert!(!Pending.can_transition_to(Loading));

        assert!(Loaded.is_terminal());
        assert!(Failed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!Queued.is_terminal());
        assert!(!Loading.is_terminal());
    }

    #[test]
    fn test_declaration_validation() {
        let ok = TaskDeclaration::new("a", Importance::Low, Trigger::Immediate, Duration::from_millis(5));
        assert!(ok.validate().is_ok());

        let empty = TaskDeclaration::new(" ", Importance::Low, Trigger::Immediate, Duration::from_millis(5));
        assert!(empty.validate().is_err());

        let free = TaskDeclaration::new("b", Importance::Low, Trigger::Immediate, Duration::ZERO);
        assert!(free.validate().is_err());

        let unnamed = TaskDeclaration::new(
            "c",
            Importance::Low,
            Trigger::OnEvent(String::new()),
            Duration::from_millis(5),
        );
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_condition_trigger_evaluates() {
        let trigger = Trigger::condition(|| true);
        assert_eq!(trigger.kind(), "on_condition");
        assert!(trigger.is_one_shot());
        match trigger {
            Trigger::OnCondition(cond) => assert!(cond.evaluate()),
            other => panic!("unexpected trigger {other:?}"),
        }
    }

    #[test]
    fn test_actual_duration_requires_both_stamps() {
        let mut state = TaskState::pending();
        assert_eq!(state.actual_duration(), None);
        let start = Instant::now();
        state.started_at = Some(start);
        state.finished_at = Some(start + Duration::from_millis(40));
        assert_eq!(state.actual_duration(), Some(Duration::from_millis(40)));
    }
}
