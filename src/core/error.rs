//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::task::{TaskId, TaskStatus};

/// Structural errors reported synchronously by scheduler operations.
///
/// None of these are retried automatically. Loader failures are not part of
/// this enum: they are recovered by the retry policy and surface as
/// [`TaskStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Operation referenced an id that is not registered.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
    /// `register` was called with an id that is already registered.
    #[error("duplicate task: {0}")]
    DuplicateTask(TaskId),
    /// `request_load` was called on a cancelled task.
    #[error("task cancelled: {0}")]
    TaskCancelled(TaskId),
    /// Declaration rejected at registration.
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),
    /// Global configuration rejected; the previous configuration is retained.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A lifecycle transition that the state machine does not allow.
    #[error("invalid transition for {task_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Status before the attempted transition.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },
}

/// A loader reported failure for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadFailure {
    /// Human-readable failure reason, stored as `last_error` once retries run out.
    pub message: String,
}

impl LoadFailure {
    /// Create a failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Failure produced when an attempt exceeds the configured load timeout.
    pub fn timed_out(after: std::time::Duration) -> Self {
        Self::new(format!("load timed out after {}ms", after.as_millis()))
    }

    /// Failure produced when the loader future panicked.
    pub fn panicked() -> Self {
        Self::new("loader panicked")
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            SchedulerError::UnknownTask("x".into()).to_string(),
            "unknown task: x"
        );
        assert_eq!(
            SchedulerError::InvalidTransition {
                task_id: "x".into(),
                from: TaskStatus::Loaded,
                to: TaskStatus::Queued,
            }
            .to_string(),
            "invalid transition for x: Loaded -> Queued"
        );
    }

    #[test]
    fn test_load_failure_constructors() {
        assert_eq!(
            LoadFailure::timed_out(std::time::Duration::from_millis(1500)).message,
            "load timed out after 1500ms"
        );
        assert_eq!(LoadFailure::panicked().to_string(), "loader panicked");
    }
}
