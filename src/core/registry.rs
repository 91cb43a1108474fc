//! Task registry: the single owner and mutator of lifecycle state.

use std::collections::HashMap;

use crate::core::error::SchedulerError;
use crate::core::task::{Condition, TaskDeclaration, TaskId, TaskState, TaskStatus, Trigger};
use crate::util::clock::Instant;

/// Registration epoch; distinguishes a task from a later re-registration
/// under the same id.
pub type Epoch = u64;

/// Declaration and state of one registered task.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Immutable declaration.
    pub declaration: TaskDeclaration,
    /// Current lifecycle state.
    pub state: TaskState,
    /// Registration epoch.
    pub epoch: Epoch,
    /// Whether a one-shot trigger is still waiting to fire.
    pub trigger_armed: bool,
}

/// Owns every declaration and its state.
///
/// All status changes go through the `mark_*` methods, which enforce the
/// lifecycle transition table.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<TaskId, TaskEntry>,
    next_epoch: Epoch,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration in `Pending`.
    pub fn insert(&mut self, declaration: TaskDeclaration) -> Result<Epoch, SchedulerError> {
        declaration
            .validate()
            .map_err(SchedulerError::InvalidDeclaration)?;
        if self.tasks.contains_key(&declaration.id) {
            return Err(SchedulerError::DuplicateTask(declaration.id));
        }
        self.next_epoch += 1;
        let epoch = self.next_epoch;
        let trigger_armed = declaration.trigger.is_one_shot();
        self.tasks.insert(
            declaration.id.clone(),
            TaskEntry {
                declaration,
                state: TaskState::pending(),
                epoch,
                trigger_armed,
            },
        );
        Ok(epoch)
    }

    /// Remove a task, returning its entry.
    pub fn remove(&mut self, id: &str) -> Option<TaskEntry> {
        self.tasks.remove(id)
    }

    /// Look up a task.
    pub fn get(&self, id: &str) -> Option<&TaskEntry> {
        self.tasks.get(id)
    }

    /// Look up a task, failing with `UnknownTask`.
    pub fn entry(&self, id: &str) -> Result<&TaskEntry, SchedulerError> {
        self.tasks
            .get(id)
            .ok_or_else(|| SchedulerError::UnknownTask(id.to_string()))
    }

    /// Whether the id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether the id is registered under the given epoch.
    pub fn is_current(&self, id: &str, epoch: Epoch) -> bool {
        self.tasks.get(id).is_some_and(|e| e.epoch == epoch)
    }

    /// Number of tasks in a status.
    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks
            .values()
            .filter(|e| e.state.status == status)
            .count()
    }

    /// Copy of every state, for metrics.
    pub fn snapshot(&self) -> Vec<TaskState> {
        self.tasks.values().map(|e| e.state.clone()).collect()
    }

    /// Ids whose trigger matches `pred` and that are eligible for a trigger
    /// firing, in registration order.
    pub fn trigger_candidates(&self, pred: impl Fn(&Trigger, bool) -> bool) -> Vec<TaskId> {
        let mut ids: Vec<(Epoch, TaskId)> = self
            .tasks
            .values()
            .filter(|e| is_trigger_eligible(&e.state) && pred(&e.declaration.trigger, e.trigger_armed))
            .map(|e| (e.epoch, e.declaration.id.clone()))
            .collect();
        ids.sort_unstable();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Whether a trigger firing for `id` should enqueue it now.
    pub fn trigger_ready(&self, id: &str) -> bool {
        self.tasks.get(id).is_some_and(|e| {
            is_trigger_eligible(&e.state)
                && (e.trigger_armed || !e.declaration.trigger.is_one_shot())
        })
    }

    /// Armed condition triggers of eligible tasks, in registration order.
    pub fn armed_conditions(&self) -> Vec<(TaskId, Condition)> {
        let mut conditions: Vec<(Epoch, TaskId, Condition)> = self
            .tasks
            .values()
            .filter(|e| e.trigger_armed && is_trigger_eligible(&e.state))
            .filter_map(|e| match &e.declaration.trigger {
                Trigger::OnCondition(cond) => Some((e.epoch, e.declaration.id.clone(), cond.clone())),
                _ => None,
            })
            .collect();
        conditions.sort_unstable_by_key(|(epoch, _, _)| *epoch);
        conditions.into_iter().map(|(_, id, cond)| (id, cond)).collect()
    }

    /// Consume a one-shot trigger.
    pub fn disarm(&mut self, id: &str) {
        if let Some(entry) = self.tasks.get_mut(id) {
            entry.trigger_armed = false;
        }
    }

    /// Consume every armed trigger matching `pred`, whatever the task status.
    pub fn disarm_where(&mut self, pred: impl Fn(&Trigger) -> bool) {
        for entry in self.tasks.values_mut() {
            if entry.trigger_armed && pred(&entry.declaration.trigger) {
                entry.trigger_armed = false;
            }
        }
    }

    /// Pending (or Failed, re-armed) → Queued.
    pub fn mark_queued(&mut self, id: &str) -> Result<(), SchedulerError> {
        let entry = self.transition(id, TaskStatus::Queued)?;
        if entry.state.status == TaskStatus::Failed {
            entry.state.retry_count = 0;
            entry.state.last_error = None;
        }
        entry.state.next_retry_at = None;
        entry.state.status = TaskStatus::Queued;
        Ok(())
    }

    /// Queued → Loading. Returns the epoch the attempt belongs to.
    pub fn mark_loading(&mut self, id: &str, now: Instant) -> Result<Epoch, SchedulerError> {
        let entry = self.transition(id, TaskStatus::Loading)?;
        entry.state.status = TaskStatus::Loading;
        entry.state.started_at = Some(now);
        entry.state.finished_at = None;
        Ok(entry.epoch)
    }

    /// Loading → Loaded.
    pub fn mark_loaded(&mut self, id: &str, now: Instant) -> Result<(), SchedulerError> {
        let entry = self.transition(id, TaskStatus::Loaded)?;
        entry.state.status = TaskStatus::Loaded;
        entry.state.finished_at = Some(now);
        entry.state.last_error = None;
        Ok(())
    }

    /// Loading → Pending with an incremented retry count. Returns the new count.
    pub fn mark_retrying(
        &mut self,
        id: &str,
        now: Instant,
        retry_at: Instant,
    ) -> Result<u32, SchedulerError> {
        let entry = self.transition(id, TaskStatus::Pending)?;
        entry.state.status = TaskStatus::Pending;
        entry.state.retry_count += 1;
        entry.state.finished_at = Some(now);
        entry.state.next_retry_at = Some(retry_at);
        Ok(entry.state.retry_count)
    }

    /// Loading → Failed with the last error.
    pub fn mark_failed(
        &mut self,
        id: &str,
        now: Instant,
        error: impl Into<String>,
    ) -> Result<(), SchedulerError> {
        let entry = self.transition(id, TaskStatus::Failed)?;
        entry.state.status = TaskStatus::Failed;
        entry.state.finished_at = Some(now);
        entry.state.last_error = Some(error.into());
        Ok(())
    }

    /// Pending/Queued → Cancelled.
    pub fn mark_cancelled(&mut self, id: &str) -> Result<(), SchedulerError> {
        let entry = self.transition(id, TaskStatus::Cancelled)?;
        entry.state.status = TaskStatus::Cancelled;
        entry.state.next_retry_at = None;
        Ok(())
    }

    fn transition(&mut self, id: &str, to: TaskStatus) -> Result<&mut TaskEntry, SchedulerError> {
        let entry = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| SchedulerError::UnknownTask(id.to_string()))?;
        let from = entry.state.status;
        if !from.can_transition_to(to) {
            return Err(SchedulerError::InvalidTransition {
                task_id: id.to_string(),
                from,
                to,
            });
        }
        Ok(entry)
    }
}

/// Triggers only enqueue tasks that are pending with no retry timer outstanding.
const fn is_trigger_eligible(state: &TaskState) -> bool {
    matches!(state.status, TaskStatus::Pending) && state.next_retry_at.is_none()
}
