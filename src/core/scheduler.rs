//! Scheduler: registry, ready queue, triggers, dispatch and retry policy.
//!
//! Every state transition, queue mutation and the `active_loads` counter live
//! behind one coordinator lock (`parking_lot::Mutex`). The lock is never held
//! across an `.await`, while evaluating user predicates, or while recording
//! audit events. Loader invocations run concurrently on the injected spawner
//! and report back through [`Inner::finish`], which is the only place a load
//! outcome touches task state.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::broadcast;

use crate::config::{ConfigPatch, GlobalConfig};
use crate::core::activity::{ActivityMonitor, SubscriptionId};
use crate::core::audit::{build_audit_event, AuditAction, AuditEvent, AuditSink};
use crate::core::error::{LoadFailure, SchedulerError};
use crate::core::loader::{LoadOutcome, Loader};
use crate::core::metrics::{MetricsAggregator, MetricsSnapshot};
use crate::core::priority::PriorityScorer;
use crate::core::queue::{QueueEntry, ReadyQueue};
use crate::core::registry::{Epoch, TaskRegistry};
use crate::core::spawn::{PollerGate, Spawn};
use crate::core::task::{TaskDeclaration, TaskState, TaskStatus, Trigger};
use crate::runtime::TokioSpawner;
use crate::util::clock::{deadline_after, monotonic_now, saturating_millis};

/// Everything guarded by the coordinator lock.
struct Coordinator {
    registry: TaskRegistry,
    queue: ReadyQueue,
    active_loads: usize,
    config: GlobalConfig,
    fired_events: HashSet<String>,
}

impl Coordinator {
    /// Effective `(max_retries, retry_delay)` for a task.
    fn retry_policy(&self, id: &str) -> (u32, Duration) {
        self.registry.get(id).map_or(
            (self.config.default_max_retries, self.config.default_retry_delay),
            |entry| {
                (
                    entry
                        .declaration
                        .max_retries
                        .unwrap_or(self.config.default_max_retries),
                    entry
                        .declaration
                        .retry_delay
                        .unwrap_or(self.config.default_retry_delay),
                )
            },
        )
    }
}

/// One loader invocation handed to the spawner.
struct Dispatch {
    task_id: String,
    epoch: Epoch,
    timeout: Option<Duration>,
}

/// Components assembled by [`crate::builders::SchedulerBuilder`].
pub(crate) struct SchedulerParts<L, S> {
    pub(crate) config: GlobalConfig,
    pub(crate) loader: L,
    pub(crate) monitor: ActivityMonitor,
    pub(crate) spawner: S,
    pub(crate) scorer: PriorityScorer,
    pub(crate) audit: Option<Arc<dyn AuditSink>>,
}

struct Inner<L, S> {
    core: Mutex<Coordinator>,
    loader: Arc<L>,
    spawner: S,
    monitor: ActivityMonitor,
    scorer: PriorityScorer,
    audit: Option<Arc<dyn AuditSink>>,
    idle_subscription: Mutex<Option<SubscriptionId>>,
    condition_poller: PollerGate,
}

/// Deferred-load scheduler.
///
/// Cloning yields another handle to the same scheduler.
///
/// ```rust,ignore
/// use prometheus_load_scheduler::config::GlobalConfig;
/// use prometheus_load_scheduler::core::*;
/// use prometheus_load_scheduler::runtime::TokioSpawner;
///
/// let scheduler = Scheduler::new(
///     GlobalConfig::default(),
///     LoaderFn::new(|id| async move { fetch(&id).await }),
///     ActivityMonitor::default(),
///     TokioSpawner::current(),
/// )?;
/// scheduler.start();
/// scheduler.register(TaskDeclaration::new(
///     "charts",
///     Importance::High,
///     Trigger::OnIdle,
///     Duration::from_millis(120),
/// ))?;
/// ```
pub struct Scheduler<L, S = TokioSpawner> {
    inner: Arc<Inner<L, S>>,
}

impl<L, S> Clone for Scheduler<L, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L, S> Scheduler<L, S>
where
    L: Loader,
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Create a scheduler with the default scorer and no audit sink.
    ///
    /// The monitor is reconfigured with the idle settings from `config`.
    pub fn new(
        config: GlobalConfig,
        loader: L,
        monitor: ActivityMonitor,
        spawner: S,
    ) -> Result<Self, SchedulerError> {
        Self::from_parts(SchedulerParts {
            config,
            loader,
            monitor,
            spawner,
            scorer: PriorityScorer::default(),
            audit: None,
        })
    }

    pub(crate) fn from_parts(parts: SchedulerParts<L, S>) -> Result<Self, SchedulerError> {
        parts.config.validate()?;
        parts.monitor.reconfigure(parts.config.monitor_settings());

        let inner = Arc::new(Inner {
            core: Mutex::new(Coordinator {
                registry: TaskRegistry::new(),
                queue: ReadyQueue::new(),
                active_loads: 0,
                config: parts.config,
                fired_events: HashSet::new(),
            }),
            loader: Arc::new(parts.loader),
            spawner: parts.spawner,
            monitor: parts.monitor,
            scorer: parts.scorer,
            audit: parts.audit,
            idle_subscription: Mutex::new(None),
            condition_poller: PollerGate::default(),
        });

        let weak = Arc::downgrade(&inner);
        let subscription = inner.monitor.on_idle(move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_idle_transition();
            }
        });
        *inner.idle_subscription.lock() = Some(subscription);

        Ok(Self { inner })
    }

    /// Spawn the idle poller and the condition poller.
    ///
    /// Safe to call again after [`Scheduler::shutdown`]; pollers that are
    /// still running are left alone.
    pub fn start(&self) {
        self.inner.monitor.spawn_poller(&self.inner.spawner);
        self.inner.spawn_condition_poller();
        tracing::info!("load scheduler started");
    }

    /// Stop background pollers. In-flight loads and retry timers still resolve.
    pub fn shutdown(&self) {
        self.inner.condition_poller.stop();
        self.inner.monitor.shutdown();
        tracing::info!("load scheduler shutting down");
    }

    /// Register a task and evaluate its trigger.
    pub fn register(&self, declaration: TaskDeclaration) -> Result<(), SchedulerError> {
        self.inner.register(declaration)
    }

    /// Remove a task. An in-flight load is not aborted; its result is discarded.
    pub fn unregister(&self, id: &str) {
        self.inner.unregister(id);
    }

    /// Ask for a task to be loaded.
    ///
    /// No-op for Queued, Loading and Loaded tasks. A Failed task is re-armed
    /// with a fresh retry budget. A Cancelled task is rejected.
    pub fn request_load(&self, id: &str) -> Result<(), SchedulerError> {
        self.inner.request_load(id)
    }

    /// Cancel a Pending or Queued task. No-op once loading has started.
    pub fn cancel(&self, id: &str) -> Result<(), SchedulerError> {
        self.inner.cancel(id)
    }

    /// Current state of a task.
    pub fn status(&self, id: &str) -> Result<TaskState, SchedulerError> {
        self.inner
            .core
            .lock()
            .registry
            .entry(id)
            .map(|entry| entry.state.clone())
    }

    /// Summary statistics from a consistent snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        let (states, queue_depth, active_loads) = {
            let core = self.inner.core.lock();
            (core.registry.snapshot(), core.queue.len(), core.active_loads)
        };
        MetricsAggregator::compute(&states, queue_depth, active_loads)
    }

    /// Ready-queue entries in dispatch order.
    pub fn queue_snapshot(&self) -> Vec<QueueEntry> {
        self.inner.core.lock().queue.snapshot()
    }

    /// Current global configuration.
    pub fn global_config(&self) -> GlobalConfig {
        self.inner.core.lock().config.clone()
    }

    /// Apply a partial configuration update. Invalid results are rejected and
    /// the previous configuration is kept.
    pub fn set_global_config(&self, patch: &ConfigPatch) -> Result<GlobalConfig, SchedulerError> {
        self.inner.set_global_config(patch)
    }

    /// Fire a named event. Event triggers are single-fire latches: tasks
    /// registered afterwards for the same event enqueue at registration.
    pub fn emit_event(&self, name: &str) {
        self.inner.emit_event(name);
    }

    /// Forward event names from a broadcast channel into [`Scheduler::emit_event`].
    pub fn attach_event_source(&self, mut events: broadcast::Receiver<String>) {
        let weak: Weak<Inner<L, S>> = Arc::downgrade(&self.inner);
        self.inner.spawner.spawn(async move {
            loop {
                match events.recv().await {
                    Ok(name) => match weak.upgrade() {
                        Some(inner) => inner.emit_event(&name),
                        None => break,
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event source lagged; events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("event source detached");
        });
    }

    /// Evaluate armed condition triggers now.
    pub fn poll_conditions(&self) {
        self.inner.poll_conditions();
    }

    /// Record consumer activity on the injected monitor.
    pub fn pulse(&self) {
        self.inner.monitor.pulse();
    }

    /// The injected activity monitor.
    pub fn monitor(&self) -> &ActivityMonitor {
        &self.inner.monitor
    }

    /// Loader invocations currently in flight.
    pub fn active_loads(&self) -> usize {
        self.inner.core.lock().active_loads
    }
}

impl<L, S> Inner<L, S>
where
    L: Loader,
    S: Spawn + Clone + Send + Sync + 'static,
{
    fn register(self: &Arc<Self>, declaration: TaskDeclaration) -> Result<(), SchedulerError> {
        let id = declaration.id.clone();
        let trigger = declaration.trigger.clone();
        let importance = declaration.importance;
        let activity = self.monitor.activity_level();
        let mut events = Vec::new();
        {
            let mut guard = self.core.lock();
            let core = &mut *guard;
            core.registry.insert(declaration)?;
            self.note(
                &mut events,
                &id,
                AuditAction::Registered,
                json!({ "importance": importance, "trigger": trigger.kind() }),
            );
            match &trigger {
                Trigger::Immediate => self.enqueue_locked(core, &id, activity, &mut events)?,
                Trigger::OnEvent(name) if core.fired_events.contains(name) => {
                    core.registry.disarm(&id);
                    self.enqueue_locked(core, &id, activity, &mut events)?;
                }
                _ => {}
            }
        }
        tracing::info!(task_id = %id, trigger = trigger.kind(), "task registered");
        self.record(events);

        if let Trigger::OnCondition(condition) = &trigger {
            if condition.evaluate() {
                self.fire_triggers(&[id]);
            }
        }
        self.drain();
        Ok(())
    }

    fn unregister(self: &Arc<Self>, id: &str) {
        let mut events = Vec::new();
        {
            let mut guard = self.core.lock();
            let core = &mut *guard;
            let Some(entry) = core.registry.remove(id) else {
                tracing::debug!(task_id = %id, "unregister of unknown task ignored");
                return;
            };
            core.queue.remove(id);
            self.note(
                &mut events,
                id,
                AuditAction::Unregistered,
                json!({ "status": entry.state.status }),
            );
            if entry.state.status == TaskStatus::Loading {
                tracing::debug!(task_id = %id, "unregistered while loading; result will be discarded");
            }
        }
        tracing::info!(task_id = %id, "task unregistered");
        self.record(events);
        self.drain();
    }

    fn request_load(self: &Arc<Self>, id: &str) -> Result<(), SchedulerError> {
        let activity = self.monitor.activity_level();
        let mut events = Vec::new();
        {
            let mut guard = self.core.lock();
            self.request_locked(&mut guard, id, activity, &mut events)?;
        }
        self.record(events);
        self.drain();
        Ok(())
    }

    fn cancel(self: &Arc<Self>, id: &str) -> Result<(), SchedulerError> {
        let mut events = Vec::new();
        {
            let mut guard = self.core.lock();
            let core = &mut *guard;
            let status = core.registry.entry(id)?.state.status;
            match status {
                TaskStatus::Pending | TaskStatus::Queued => {
                    core.queue.remove(id);
                    core.registry.mark_cancelled(id)?;
                    self.note(
                        &mut events,
                        id,
                        AuditAction::Cancelled,
                        json!({ "previous_status": status }),
                    );
                    tracing::info!(task_id = %id, ?status, "task cancelled");
                }
                _ => {
                    tracing::debug!(task_id = %id, ?status, "cancel ignored");
                }
            }
        }
        self.record(events);
        self.drain();
        Ok(())
    }

    fn set_global_config(self: &Arc<Self>, patch: &ConfigPatch) -> Result<GlobalConfig, SchedulerError> {
        let next = {
            let mut core = self.core.lock();
            let next = core.config.patched(patch);
            if let Err(e) = next.validate() {
                tracing::warn!(error = %e, "configuration update rejected");
                return Err(e);
            }
            core.config = next.clone();
            next
        };
        if patch.affects_monitor() {
            self.monitor.reconfigure(next.monitor_settings());
        }
        tracing::info!(
            max_concurrent_loads = next.max_concurrent_loads,
            "configuration updated"
        );
        self.drain();
        Ok(next)
    }

    fn emit_event(self: &Arc<Self>, name: &str) {
        let candidates = {
            let mut core = self.core.lock();
            if !core.fired_events.insert(name.to_string()) {
                tracing::debug!(event = name, "event fired again");
            }
            core.registry.trigger_candidates(|trigger, armed| {
                armed && matches!(trigger, Trigger::OnEvent(n) if n == name)
            })
        };
        tracing::debug!(event = name, tasks = candidates.len(), "event fired");
        self.fire_triggers(&candidates);
    }

    fn on_idle_transition(self: &Arc<Self>) {
        let candidates = {
            let mut core = self.core.lock();
            let candidates = core.registry.trigger_candidates(|trigger, armed| match trigger {
                Trigger::OnIdle => true,
                Trigger::OnNextIdle => armed,
                _ => false,
            });
            // The next idle transition is consumed whether or not the task could use it.
            core.registry
                .disarm_where(|trigger| matches!(trigger, Trigger::OnNextIdle));
            candidates
        };
        tracing::debug!(tasks = candidates.len(), "idle transition");
        self.fire_enqueue(&candidates, false);
    }

    fn poll_conditions(self: &Arc<Self>) {
        let conditions = self.core.lock().registry.armed_conditions();
        let satisfied: Vec<String> = conditions
            .into_iter()
            .filter(|(_, condition)| condition.evaluate())
            .map(|(id, _)| id)
            .collect();
        if !satisfied.is_empty() {
            self.fire_triggers(&satisfied);
        }
    }

    /// Enqueue trigger-ready tasks, consuming one-shot triggers.
    fn fire_triggers(self: &Arc<Self>, ids: &[String]) {
        self.fire_enqueue(ids, true);
    }

    fn fire_enqueue(self: &Arc<Self>, ids: &[String], check_armed: bool) {
        if ids.is_empty() {
            return;
        }
        let activity = self.monitor.activity_level();
        let mut events = Vec::new();
        {
            let mut guard = self.core.lock();
            let core = &mut *guard;
            for id in ids {
                let ready = if check_armed {
                    core.registry.trigger_ready(id)
                } else {
                    core.registry
                        .get(id)
                        .is_some_and(|e| e.state.status == TaskStatus::Pending && e.state.next_retry_at.is_none())
                };
                if !ready {
                    continue;
                }
                core.registry.disarm(id);
                if let Err(e) = self.enqueue_locked(core, id, activity, &mut events) {
                    tracing::warn!(task_id = %id, error = %e, "trigger failed to enqueue task");
                }
            }
        }
        self.record(events);
        self.drain();
    }

    fn request_locked(
        &self,
        core: &mut Coordinator,
        id: &str,
        activity: f64,
        events: &mut Vec<AuditEvent>,
    ) -> Result<(), SchedulerError> {
        let status = core.registry.entry(id)?.state.status;
        match status {
            TaskStatus::Queued | TaskStatus::Loading | TaskStatus::Loaded => {
                tracing::debug!(task_id = %id, ?status, "request_load is a no-op");
                Ok(())
            }
            TaskStatus::Cancelled => Err(SchedulerError::TaskCancelled(id.to_string())),
            TaskStatus::Pending | TaskStatus::Failed => {
                self.enqueue_locked(core, id, activity, events)
            }
        }
    }

    fn enqueue_locked(
        &self,
        core: &mut Coordinator,
        id: &str,
        activity: f64,
        events: &mut Vec<AuditEvent>,
    ) -> Result<(), SchedulerError> {
        let score = self
            .scorer
            .score(&core.registry.entry(id)?.declaration, activity);
        core.registry.mark_queued(id)?;
        match core.queue.push(id.to_string(), score) {
            Some(entry) => {
                tracing::debug!(task_id = %id, priority = score, sequence = entry.sequence, "task enqueued");
                self.note(
                    events,
                    id,
                    AuditAction::Enqueued,
                    json!({ "priority": score, "sequence": entry.sequence }),
                );
            }
            None => tracing::debug!(task_id = %id, "task already queued"),
        }
        Ok(())
    }

    /// Admit queued tasks while the concurrency budget allows.
    fn drain(self: &Arc<Self>) {
        let mut events = Vec::new();
        let dispatches = {
            let mut guard = self.core.lock();
            let core = &mut *guard;
            let mut dispatches = Vec::new();
            while let Some(entry) = core
                .queue
                .pop_ready(core.active_loads, core.config.max_concurrent_loads)
            {
                match core.registry.mark_loading(&entry.task_id, monotonic_now()) {
                    Ok(epoch) => {
                        core.active_loads += 1;
                        let attempt = core
                            .registry
                            .get(&entry.task_id)
                            .map_or(1, |e| e.state.retry_count + 1);
                        tracing::info!(
                            task_id = %entry.task_id,
                            priority = entry.priority,
                            attempt,
                            active_loads = core.active_loads,
                            "load started"
                        );
                        self.note(
                            &mut events,
                            &entry.task_id,
                            AuditAction::Started,
                            json!({ "attempt": attempt, "priority": entry.priority }),
                        );
                        dispatches.push(Dispatch {
                            task_id: entry.task_id,
                            epoch,
                            timeout: core.config.load_timeout,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(task_id = %entry.task_id, error = %e, "dropping stale queue entry");
                    }
                }
            }
            dispatches
        };
        self.record(events);
        for dispatch in dispatches {
            self.spawn_load(dispatch);
        }
    }

    fn spawn_load(self: &Arc<Self>, dispatch: Dispatch) {
        let inner = Arc::clone(self);
        self.spawner.spawn(async move {
            let loader = Arc::clone(&inner.loader);
            let task_id = dispatch.task_id.clone();
            let attempt = AssertUnwindSafe(async move { loader.load(&task_id).await }).catch_unwind();
            let outcome = match dispatch.timeout {
                Some(limit) => match tokio::time::timeout(limit, attempt).await {
                    Ok(result) => result,
                    Err(_) => Ok(Err(LoadFailure::timed_out(limit))),
                },
                None => attempt.await,
            };
            let outcome = outcome.unwrap_or_else(|_| {
                tracing::error!(task_id = %dispatch.task_id, "loader panicked");
                Err(LoadFailure::panicked())
            });
            inner.finish(&dispatch, outcome);
        });
    }

    /// Apply a loader outcome, schedule a retry if allowed, then drain.
    fn finish(self: &Arc<Self>, dispatch: &Dispatch, outcome: LoadOutcome) {
        let id = dispatch.task_id.as_str();
        let mut events = Vec::new();
        let mut retry = None;
        {
            let mut guard = self.core.lock();
            let core = &mut *guard;
            core.active_loads = core.active_loads.saturating_sub(1);

            if core.registry.is_current(id, dispatch.epoch) {
                let now = monotonic_now();
                match outcome {
                    Ok(()) => match core.registry.mark_loaded(id, now) {
                        Ok(()) => {
                            let duration_ms = core
                                .registry
                                .get(id)
                                .and_then(|e| e.state.actual_duration())
                                .map_or(0, saturating_millis);
                            tracing::info!(task_id = %id, duration_ms = %duration_ms, "load succeeded");
                            self.note(
                                &mut events,
                                id,
                                AuditAction::Succeeded,
                                json!({ "duration_ms": duration_ms }),
                            );
                        }
                        Err(e) => tracing::warn!(task_id = %id, error = %e, "could not record success"),
                    },
                    Err(failure) => {
                        let (max_retries, delay) = core.retry_policy(id);
                        let retry_count = core
                            .registry
                            .get(id)
                            .map_or(0, |e| e.state.retry_count);
                        if retry_count < max_retries {
                            match core.registry.mark_retrying(id, now, deadline_after(now, delay)) {
                                Ok(count) => {
                                    tracing::warn!(
                                        task_id = %id,
                                        retry_count = count,
                                        max_retries,
                                        delay_ms = saturating_millis(delay),
                                        error = %failure,
                                        "load failed; retry scheduled"
                                    );
                                    self.note(
                                        &mut events,
                                        id,
                                        AuditAction::Retried,
                                        json!({
                                            "retry_count": count,
                                            "delay_ms": saturating_millis(delay),
                                            "error": failure.message,
                                        }),
                                    );
                                    retry = Some((count, delay));
                                }
                                Err(e) => tracing::warn!(task_id = %id, error = %e, "could not schedule retry"),
                            }
                        } else {
                            match core.registry.mark_failed(id, now, failure.message.clone()) {
                                Ok(()) => {
                                    tracing::warn!(
                                        task_id = %id,
                                        retry_count,
                                        error = %failure,
                                        "load failed; retries exhausted"
                                    );
                                    self.note(
                                        &mut events,
                                        id,
                                        AuditAction::Failed,
                                        json!({ "retry_count": retry_count, "error": failure.message }),
                                    );
                                }
                                Err(e) => tracing::warn!(task_id = %id, error = %e, "could not record failure"),
                            }
                        }
                    }
                }
            } else {
                tracing::debug!(task_id = %id, "discarding result for unregistered task");
            }
        }
        self.record(events);
        if let Some((retry_count, delay)) = retry {
            self.schedule_retry(id.to_string(), dispatch.epoch, retry_count, delay);
        }
        self.drain();
    }

    /// Resubmit through the `request_load` path once `delay` elapses.
    fn schedule_retry(self: &Arc<Self>, id: String, epoch: Epoch, retry_count: u32, delay: Duration) {
        let weak = Arc::downgrade(self);
        self.spawner.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.resume_retry(&id, epoch, retry_count);
            }
        });
    }

    fn resume_retry(self: &Arc<Self>, id: &str, epoch: Epoch, retry_count: u32) {
        let activity = self.monitor.activity_level();
        let mut events = Vec::new();
        {
            let mut guard = self.core.lock();
            let core = &mut *guard;
            let still_waiting = core.registry.is_current(id, epoch)
                && core.registry.get(id).is_some_and(|e| {
                    e.state.status == TaskStatus::Pending
                        && e.state.retry_count == retry_count
                        && e.state.next_retry_at.is_some()
                });
            if !still_waiting {
                tracing::debug!(task_id = %id, "retry timer superseded");
                return;
            }
            if let Err(e) = self.request_locked(core, id, activity, &mut events) {
                tracing::warn!(task_id = %id, error = %e, "retry resubmission failed");
            }
        }
        self.record(events);
        self.drain();
    }

    fn spawn_condition_poller(self: &Arc<Self>) {
        let Some(generation) = self.condition_poller.claim() else {
            return;
        };
        let weak = Arc::downgrade(self);
        self.spawner.spawn(async move {
            loop {
                let Some(interval) = weak.upgrade().map(|inner| inner.poll_interval()) else {
                    break;
                };
                tokio::time::sleep(interval).await;
                let Some(inner) = weak.upgrade() else { break };
                if !inner.condition_poller.is_current(generation) {
                    break;
                }
                inner.poll_conditions();
            }
            tracing::debug!("condition poller stopped");
        });
    }

    fn poll_interval(&self) -> Duration {
        self.core.lock().config.idle_poll_interval
    }

    fn note(
        &self,
        events: &mut Vec<AuditEvent>,
        task_id: &str,
        action: AuditAction,
        payload: serde_json::Value,
    ) {
        if self.audit.is_some() {
            events.push(build_audit_event(task_id, action, Some(payload)));
        }
    }

    fn record(&self, events: Vec<AuditEvent>) {
        if let Some(sink) = &self.audit {
            for event in events {
                sink.record(event);
            }
        }
    }
}

impl<L, S> Drop for Inner<L, S> {
    fn drop(&mut self) {
        if let Some(id) = self.idle_subscription.get_mut().take() {
            self.monitor.unsubscribe(id);
        }
    }
}
