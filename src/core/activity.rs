//! Edge-triggered idle detection.
//!
//! The monitor tracks when the consumer was last active. Activity arrives as
//! abstract pulses (pointer movement, keystrokes, network chatter; the source
//! is the integrator's concern). A poller compares the time since the last
//! pulse against the idle threshold and fires idle callbacks once per
//! Active→Idle edge. The next pulse flips the state back to Active without
//! re-firing idle callbacks.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::spawn::{PollerGate, Spawn};
use crate::util::clock::{monotonic_now, Instant};

/// Handle returned by callback registration.
pub type SubscriptionId = u64;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Consumer activity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityState {
    /// A pulse was seen within the idle threshold.
    Active,
    /// No pulse for at least the idle threshold.
    Idle,
}

/// Timing parameters for the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// How often the poller checks for idleness.
    pub poll_interval: Duration,
    /// Quiet time after which the consumer counts as idle.
    pub idle_threshold: Duration,
    /// Window over which pulses count towards the activity level.
    pub activity_window: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            idle_threshold: Duration::from_millis(2000),
            activity_window: Duration::from_secs(10),
        }
    }
}

struct MonitorState {
    last_active_at: Instant,
    activity: ActivityState,
    recent_pulses: VecDeque<Instant>,
    idle_transitions: u64,
}

#[derive(Default)]
struct Callbacks {
    idle: Vec<(SubscriptionId, Callback)>,
    active: Vec<(SubscriptionId, Callback)>,
}

struct MonitorInner {
    settings: Mutex<MonitorSettings>,
    state: Mutex<MonitorState>,
    callbacks: Mutex<Callbacks>,
    next_subscription: AtomicU64,
    poller: PollerGate,
}

/// Idle detector shared between the scheduler and the activity source.
///
/// Cloning yields another handle to the same monitor.
#[derive(Clone)]
pub struct ActivityMonitor {
    inner: Arc<MonitorInner>,
}

impl ActivityMonitor {
    /// Create a monitor that starts out active as of now.
    pub fn new(settings: MonitorSettings) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                settings: Mutex::new(settings),
                state: Mutex::new(MonitorState {
                    last_active_at: monotonic_now(),
                    activity: ActivityState::Active,
                    recent_pulses: VecDeque::new(),
                    idle_transitions: 0,
                }),
                callbacks: Mutex::new(Callbacks::default()),
                next_subscription: AtomicU64::new(1),
                poller: PollerGate::default(),
            }),
        }
    }

    /// Current settings.
    pub fn settings(&self) -> MonitorSettings {
        *self.inner.settings.lock()
    }

    /// Replace the settings; the poller picks them up on its next tick.
    pub fn reconfigure(&self, settings: MonitorSettings) {
        *self.inner.settings.lock() = settings;
    }

    /// Record an activity pulse. Fires active callbacks on an Idle→Active edge.
    pub fn pulse(&self) {
        let window = self.inner.settings.lock().activity_window;
        let now = monotonic_now();
        let woke = {
            let mut state = self.inner.state.lock();
            state.last_active_at = now;
            state.recent_pulses.push_back(now);
            prune_pulses(&mut state.recent_pulses, now, window);
            let woke = state.activity == ActivityState::Idle;
            state.activity = ActivityState::Active;
            woke
        };
        if woke {
            tracing::debug!("activity resumed");
            self.fire(|c| &c.active);
        }
    }

    /// Check for idleness now. Fires idle callbacks on an Active→Idle edge.
    pub fn poll(&self) -> ActivityState {
        let threshold = self.inner.settings.lock().idle_threshold;
        let now = monotonic_now();
        let (state, went_idle) = {
            let mut state = self.inner.state.lock();
            let quiet = now.saturating_duration_since(state.last_active_at);
            if state.activity == ActivityState::Active && quiet >= threshold {
                state.activity = ActivityState::Idle;
                state.idle_transitions += 1;
                (ActivityState::Idle, true)
            } else {
                (state.activity, false)
            }
        };
        if went_idle {
            tracing::debug!(threshold_ms = %threshold.as_millis(), "consumer went idle");
            self.fire(|c| &c.idle);
        }
        state
    }

    /// Current state without polling.
    pub fn state(&self) -> ActivityState {
        self.inner.state.lock().activity
    }

    /// Instant of the last pulse (or of construction).
    pub fn last_active_at(&self) -> Instant {
        self.inner.state.lock().last_active_at
    }

    /// Number of Active→Idle edges observed so far.
    pub fn idle_transitions(&self) -> u64 {
        self.inner.state.lock().idle_transitions
    }

    /// Pulses seen within the activity window.
    #[allow(clippy::cast_precision_loss)]
    pub fn activity_level(&self) -> f64 {
        let window = self.inner.settings.lock().activity_window;
        let now = monotonic_now();
        let state = self.inner.state.lock();
        state
            .recent_pulses
            .iter()
            .filter(|at| now.saturating_duration_since(**at) <= window)
            .count() as f64
    }

    /// Register a callback fired on every Active→Idle edge.
    pub fn on_idle<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.inner.callbacks.lock().idle.push((id, Arc::new(callback)));
        id
    }

    /// Register a callback fired on every Idle→Active edge.
    pub fn on_active<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.inner.callbacks.lock().active.push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.inner.callbacks.lock();
        let before = callbacks.idle.len() + callbacks.active.len();
        callbacks.idle.retain(|(sub, _)| *sub != id);
        callbacks.active.retain(|(sub, _)| *sub != id);
        before != callbacks.idle.len() + callbacks.active.len()
    }

    /// Start the background poller. Returns `false` if one is already running.
    ///
    /// The poller holds only a weak reference and exits once every handle is
    /// dropped or [`ActivityMonitor::shutdown`] is called. Calling this again
    /// after a shutdown starts a fresh poller even if the old one is still
    /// sleeping.
    pub fn spawn_poller<S: Spawn>(&self, spawner: &S) -> bool {
        let Some(generation) = self.inner.poller.claim() else {
            return false;
        };
        let weak: Weak<MonitorInner> = Arc::downgrade(&self.inner);
        spawner.spawn(async move {
            loop {
                let Some(interval) = weak.upgrade().map(|inner| inner.settings.lock().poll_interval)
                else {
                    break;
                };
                tokio::time::sleep(interval).await;
                let Some(inner) = weak.upgrade() else { break };
                if !inner.poller.is_current(generation) {
                    break;
                }
                Self { inner }.poll();
            }
            tracing::debug!("activity poller stopped");
        });
        true
    }

    /// Stop the background poller. It exits at its next tick.
    pub fn shutdown(&self) {
        self.inner.poller.stop();
    }

    fn next_id(&self) -> SubscriptionId {
        self.inner.next_subscription.fetch_add(1, Ordering::Relaxed)
    }

    fn fire(&self, select: impl Fn(&Callbacks) -> &Vec<(SubscriptionId, Callback)>) {
        // Clone the list so callbacks can (un)subscribe or pulse re-entrantly.
        let callbacks: Vec<Callback> = {
            let guard = self.inner.callbacks.lock();
            select(&guard).iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for callback in callbacks {
            callback();
        }
    }
}

impl Default for ActivityMonitor {
    fn default() -> Self {
        Self::new(MonitorSettings::default())
    }
}

fn prune_pulses(pulses: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(front) = pulses.front() {
        if now.saturating_duration_since(*front) > window {
            pulses.pop_front();
        } else {
            break;
        }
    }
}
