//! Read-only summary statistics over a registry snapshot.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::task::{TaskState, TaskStatus};
use crate::util::serde::duration_ms;

/// Point-in-time scheduler statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Registered tasks.
    pub total_components: usize,
    /// Tasks in `Loaded`.
    pub loaded_components: usize,
    /// Tasks in `Failed`.
    pub failed_components: usize,
    /// Tasks in `Pending`.
    pub pending_components: usize,
    /// Tasks in `Queued`.
    pub queued_components: usize,
    /// Tasks in `Loading`.
    pub loading_components: usize,
    /// Tasks in `Cancelled`.
    pub cancelled_components: usize,
    /// Mean attempt duration over loaded tasks; zero when none loaded.
    #[serde(with = "duration_ms")]
    pub average_load_time: Duration,
    /// `failed / total`; zero when nothing is registered.
    pub error_rate: f64,
    /// Entries in the ready queue.
    pub queue_depth: usize,
    /// Loader invocations in flight.
    pub active_loads: usize,
}

/// Derives [`MetricsSnapshot`]s.
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Aggregate a snapshot of task states.
    #[allow(clippy::cast_precision_loss)]
    pub fn compute<'a, I>(states: I, queue_depth: usize, active_loads: usize) -> MetricsSnapshot
    where
        I: IntoIterator<Item = &'a TaskState>,
    {
        let mut snapshot = MetricsSnapshot {
            queue_depth,
            active_loads,
            ..MetricsSnapshot::default()
        };
        let mut load_time_total = Duration::ZERO;
        let mut timed_loads: u32 = 0;

        for state in states {
            snapshot.total_components += 1;
            match state.status {
                TaskStatus::Pending => snapshot.pending_components += 1,
                TaskStatus::Queued => snapshot.queued_components += 1,
                TaskStatus::Loading => snapshot.loading_components += 1,
                TaskStatus::Cancelled => snapshot.cancelled_components += 1,
                TaskStatus::Failed => snapshot.failed_components += 1,
                TaskStatus::Loaded => {
                    snapshot.loaded_components += 1;
                    if let Some(d) = state.actual_duration() {
                        load_time_total += d;
                        timed_loads += 1;
                    }
                }
            }
        }

        if timed_loads > 0 {
            snapshot.average_load_time = load_time_total / timed_loads;
        }
        if snapshot.total_components > 0 {
            snapshot.error_rate =
                snapshot.failed_components as f64 / snapshot.total_components as f64;
        }
        snapshot
    }
}
