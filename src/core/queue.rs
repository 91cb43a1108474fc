//! Ready queue with priority ordering and FIFO tie-break.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::core::task::TaskId;
use crate::util::clock::{monotonic_now, Instant};

/// A task waiting for a concurrency slot.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    /// Task identifier.
    pub task_id: TaskId,
    /// Score computed at enqueue time.
    pub priority: f64,
    /// Monotonic enqueue counter; lower wins among equal priorities.
    pub sequence: u64,
    /// When the entry was enqueued.
    pub enqueued_at: Instant,
}

/// Wrapper to make entries orderable by priority (highest first) and FIFO within priority.
struct Ranked(QueueEntry);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first; earlier sequence wins ties (reversed for max-heap)
        match self.0.priority.total_cmp(&other.0.priority) {
            Ordering::Equal => other.0.sequence.cmp(&self.0.sequence),
            ord => ord,
        }
    }
}

/// Pending task references ordered for dispatch.
///
/// Holds at most one entry per task. Extraction is gated by the caller's
/// concurrency budget through [`ReadyQueue::pop_ready`].
#[derive(Default)]
pub struct ReadyQueue {
    heap: BinaryHeap<Ranked>,
    members: HashSet<TaskId>,
    next_sequence: u64,
}

impl ReadyQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a task. Returns `None` if the task already has an entry.
    pub fn push(&mut self, task_id: TaskId, priority: f64) -> Option<QueueEntry> {
        if self.members.contains(&task_id) {
            return None;
        }
        let entry = QueueEntry {
            task_id: task_id.clone(),
            priority,
            sequence: self.next_sequence,
            enqueued_at: monotonic_now(),
        };
        self.next_sequence += 1;
        self.members.insert(task_id);
        self.heap.push(Ranked(entry.clone()));
        Some(entry)
    }

    /// Remove and return the highest-ranked entry.
    pub fn pop(&mut self) -> Option<QueueEntry> {
        let Ranked(entry) = self.heap.pop()?;
        self.members.remove(&entry.task_id);
        Some(entry)
    }

    /// Pop only while `active < budget`.
    pub fn pop_ready(&mut self, active: usize, budget: usize) -> Option<QueueEntry> {
        if active >= budget {
            return None;
        }
        self.pop()
    }

    /// Remove a task's entry. Returns whether one was present.
    pub fn remove(&mut self, task_id: &str) -> bool {
        if !self.members.remove(task_id) {
            return false;
        }
        self.heap.retain(|ranked| ranked.0.task_id != task_id);
        true
    }

    /// Whether the task has an entry.
    pub fn contains(&self, task_id: &str) -> bool {
        self.members.contains(task_id)
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Entries in dispatch order.
    pub fn snapshot(&self) -> Vec<QueueEntry> {
        let mut ranked: Vec<&Ranked> = self.heap.iter().collect();
        ranked.sort_by(|a, b| b.cmp(a));
        ranked.into_iter().map(|r| r.0.clone()).collect()
    }
}
