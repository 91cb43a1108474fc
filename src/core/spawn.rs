//! Runtime spawning abstraction.

use std::future::Future;

use parking_lot::Mutex;

/// Abstraction for spawning background work on a runtime.
///
/// The scheduler spawns loader invocations, retry timers and pollers through
/// this trait; it never blocks on them.
pub trait Spawn {
    /// Spawn a future that runs to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Ownership token for a restartable background poller.
///
/// A loop claims a generation when it is spawned and keeps running only while
/// that generation is current. Stopping retires the generation immediately,
/// so a restart never depends on the old loop having woken up first.
#[derive(Debug, Default)]
pub(crate) struct PollerGate {
    state: Mutex<GateState>,
}

#[derive(Debug, Default)]
struct GateState {
    running: bool,
    generation: u64,
}

impl PollerGate {
    /// Claim a new generation, or `None` if a poller is already running.
    pub(crate) fn claim(&self) -> Option<u64> {
        let mut state = self.state.lock();
        if state.running {
            return None;
        }
        state.running = true;
        state.generation = state.generation.wrapping_add(1);
        Some(state.generation)
    }

    /// Retire the running poller, if any.
    pub(crate) fn stop(&self) {
        let mut state = self.state.lock();
        state.running = false;
        state.generation = state.generation.wrapping_add(1);
    }

    /// Whether the loop holding `generation` should keep going.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        let state = self.state.lock();
        state.running && state.generation == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_claim_until_stopped() {
        let gate = PollerGate::default();
        let first = gate.claim().unwrap();
        assert!(gate.claim().is_none());
        assert!(gate.is_current(first));

        gate.stop();
        assert!(!gate.is_current(first));

        let second = gate.claim().unwrap();
        assert_ne!(first, second);
        assert!(gate.is_current(second));
        assert!(!gate.is_current(first));
    }
}
