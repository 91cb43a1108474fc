//! Priority scoring for ready-queue ordering.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::task::TaskDeclaration;
use crate::util::serde::duration_ms;

/// Reference values the score is normalised against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Cost at which the time factor reaches zero.
    #[serde(with = "duration_ms")]
    pub reference_cost: Duration,
    /// Activity level at which the activity factor saturates.
    pub reference_activity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            reference_cost: Duration::from_millis(1000),
            reference_activity: 10.0,
        }
    }
}

/// Pure scorer: `(declaration, activity level) -> priority`.
///
/// `base * max(0, 1 - cost / reference_cost) * (1 + min(1, activity / reference_activity))`
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityScorer {
    weights: ScoringWeights,
}

impl PriorityScorer {
    /// Scorer with explicit reference values.
    pub const fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Reference values in use.
    pub const fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Score a declaration for the given consumer activity level.
    pub fn score(&self, declaration: &TaskDeclaration, activity_level: f64) -> f64 {
        let base = declaration.importance.base_weight();
        base * self.time_factor(declaration.estimated_cost)
            * (1.0 + self.activity_factor(activity_level))
    }

    fn time_factor(&self, cost: Duration) -> f64 {
        let reference = self.weights.reference_cost.as_secs_f64();
        if reference <= 0.0 {
            return 0.0;
        }
        (1.0 - cost.as_secs_f64() / reference).max(0.0)
    }

    fn activity_factor(&self, activity_level: f64) -> f64 {
        let reference = self.weights.reference_activity;
        if reference <= 0.0 || !activity_level.is_finite() || activity_level <= 0.0 {
            return 0.0;
        }
        (activity_level / reference).min(1.0)
    }
}
