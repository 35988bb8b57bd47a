//! Priority/difficulty trade-off allocator (Mode C).
//!
//! # Algorithm
//!
//! 1. Min-max scale priority and difficulty separately into `[0, 1]`
//!    (unrated difficulty counts as 0; a constant column scales to 0).
//! 2. Score `s_i = λ p̃_i + (1 - λ) d̃_i`.
//! 3. Weights `w = softmax(β s)`. Large β concentrates the surplus on the
//!    top scores; β → 0 approaches an even split.
//! 4. `x_i = min_i + leftover * w_i`.

use tracing::debug;

use super::weights::{min_max_normalize, softmax};
use super::{check_full_inclusion, distribute_surplus, AllocationOutcome, Allocator};
use crate::error::Result;
use crate::models::{ModeParams, ScheduleRequest};

/// Combined-score softmax allocator.
#[derive(Debug, Clone, Copy)]
pub struct ParetoAllocator {
    params: ModeParams,
}

impl ParetoAllocator {
    /// Creates an allocator with the given λ/β.
    pub fn new(params: ModeParams) -> Self {
        Self { params }
    }

    /// Combined score per subject, before the temperature is applied.
    pub fn scores(&self, request: &ScheduleRequest) -> Vec<f64> {
        let priorities: Vec<Option<f64>> = request
            .subjects
            .iter()
            .map(|s| Some(s.priority as f64))
            .collect();
        let difficulties: Vec<Option<f64>> = request
            .subjects
            .iter()
            .map(|s| s.difficulty_level())
            .collect();

        let p = min_max_normalize(&priorities);
        let d = min_max_normalize(&difficulties);
        let lambda = self.params.lambda;

        p.iter()
            .zip(&d)
            .map(|(p, d)| lambda * p + (1.0 - lambda) * d)
            .collect()
    }
}

impl Default for ParetoAllocator {
    fn default() -> Self {
        Self::new(ModeParams::default())
    }
}

impl Allocator for ParetoAllocator {
    fn name(&self) -> &'static str {
        "pareto"
    }

    fn allocate(&self, request: &ScheduleRequest, granularity: f64) -> Result<AllocationOutcome> {
        if let Some(infeasible) = check_full_inclusion(request, granularity)? {
            return Ok(infeasible);
        }

        let beta = self.params.beta;
        let tempered: Vec<f64> = self.scores(request).iter().map(|s| beta * s).collect();
        let weights = softmax(&tempered);
        debug!(lambda = self.params.lambda, beta, ?weights, "pareto weights");

        Ok(AllocationOutcome::Distributed(distribute_surplus(
            request, &weights,
        )))
    }
}
