//! Softmax-over-priority allocator (Mode B).
//!
//! Every subject is kept. After minimums are covered, the surplus is split
//! by `softmax(priority)`, so each priority step multiplies a subject's
//! share of the surplus by `e`. Single pass, O(n).

use tracing::debug;

use super::weights::softmax;
use super::{check_full_inclusion, distribute_surplus, AllocationOutcome, Allocator};
use crate::error::Result;
use crate::models::ScheduleRequest;

/// Full-inclusion softmax allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyAllocator;

impl Allocator for EntropyAllocator {
    fn name(&self) -> &'static str {
        "entropy"
    }

    fn allocate(&self, request: &ScheduleRequest, granularity: f64) -> Result<AllocationOutcome> {
        if let Some(infeasible) = check_full_inclusion(request, granularity)? {
            return Ok(infeasible);
        }

        let scores: Vec<f64> = request.subjects.iter().map(|s| s.priority as f64).collect();
        let weights = softmax(&scores);
        debug!(?weights, "entropy weights");

        Ok(AllocationOutcome::Distributed(distribute_surplus(
            request, &weights,
        )))
    }
}
