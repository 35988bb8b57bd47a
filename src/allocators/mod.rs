//! Allocation strategies.
//!
//! Each strategy turns a validated request into continuous per-subject
//! hours. Strategies share one output contract but differ in inclusion
//! semantics: [`ExactAllocator`] may drop subjects to maximize coverage,
//! while [`EntropyAllocator`] and [`ParetoAllocator`] always keep every
//! subject and refuse budgets that cannot cover all minimums.
//!
//! # Surplus distribution
//!
//! All three strategies give every included subject its minimum and then
//! split the remaining budget by a weight vector summing to 1:
//!
//! `x_i = min_time_i + leftover * w_i`
//!
//! | Strategy | Weights `w_i` |
//! |----------|---------------|
//! | Exact | `priority_i / Σ priority` over selected subjects |
//! | Entropy | `softmax(priority)` |
//! | Pareto | `softmax(β * (λ p̃_i + (1-λ) d̃_i))` |

mod entropy;
mod exact;
mod pareto;
pub mod weights;

pub use entropy::EntropyAllocator;
pub use exact::ExactAllocator;
pub use pareto::ParetoAllocator;

use std::fmt::Debug;

use crate::engine::EngineState;
use crate::error::{AllocationError, Result};
use crate::models::{Diagnostic, DiagnosticKind, ScheduleRequest};
use crate::quantize::{checked_units_sum, round_hours, units_ceil, units_floor};

/// Continuous (pre-quantization) allocation, index-aligned with the
/// request's subjects.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousAllocation {
    /// Hours per subject (0 for excluded subjects).
    pub hours: Vec<f64>,
    /// Whether each subject is part of the plan.
    pub included: Vec<bool>,
    /// Notes raised by the strategy.
    pub diagnostics: Vec<Diagnostic>,
}

/// What a strategy produced for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum AllocationOutcome {
    /// Hours were distributed.
    Distributed(ContinuousAllocation),
    /// The budget cannot cover the minimums the strategy requires.
    Infeasible {
        shortfall_hours: f64,
        diagnostics: Vec<Diagnostic>,
    },
}

/// A study-time allocation strategy.
///
/// Implementations are stateless and pure: the same request always yields
/// the same outcome.
pub trait Allocator: Send + Sync + Debug {
    /// Strategy name (e.g., "exact").
    fn name(&self) -> &'static str;

    /// Distributes the request's budget over its subjects.
    ///
    /// `granularity` is the block length (hours) the result will later be
    /// quantized to; strategies use it to reason about whole blocks.
    fn allocate(&self, request: &ScheduleRequest, granularity: f64) -> Result<AllocationOutcome>;
}

/// Checks that every subject's minimum fits, in whole blocks.
///
/// Returns the infeasible outcome when it does not: a shortfall note plus
/// one note per subject with a positive minimum. Fails if the minimums
/// add up to more blocks than `usize` can count.
pub(crate) fn check_full_inclusion(
    request: &ScheduleRequest,
    granularity: f64,
) -> Result<Option<AllocationOutcome>> {
    let needed = checked_units_sum(
        request
            .subjects
            .iter()
            .map(|s| units_ceil(s.min_time, granularity)),
    )
    .ok_or_else(|| {
        AllocationError::computation(
            EngineState::Allocating,
            "minimum study times are too large to count in blocks",
        )
    })?;
    let capacity = units_floor(request.total_hours, granularity);
    if needed <= capacity {
        return Ok(None);
    }

    let shortfall_hours = round_hours(needed as f64 * granularity - request.total_hours);
    let mut diagnostics = vec![Diagnostic::new(
        DiagnosticKind::BudgetShortfall,
        format!(
            "Minimum study times need {} hours but only {} are available (short by {} hours)",
            round_hours(needed as f64 * granularity),
            request.total_hours,
            shortfall_hours
        ),
    )];
    for subject in request.subjects.iter().filter(|s| s.min_time > 0.0) {
        diagnostics.push(Diagnostic::for_subject(
            DiagnosticKind::ShortfallContributor,
            &subject.id,
            format!(
                "Subject '{}' requires at least {} hours",
                subject.id, subject.min_time
            ),
        ));
    }

    Ok(Some(AllocationOutcome::Infeasible {
        shortfall_hours,
        diagnostics,
    }))
}

/// Gives every subject its minimum plus a weighted share of the surplus.
pub(crate) fn distribute_surplus(request: &ScheduleRequest, weights: &[f64]) -> ContinuousAllocation {
    let leftover = (request.total_hours - request.total_min_time()).max(0.0);
    let hours = request
        .subjects
        .iter()
        .zip(weights)
        .map(|(s, w)| s.min_time + leftover * w)
        .collect();

    ContinuousAllocation {
        hours,
        included: vec![true; request.subjects.len()],
        diagnostics: Vec::new(),
    }
}
