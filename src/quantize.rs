//! Block quantization of continuous allocations.
//!
//! Study time is handed out in whole blocks (half an hour by default).
//! The quantizer turns continuous hours into block counts while keeping
//! every included subject at or above its minimum and the total within
//! the budget.
//!
//! # Algorithm (largest remainder)
//!
//! 1. Round each minimum up to whole blocks.
//! 2. Round each allocation down to whole blocks, but never below its
//!    rounded minimum.
//! 3. Hand out the blocks lost to rounding one at a time, largest
//!    fractional remainder first (ties by subject ID), while the budget
//!    still has whole blocks left.
//!
//! # Reference
//! Balinski & Young (2001), "Fair Representation", Ch. 2 (Hamilton's method)

use crate::allocators::ContinuousAllocation;
use crate::engine::EngineState;
use crate::error::{AllocationError, Result};
use crate::models::{Diagnostic, DiagnosticKind, Subject};

/// Default block length in hours.
pub const DEFAULT_GRANULARITY_HOURS: f64 = 0.5;

/// Tolerance absorbing float noise before rounding to whole blocks.
const UNIT_EPSILON: f64 = 1e-9;

/// Number of whole blocks needed to cover `hours` (rounded up).
pub(crate) fn units_ceil(hours: f64, granularity: f64) -> usize {
    ((hours / granularity) - UNIT_EPSILON).ceil().max(0.0) as usize
}

/// Number of whole blocks that fit into `hours` (rounded down).
pub(crate) fn units_floor(hours: f64, granularity: f64) -> usize {
    ((hours / granularity) + UNIT_EPSILON).floor().max(0.0) as usize
}

/// Sums block counts, or `None` if the total does not fit in `usize`.
pub(crate) fn checked_units_sum<I: IntoIterator<Item = usize>>(units: I) -> Option<usize> {
    units.into_iter().try_fold(0usize, |acc, u| acc.checked_add(u))
}

/// Remainder bucketed to `UNIT_EPSILON`, so float noise compares equal.
fn remainder_key(remainder: f64) -> u64 {
    (remainder / UNIT_EPSILON).round() as u64
}

/// Rounds hours for reporting, dropping float noise.
pub(crate) fn round_hours(hours: f64) -> f64 {
    (hours * 1e6).round() / 1e6
}

/// Block allocation per subject, index-aligned with the request.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedAllocation {
    /// Allocated hours (multiples of the granularity).
    pub hours: Vec<f64>,
    /// Notes raised while quantizing.
    pub diagnostics: Vec<Diagnostic>,
}

/// Rounds continuous allocations to whole blocks.
#[derive(Debug, Clone, Copy)]
pub struct BlockQuantizer {
    granularity: f64,
}

impl BlockQuantizer {
    /// Creates a quantizer for the given block length (hours).
    pub fn new(granularity: f64) -> Self {
        Self { granularity }
    }

    /// Block length in hours.
    pub fn granularity(&self) -> f64 {
        self.granularity
    }

    /// Quantizes an allocation against a budget of `total_hours`.
    ///
    /// Excluded subjects stay at zero. Fails only if the rounded minimums
    /// alone overflow the budget, which the allocators rule out upstream.
    pub fn quantize(
        &self,
        subjects: &[Subject],
        allocation: &ContinuousAllocation,
        total_hours: f64,
    ) -> Result<QuantizedAllocation> {
        let g = self.granularity;
        let capacity = units_floor(total_hours, g);
        let n = subjects.len();

        let mut units = vec![0usize; n];
        let mut remainders = vec![0.0f64; n];
        let mut continuous_total = 0.0;

        for i in 0..n {
            if !allocation.included[i] {
                continue;
            }
            let x = allocation.hours[i];
            continuous_total += x;

            let scaled = x / g;
            let down = units_floor(x, g);
            let floor = down.max(units_ceil(subjects[i].min_time, g));
            units[i] = floor;
            remainders[i] = (scaled - floor as f64).max(0.0);
        }

        let placed = checked_units_sum(units.iter().copied()).ok_or_else(|| {
            AllocationError::computation(
                EngineState::Quantizing,
                "block count of the allocation overflows",
            )
        })?;
        if placed > capacity {
            return Err(AllocationError::computation(
                EngineState::Quantizing,
                format!(
                    "rounded minimums need {} blocks but the budget holds {}",
                    placed, capacity
                ),
            ));
        }

        let to_place = (capacity - placed).min(
            units_floor(continuous_total, g).saturating_sub(placed),
        );

        let keys: Vec<u64> = remainders.iter().map(|&r| remainder_key(r)).collect();
        let mut order: Vec<usize> = (0..n).filter(|&i| allocation.included[i]).collect();
        order.sort_by(|&a, &b| {
            keys[b]
                .cmp(&keys[a])
                .then_with(|| subjects[a].id.cmp(&subjects[b].id))
        });
        for &i in order.iter().cycle().take(to_place) {
            units[i] += 1;
        }

        let hours: Vec<f64> = units.iter().map(|&u| u as f64 * g).collect();

        let mut diagnostics = Vec::new();
        let unplaced = round_hours(total_hours - hours.iter().sum::<f64>());
        if !order.is_empty() && unplaced > 0.0 {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::Underutilized,
                format!(
                    "{} hours of the budget could not be placed in whole {}-hour blocks",
                    unplaced, g
                ),
            ));
        }

        Ok(QuantizedAllocation { hours, diagnostics })
    }
}

impl Default for BlockQuantizer {
    fn default() -> Self {
        Self::new(DEFAULT_GRANULARITY_HOURS)
    }
}
