//! Two-stage exact allocator (coverage first, then proportional surplus).
//!
//! # Algorithm
//!
//! **Stage 1 (selection).** 0/1 knapsack with value 1 per subject,
//! weight = minimum time in whole blocks, capacity = budget in whole
//! blocks. A suffix table `best[i][c]` holds the best `(count, weight)`
//! achievable with subjects `i..n` in `c` blocks, ordered by
//! maximum count, then minimum weight. Subjects are visited in ascending
//! ID order and the reconstruction includes a subject whenever doing so
//! stays optimal, which yields the lexicographically smallest ID set among
//! the optimal ones.
//!
//! **Stage 2 (distribution).** `x_i = min_i + leftover * priority_i / Σ priority`
//! over the selected subjects; everyone else gets 0.
//!
//! # Complexity
//! O(n * C) time and memory, where C = min(budget blocks, Σ minimum blocks).
//! Both C and the table size (n+1)(C+1) are capped.
//!
//! # Reference
//! Kellerer, Pferschy & Pisinger (2004), "Knapsack Problems", Ch. 2.3

use tracing::debug;

use super::{AllocationOutcome, Allocator, ContinuousAllocation};
use crate::engine::EngineState;
use crate::error::{AllocationError, Result};
use crate::models::{Diagnostic, DiagnosticKind, ScheduleRequest};
use crate::config::DEFAULT_MAX_TABLE_CELLS;
use crate::quantize::{units_ceil, units_floor};

/// Best (count, weight) for a knapsack sub-problem.
type Cell = (usize, usize);

/// Coverage-maximizing allocator (Mode A).
#[derive(Debug, Clone, Copy)]
pub struct ExactAllocator {
    max_capacity_units: usize,
    max_table_cells: usize,
}

impl ExactAllocator {
    /// Creates an allocator whose knapsack table may span at most
    /// `max_capacity_units` blocks.
    pub fn new(max_capacity_units: usize) -> Self {
        Self {
            max_capacity_units,
            max_table_cells: DEFAULT_MAX_TABLE_CELLS,
        }
    }

    /// Caps the knapsack table at `cells` entries.
    pub fn with_max_table_cells(mut self, cells: usize) -> Self {
        self.max_table_cells = cells;
        self
    }

    /// Selects the subjects to include (Stage 1).
    ///
    /// Returns a flag per subject, index-aligned with `request.subjects`.
    pub fn select(&self, request: &ScheduleRequest, granularity: f64) -> Result<Vec<bool>> {
        let n = request.subjects.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| request.subjects[a].id.cmp(&request.subjects[b].id));
        let weights: Vec<usize> = order
            .iter()
            .map(|&i| units_ceil(request.subjects[i].min_time, granularity))
            .collect();

        let total_weight = weights
            .iter()
            .fold(0usize, |acc, &w| acc.saturating_add(w));
        let capacity = units_floor(request.total_hours, granularity).min(total_weight);
        if capacity > self.max_capacity_units {
            return Err(AllocationError::computation(
                EngineState::Allocating,
                format!(
                    "knapsack capacity of {} blocks exceeds the limit of {} blocks",
                    capacity, self.max_capacity_units
                ),
            ));
        }

        let cells = (n + 1).checked_mul(capacity + 1);
        if cells.map_or(true, |cells| cells > self.max_table_cells) {
            return Err(AllocationError::computation(
                EngineState::Allocating,
                format!(
                    "knapsack table for {} subjects and {} blocks exceeds the limit of {} cells",
                    n, capacity, self.max_table_cells
                ),
            ));
        }

        let mut best: Vec<Vec<Cell>> = vec![vec![(0, 0); capacity + 1]; n + 1];
        for k in (0..n).rev() {
            let w = weights[k];
            for c in 0..=capacity {
                let skip = best[k + 1][c];
                best[k][c] = if w <= c {
                    let (count, weight) = best[k + 1][c - w];
                    better(skip, (count + 1, weight + w))
                } else {
                    skip
                };
            }
        }

        let mut selected = vec![false; n];
        let mut c = capacity;
        for k in 0..n {
            let w = weights[k];
            if w <= c {
                let (count, weight) = best[k + 1][c - w];
                if (count + 1, weight + w) == best[k][c] {
                    selected[order[k]] = true;
                    c -= w;
                }
            }
        }

        debug!(
            selected = best[0][capacity].0,
            consumed_blocks = best[0][capacity].1,
            capacity_blocks = capacity,
            "knapsack selection done"
        );
        Ok(selected)
    }
}

impl Allocator for ExactAllocator {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn allocate(&self, request: &ScheduleRequest, granularity: f64) -> Result<AllocationOutcome> {
        let selected = self.select(request, granularity)?;
        let subjects = &request.subjects;

        let selected_min: f64 = subjects
            .iter()
            .zip(&selected)
            .filter(|(_, sel)| **sel)
            .map(|(s, _)| s.min_time)
            .sum();
        let priority_sum: f64 = subjects
            .iter()
            .zip(&selected)
            .filter(|(_, sel)| **sel)
            .map(|(s, _)| s.priority as f64)
            .sum();
        let leftover = (request.total_hours - selected_min).max(0.0);

        let hours = subjects
            .iter()
            .zip(&selected)
            .map(|(s, &sel)| {
                if sel && priority_sum > 0.0 {
                    s.min_time + leftover * (s.priority as f64 / priority_sum)
                } else {
                    0.0
                }
            })
            .collect();

        let mut diagnostics = Vec::new();
        if !subjects.is_empty() && !selected.iter().any(|&s| s) {
            let cheapest = subjects
                .iter()
                .map(|s| s.min_time)
                .fold(f64::INFINITY, f64::min);
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::NoSubjectFits,
                format!(
                    "No subject fits into {} hours; the cheapest needs {} hours",
                    request.total_hours, cheapest
                ),
            ));
        }
        for (s, _) in subjects.iter().zip(&selected).filter(|(_, sel)| !**sel) {
            diagnostics.push(Diagnostic::for_subject(
                DiagnosticKind::Excluded,
                &s.id,
                format!(
                    "Subject '{}' (minimum {} hours) left out to maximize coverage",
                    s.id, s.min_time
                ),
            ));
        }

        Ok(AllocationOutcome::Distributed(ContinuousAllocation {
            hours,
            included: selected,
            diagnostics,
        }))
    }
}

/// Higher count wins; on equal count, lower weight wins.
fn better(a: Cell, b: Cell) -> Cell {
    if b.0 > a.0 || (b.0 == a.0 && b.1 < a.1) {
        b
    } else {
        a
    }
}
