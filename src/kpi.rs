//! Allocation quality metrics (KPIs).
//!
//! Computes plan-level indicators from a request and its result, so
//! callers can compare strategies on the same input.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Coverage | Included subjects / all subjects |
//! | Utilization | Allocated hours / budget |
//! | Unallocated Hours | Budget − allocated hours |
//! | Surplus | Allocated − minimum, per included subject |
//! | Priority-Weighted Hours | Σ priority·hours / Σ priority |

use std::collections::BTreeMap;

use crate::models::{ScheduleRequest, ScheduleResult};

/// Allocation performance indicators.
///
/// All time values are in hours.
#[derive(Debug, Clone)]
pub struct AllocationKpi {
    /// Fraction of subjects included (0.0..1.0).
    pub coverage: f64,
    /// Fraction of the budget allocated (0.0..1.0).
    pub utilization: f64,
    /// Budget left unassigned (hours).
    pub unallocated_hours: f64,
    /// Hours above the minimum, per included subject.
    pub surplus_by_subject: BTreeMap<String, f64>,
    /// Priority-weighted mean of allocated hours.
    pub priority_weighted_hours: f64,
}

impl AllocationKpi {
    /// Computes KPIs from a request and its result.
    ///
    /// An infeasible result counts as zero coverage and zero utilization.
    pub fn calculate(request: &ScheduleRequest, result: &ScheduleResult) -> Self {
        let allocated = result.total_allocated();

        let coverage = if request.subjects.is_empty() {
            1.0
        } else {
            result.included.len() as f64 / request.subjects.len() as f64
        };

        // Nothing to use → fully used
        let utilization = if request.total_hours <= 0.0 {
            1.0
        } else {
            allocated / request.total_hours
        };

        let mut surplus_by_subject = BTreeMap::new();
        let mut weighted = 0.0;
        let mut priority_sum = 0.0;
        for subject in &request.subjects {
            let hours = result.allocated(&subject.id);
            if result.is_included(&subject.id) {
                surplus_by_subject.insert(subject.id.clone(), hours - subject.min_time);
            }
            weighted += subject.priority as f64 * hours;
            priority_sum += subject.priority as f64;
        }

        let priority_weighted_hours = if priority_sum > 0.0 {
            weighted / priority_sum
        } else {
            0.0
        };

        Self {
            coverage,
            utilization,
            unallocated_hours: (request.total_hours - allocated).max(0.0),
            surplus_by_subject,
            priority_weighted_hours,
        }
    }

    /// Whether the plan meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_coverage: f64, min_utilization: f64) -> bool {
        self.coverage >= min_coverage && self.utilization >= min_utilization
    }
}
