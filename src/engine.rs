//! Schedule engine: validation → allocation → quantization.
//!
//! The engine is the only entry point callers need. Each call runs once,
//! synchronously, through a fixed sequence of states:
//!
//! ```text
//! Validating → Allocating → Quantizing → Done
//!      └────────────┴────────────┴──────→ Failed
//! ```
//!
//! `Done` carries a [`ScheduleResult`]; `Failed` carries an
//! [`AllocationError`] and never a partial result. The engine holds only
//! its configuration, so one instance can serve any number of threads.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::allocators::{
    AllocationOutcome, Allocator, EntropyAllocator, ExactAllocator, ParetoAllocator,
};
use crate::config::EngineConfig;
use crate::error::{AllocationError, Result};
use crate::models::{AllocationMode, ScheduleRequest, ScheduleResult};
use crate::quantize::{units_floor, BlockQuantizer};
use crate::validation::validate_request;

/// Lifecycle state of one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    Validating,
    Allocating,
    Quantizing,
    /// Terminal: a result was produced.
    Done,
    /// Terminal: an error was returned.
    Failed,
}

impl EngineState {
    /// Whether no further transition follows.
    pub fn is_terminal(self) -> bool {
        matches!(self, EngineState::Done | EngineState::Failed)
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EngineState::Validating => "validating",
            EngineState::Allocating => "allocating",
            EngineState::Quantizing => "quantizing",
            EngineState::Done => "done",
            EngineState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Study-time allocation engine.
///
/// # Example
///
/// ```
/// use u_study::engine::ScheduleEngine;
/// use u_study::models::{ScheduleRequest, Subject};
///
/// let request = ScheduleRequest::new(
///     vec![Subject::new("A", 3, 2.0), Subject::new("B", 5, 1.0)],
///     4.0,
/// );
///
/// let result = ScheduleEngine::default().allocate(&request).unwrap();
/// assert!(result.feasible);
/// assert_eq!(result.allocated("A"), 2.5);
/// assert_eq!(result.allocated("B"), 1.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScheduleEngine {
    config: EngineConfig,
}

impl ScheduleEngine {
    /// Creates an engine. The configuration is checked on every call.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Creates an engine, rejecting an unusable configuration up front.
    pub fn try_new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Allocates study time for a request.
    ///
    /// # Returns
    /// - `Ok(result)` with `feasible = true` and per-subject hours, or
    ///   `feasible = false` (Entropy/Pareto only) when the budget cannot
    ///   cover every minimum.
    /// - `Err(InvalidInput)` for malformed requests.
    /// - `Err(ComputationError)` when the request cannot be computed.
    pub fn allocate(&self, request: &ScheduleRequest) -> Result<ScheduleResult> {
        let outcome = self.run(request);
        match &outcome {
            Ok(result) => {
                enter(EngineState::Done);
                info!(
                    mode = %request.mode,
                    feasible = result.feasible,
                    included = result.included.len(),
                    allocated_hours = result.total_allocated(),
                    "allocation finished"
                );
            }
            Err(e) => {
                enter(EngineState::Failed);
                warn!(mode = %request.mode, error = %e, "allocation failed");
            }
        }
        outcome
    }

    fn run(&self, request: &ScheduleRequest) -> Result<ScheduleResult> {
        enter(EngineState::Validating);
        debug!(
            mode = %request.mode,
            subjects = request.subjects.len(),
            total_hours = request.total_hours,
            "validating request"
        );
        self.config.validate()?;
        validate_request(request).map_err(AllocationError::invalid_input)?;

        if request.subjects.is_empty() {
            return Ok(ScheduleResult::empty(request.mode, request.total_hours));
        }

        enter(EngineState::Allocating);
        let granularity = self.config.granularity_hours;
        let budget_units = units_floor(request.total_hours, granularity);
        if budget_units > self.config.max_budget_units {
            return Err(AllocationError::computation(
                EngineState::Allocating,
                format!(
                    "budget of {} hours exceeds the limit of {} blocks",
                    request.total_hours, self.config.max_budget_units
                ),
            ));
        }

        let outcome = match request.mode {
            AllocationMode::Exact => {
                let exact = ExactAllocator::new(self.config.max_capacity_units)
                    .with_max_table_cells(self.config.max_table_cells);
                run_strategy(&exact, request, granularity)
            }
            AllocationMode::Entropy => run_strategy(&EntropyAllocator, request, granularity),
            AllocationMode::Pareto => {
                run_strategy(&ParetoAllocator::new(request.params), request, granularity)
            }
        }?;

        let allocation = match outcome {
            AllocationOutcome::Distributed(allocation) => allocation,
            AllocationOutcome::Infeasible {
                shortfall_hours,
                diagnostics,
            } => {
                info!(shortfall_hours, "minimum study times exceed the budget");
                return Ok(ScheduleResult::infeasible(
                    request.mode,
                    request.total_hours,
                    shortfall_hours,
                    diagnostics,
                ));
            }
        };
        if let Some(bad) = allocation.hours.iter().find(|h| !h.is_finite()) {
            return Err(AllocationError::computation(
                EngineState::Allocating,
                format!("strategy produced a non-finite allocation ({bad})"),
            ));
        }

        enter(EngineState::Quantizing);
        let quantized = BlockQuantizer::new(granularity).quantize(
            &request.subjects,
            &allocation,
            request.total_hours,
        )?;

        let mut allocations = BTreeMap::new();
        let mut included = BTreeSet::new();
        for (i, subject) in request.subjects.iter().enumerate() {
            allocations.insert(subject.id.clone(), quantized.hours[i]);
            if allocation.included[i] {
                included.insert(subject.id.clone());
            }
        }

        let mut diagnostics = allocation.diagnostics;
        diagnostics.extend(quantized.diagnostics);

        Ok(ScheduleResult {
            allocations,
            included,
            diagnostics,
            ..ScheduleResult::empty(request.mode, request.total_hours)
        })
    }
}

fn run_strategy<A: Allocator>(
    allocator: &A,
    request: &ScheduleRequest,
    granularity: f64,
) -> Result<AllocationOutcome> {
    debug!(strategy = allocator.name(), "dispatching");
    allocator.allocate(request, granularity)
}

fn enter(state: EngineState) {
    debug!(%state, terminal = state.is_terminal(), "engine state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, DiagnosticKind, ModeParams, Subject};
    use crate::quantize::{units_ceil, units_floor};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn engine() -> ScheduleEngine {
        ScheduleEngine::default()
    }

    fn two_subjects(total_hours: f64) -> ScheduleRequest {
        ScheduleRequest::new(
            vec![Subject::new("A", 3, 2.0), Subject::new("B", 5, 1.0)],
            total_hours,
        )
    }

    // ======================== Scenarios ========================

    #[test]
    fn test_exact_both_fit() {
        let r = engine().allocate(&two_subjects(4.0)).unwrap();
        assert!(r.feasible);
        assert_eq!(r.allocated("A"), 2.5);
        assert_eq!(r.allocated("B"), 1.5);
        assert_eq!(r.total_allocated(), 4.0);
        assert_eq!(r.included.len(), 2);
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn test_exact_only_cheaper_fits() {
        let r = engine().allocate(&two_subjects(2.5)).unwrap();
        assert!(r.feasible);
        assert!(!r.is_included("A"));
        assert!(r.is_included("B"));
        assert_eq!(r.allocated("A"), 0.0);
        assert_eq!(r.allocated("B"), 2.5);
        assert_eq!(r.excluded(), vec!["A"]);
        assert_eq!(r.diagnostics_of(DiagnosticKind::Excluded).len(), 1);
    }

    #[test]
    fn test_entropy_infeasible() {
        let req = ScheduleRequest::new(
            vec![Subject::new("A", 1, 3.0), Subject::new("B", 1, 3.0)],
            4.0,
        )
        .with_mode(AllocationMode::Entropy);

        let r = engine().allocate(&req).unwrap();
        assert!(!r.feasible);
        assert!(r.allocations.is_empty());
        assert!((r.shortfall_hours - 2.0).abs() < 1e-9);

        let named: Vec<_> = r
            .diagnostics_of(DiagnosticKind::ShortfallContributor)
            .iter()
            .filter_map(|d| d.subject_id.clone())
            .collect();
        assert_eq!(named, vec!["A".to_string(), "B".to_string()]);

        match r.ensure_feasible() {
            Err(AllocationError::InfeasibleBudget { shortfall_hours, subjects }) => {
                assert!((shortfall_hours - 2.0).abs() < 1e-9);
                assert_eq!(subjects.len(), 2);
            }
            other => panic!("expected InfeasibleBudget, got {other:?}"),
        }
    }

    #[test]
    fn test_pareto_prefers_high_score() {
        let req = ScheduleRequest::new(
            vec![
                Subject::new("A", 5, 0.0).with_difficulty(Difficulty::High),
                Subject::new("B", 1, 0.0).with_difficulty(Difficulty::Low),
            ],
            6.0,
        )
        .with_mode(AllocationMode::Pareto)
        .with_params(ModeParams::new(0.6, 2.0));

        let r = engine().allocate(&req).unwrap();
        assert!(r.feasible);
        assert!(r.allocated("A") > r.allocated("B"));
        assert_eq!(r.allocated("A"), 5.5);
        assert_eq!(r.allocated("B"), 0.5);
        assert_eq!(r.total_allocated(), 6.0);
    }

    #[test]
    fn test_empty_subjects() {
        for mode in [AllocationMode::Exact, AllocationMode::Entropy, AllocationMode::Pareto] {
            let req = ScheduleRequest::new(vec![], 3.0).with_mode(mode);
            let r = engine().allocate(&req).unwrap();
            assert!(r.feasible);
            assert!(r.allocations.is_empty());
            assert!(r.diagnostics.is_empty());
        }
    }

    #[test]
    fn test_zero_budget_zero_minimums() {
        for mode in [AllocationMode::Exact, AllocationMode::Entropy, AllocationMode::Pareto] {
            let req = ScheduleRequest::new(
                vec![Subject::new("A", 2, 0.0), Subject::new("B", 4, 0.0)],
                0.0,
            )
            .with_mode(mode);
            let r = engine().allocate(&req).unwrap();
            assert!(r.feasible, "mode {mode}");
            assert_eq!(r.allocated("A"), 0.0);
            assert_eq!(r.allocated("B"), 0.0);
            assert_eq!(r.included.len(), 2);
        }
    }

    #[test]
    fn test_exact_nothing_fits_is_feasible() {
        let r = engine().allocate(&two_subjects(0.5)).unwrap();
        assert!(r.feasible);
        assert!(r.included.is_empty());
        assert_eq!(r.total_allocated(), 0.0);
        assert_eq!(r.diagnostics_of(DiagnosticKind::NoSubjectFits).len(), 1);
    }

    // ======================== Errors ========================

    #[test]
    fn test_invalid_input_never_allocates() {
        let req = ScheduleRequest::new(vec![Subject::new("A", 7, 1.0)], 4.0);
        let err = engine().allocate(&req).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_capacity_limit_is_computation_error() {
        let engine = ScheduleEngine::new(EngineConfig::default().with_max_capacity_units(4));
        let req = ScheduleRequest::new(vec![Subject::new("A", 1, 10.0)], 10.0);
        let err = engine.allocate(&req).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::ComputationError {
                stage: EngineState::Allocating,
                ..
            }
        ));
    }

    fn assert_allocating_error(result: Result<ScheduleResult>) {
        assert!(matches!(
            result,
            Err(AllocationError::ComputationError {
                stage: EngineState::Allocating,
                ..
            })
        ));
    }

    #[test]
    fn test_huge_minimums_and_budget_fail_cleanly() {
        let req = ScheduleRequest::new(
            vec![Subject::new("A", 1, 1e300), Subject::new("B", 1, 1e300)],
            1e300,
        );
        for mode in [
            AllocationMode::Exact,
            AllocationMode::Entropy,
            AllocationMode::Pareto,
        ] {
            assert_allocating_error(engine().allocate(&req.clone().with_mode(mode)));
        }
    }

    #[test]
    fn test_huge_minimums_small_budget_fail_cleanly() {
        let req = ScheduleRequest::new(
            vec![Subject::new("A", 1, 1e300), Subject::new("B", 1, 1e300)],
            4.0,
        )
        .with_mode(AllocationMode::Entropy);
        assert_allocating_error(engine().allocate(&req));
    }

    #[test]
    fn test_huge_budget_fails_cleanly() {
        let req = ScheduleRequest::new(
            vec![Subject::new("A", 1, 0.0), Subject::new("B", 1, 0.0)],
            1e19,
        );
        for mode in [
            AllocationMode::Exact,
            AllocationMode::Entropy,
            AllocationMode::Pareto,
        ] {
            assert_allocating_error(engine().allocate(&req.clone().with_mode(mode)));
        }
    }

    #[test]
    fn test_budget_limit_is_configurable() {
        let engine = ScheduleEngine::new(EngineConfig::default().with_max_budget_units(8));
        let req = two_subjects(4.0).with_mode(AllocationMode::Entropy);
        assert!(engine.allocate(&req).is_ok());
        let req = two_subjects(4.5).with_mode(AllocationMode::Entropy);
        assert_allocating_error(engine.allocate(&req));
    }

    #[test]
    fn test_many_subjects_hit_table_limit() {
        let engine = ScheduleEngine::new(EngineConfig::default().with_max_table_cells(10_000));
        let subjects = (0..2_000)
            .map(|i| Subject::new(format!("S{i:04}"), 1, 0.5))
            .collect();
        let req = ScheduleRequest::new(subjects, 100.0);
        assert_allocating_error(engine.allocate(&req));
    }

    #[test]
    fn test_bad_config_rejected() {
        let config = EngineConfig::default().with_granularity(0.0);
        assert!(ScheduleEngine::try_new(config.clone()).is_err());
        let err = ScheduleEngine::new(config)
            .allocate(&two_subjects(4.0))
            .unwrap_err();
        assert!(matches!(
            err,
            AllocationError::ComputationError {
                stage: EngineState::Validating,
                ..
            }
        ));
    }

    #[test]
    fn test_states() {
        assert!(EngineState::Done.is_terminal());
        assert!(EngineState::Failed.is_terminal());
        assert!(!EngineState::Quantizing.is_terminal());
        assert_eq!(EngineState::Quantizing.to_string(), "quantizing");
    }

    // ======================== Properties ========================

    #[test]
    fn test_determinism() {
        let req = ScheduleRequest::new(
            vec![
                Subject::new("x", 2, 0.75),
                Subject::new("y", 4, 1.25).with_difficulty(Difficulty::Medium),
                Subject::new("z", 4, 0.5).with_difficulty(Difficulty::High),
            ],
            7.25,
        );
        for mode in [AllocationMode::Exact, AllocationMode::Entropy, AllocationMode::Pareto] {
            let req = req.clone().with_mode(mode);
            let first = engine().allocate(&req).unwrap();
            let second = engine().allocate(&req).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_monotone_in_priority() {
        for mode in [AllocationMode::Entropy, AllocationMode::Pareto] {
            let mut last = 0.0;
            for p in 1..=5 {
                let req = ScheduleRequest::new(
                    vec![
                        Subject::new("A", p, 0.5).with_difficulty(Difficulty::Medium),
                        Subject::new("B", 3, 0.5).with_difficulty(Difficulty::Low),
                        Subject::new("C", 2, 1.0).with_difficulty(Difficulty::High),
                    ],
                    8.0,
                )
                .with_mode(mode);
                let r = engine().allocate(&req).unwrap();
                let share = r.allocated("A") / r.total_allocated();
                assert!(share >= last, "mode {mode}, priority {p}");
                last = share;
            }
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let engine = engine();
        let req = two_subjects(4.0);
        let expected = engine.allocate(&req).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| engine.allocate(&req).unwrap()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }

    fn random_request(rng: &mut SmallRng) -> ScheduleRequest {
        let n = rng.random_range(0..8);
        let subjects = (0..n)
            .map(|i| {
                let subject = Subject::new(
                    format!("s{i}"),
                    rng.random_range(1..=5),
                    rng.random_range(0..=12) as f64 * 0.25,
                );
                match rng.random_range(0..5) {
                    0 => subject.with_difficulty(Difficulty::None),
                    1 => subject.with_difficulty(Difficulty::Low),
                    2 => subject.with_difficulty(Difficulty::Medium),
                    3 => subject.with_difficulty(Difficulty::High),
                    _ => subject,
                }
            })
            .collect();
        let mode = match rng.random_range(0..3) {
            0 => AllocationMode::Exact,
            1 => AllocationMode::Entropy,
            _ => AllocationMode::Pareto,
        };
        ScheduleRequest::new(subjects, rng.random_range(0..=48) as f64 * 0.25)
            .with_mode(mode)
            .with_params(ModeParams::new(
                rng.random_range(0..=10) as f64 / 10.0,
                rng.random_range(1..=40) as f64 / 10.0,
            ))
    }

    /// Largest number of subjects whose block-rounded minimums fit.
    fn brute_force_max_count(req: &ScheduleRequest) -> usize {
        let g = 0.5;
        let cap = units_floor(req.total_hours, g);
        let weights: Vec<usize> = req.subjects.iter().map(|s| units_ceil(s.min_time, g)).collect();
        (0u32..(1u32 << weights.len()))
            .filter(|&mask| {
                let w: usize = weights
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| (mask >> i) & 1 == 1)
                    .map(|(_, w)| *w)
                    .sum();
                w <= cap
            })
            .map(|mask| mask.count_ones() as usize)
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_random_requests_keep_invariants() {
        let mut rng = SmallRng::seed_from_u64(42);
        let engine = engine();

        for _ in 0..500 {
            let req = random_request(&mut rng);
            let r = engine.allocate(&req).unwrap();
            let needed: usize = req.subjects.iter().map(|s| units_ceil(s.min_time, 0.5)).sum();
            let capacity = units_floor(req.total_hours, 0.5);

            if req.mode.requires_full_inclusion() && needed > capacity {
                assert!(!r.feasible);
                assert!(r.allocations.is_empty());
                assert!(r.shortfall_hours > 0.0);
                continue;
            }
            assert!(r.feasible);

            let total = r.total_allocated();
            assert!(total <= req.total_hours + 1e-9);
            if !r.included.is_empty() {
                assert!(req.total_hours - total < 0.5 + 1e-9);
            }

            for s in &req.subjects {
                let h = r.allocated(&s.id);
                assert!(((h / 0.5) - (h / 0.5).round()).abs() < 1e-9);
                if r.is_included(&s.id) {
                    assert!(h + 1e-9 >= s.min_time);
                } else {
                    assert_eq!(h, 0.0);
                }
            }

            match req.mode {
                AllocationMode::Exact => {
                    assert_eq!(r.included.len(), brute_force_max_count(&req));
                }
                _ => assert_eq!(r.included.len(), req.subjects.len()),
            }
        }
    }

    // ======================== Contract ========================

    #[test]
    fn test_json_contract() {
        let req: ScheduleRequest = serde_json::from_str(
            r#"{
                "subjects": [
                    {"id": "A", "priority": 5, "min_time": 0.0, "difficulty": "high"},
                    {"id": "B", "priority": 1, "min_time": 0.0, "difficulty": "low"}
                ],
                "total_hours": 6.0,
                "mode": "pareto"
            }"#,
        )
        .unwrap();
        assert_eq!(req.params, ModeParams::default());

        let r = engine().allocate(&req).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["feasible"], true);
        assert_eq!(json["mode"], "pareto");
        assert_eq!(json["allocations"]["A"], 5.5);
        assert_eq!(json["allocations"]["B"], 0.5);
    }
}
