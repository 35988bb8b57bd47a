//! Schedule request model.
//!
//! A request bundles the subjects, the total time budget and the
//! allocation strategy to apply. Requests are built once and never
//! mutated by the engine.

use serde::{Deserialize, Serialize};

use super::Subject;

/// Default Pareto trade-off between priority and difficulty.
pub const DEFAULT_LAMBDA: f64 = 0.6;
/// Default Pareto softmax sharpness.
pub const DEFAULT_BETA: f64 = 2.0;

/// Allocation strategy.
///
/// # Modes
/// - **Exact**: maximize the number of subjects that fit, then split the
///   surplus proportionally to priority. May exclude subjects.
/// - **Entropy**: include every subject, split the surplus by a softmax
///   over priorities.
/// - **Pareto**: include every subject, split the surplus by a softmax over
///   a combined priority/difficulty score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    #[default]
    Exact,
    Entropy,
    Pareto,
}

impl AllocationMode {
    /// Whether the mode must include every subject.
    pub fn requires_full_inclusion(self) -> bool {
        !matches!(self, AllocationMode::Exact)
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            AllocationMode::Exact => "exact",
            AllocationMode::Entropy => "entropy",
            AllocationMode::Pareto => "pareto",
        }
    }
}

impl std::fmt::Display for AllocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Mode-specific tuning parameters.
///
/// Only the Pareto mode reads them today.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeParams {
    /// Weight of priority vs. difficulty in `[0, 1]` (1 = priority only).
    pub lambda: f64,
    /// Softmax sharpness (> 0). Larger values favor high scores more.
    pub beta: f64,
}

impl ModeParams {
    /// Creates parameters with explicit values.
    pub fn new(lambda: f64, beta: f64) -> Self {
        Self { lambda, beta }
    }
}

impl Default for ModeParams {
    fn default() -> Self {
        Self::new(DEFAULT_LAMBDA, DEFAULT_BETA)
    }
}

/// Input container for one allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Subjects in caller order.
    pub subjects: Vec<Subject>,
    /// Total time budget in hours.
    pub total_hours: f64,
    /// Strategy to apply.
    #[serde(default)]
    pub mode: AllocationMode,
    /// Strategy parameters.
    #[serde(default)]
    pub params: ModeParams,
}

impl ScheduleRequest {
    /// Creates an Exact-mode request with default parameters.
    pub fn new(subjects: Vec<Subject>, total_hours: f64) -> Self {
        Self {
            subjects,
            total_hours,
            mode: AllocationMode::Exact,
            params: ModeParams::default(),
        }
    }

    /// Sets the allocation mode.
    pub fn with_mode(mut self, mode: AllocationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the mode parameters.
    pub fn with_params(mut self, params: ModeParams) -> Self {
        self.params = params;
        self
    }

    /// Appends a subject.
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Sum of all minimum times (hours).
    pub fn total_min_time(&self) -> f64 {
        self.subjects.iter().map(|s| s.min_time).sum()
    }

    /// Finds a subject by ID.
    pub fn subject(&self, id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }
}
