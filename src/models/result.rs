//! Schedule result model.
//!
//! A result is the engine's answer to one request: per-subject hours,
//! the set of subjects that made the cut, and advisory diagnostics.
//! Results are produced once and handed to the caller.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{AllocationMode, Subject};
use crate::error::AllocationError;

/// Outcome of one allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Whether an allocation was produced.
    pub feasible: bool,
    /// Strategy that produced this result.
    pub mode: AllocationMode,
    /// Budget the result was computed against (hours).
    pub total_hours: f64,
    /// Subject ID → allocated hours. Empty when infeasible.
    pub allocations: BTreeMap<String, f64>,
    /// Subjects that received at least their minimum.
    pub included: BTreeSet<String>,
    /// Hours missing to cover every minimum (0 when feasible).
    pub shortfall_hours: f64,
    /// Advisory notes, in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
}

/// An advisory note attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Note category.
    pub kind: DiagnosticKind,
    /// Related subject, if the note is about one.
    pub subject_id: Option<String>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Exact mode dropped a subject to maximize coverage.
    Excluded,
    /// Exact mode could not fit even the cheapest subject.
    NoSubjectFits,
    /// The minimums of all subjects exceed the budget.
    BudgetShortfall,
    /// A subject whose minimum contributes to the shortfall.
    ShortfallContributor,
    /// Leftover time could not be placed in whole blocks.
    Underutilized,
}

impl Diagnostic {
    /// Creates a diagnostic not tied to a subject.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject_id: None,
            message: message.into(),
        }
    }

    /// Creates a diagnostic about one subject.
    pub fn for_subject(
        kind: DiagnosticKind,
        subject_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            subject_id: Some(subject_id.into()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl ScheduleResult {
    /// Creates a feasible result with no allocations.
    pub fn empty(mode: AllocationMode, total_hours: f64) -> Self {
        Self {
            feasible: true,
            mode,
            total_hours,
            allocations: BTreeMap::new(),
            included: BTreeSet::new(),
            shortfall_hours: 0.0,
            diagnostics: Vec::new(),
        }
    }

    /// Creates an infeasible result. No allocation is carried.
    pub fn infeasible(
        mode: AllocationMode,
        total_hours: f64,
        shortfall_hours: f64,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            feasible: false,
            shortfall_hours,
            diagnostics,
            ..Self::empty(mode, total_hours)
        }
    }

    /// Allocated hours for a subject (0 if unknown or excluded).
    pub fn allocated(&self, subject_id: &str) -> f64 {
        self.allocations.get(subject_id).copied().unwrap_or(0.0)
    }

    /// Sum of all allocations (hours).
    pub fn total_allocated(&self) -> f64 {
        self.allocations.values().sum()
    }

    /// Whether a subject received time.
    pub fn is_included(&self, subject_id: &str) -> bool {
        self.included.contains(subject_id)
    }

    /// Subjects present in the allocation table but not included.
    pub fn excluded(&self) -> Vec<&str> {
        self.allocations
            .keys()
            .filter(|id| !self.included.contains(*id))
            .map(|id| id.as_str())
            .collect()
    }

    /// Diagnostics of a given kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.kind == kind).collect()
    }

    /// Converts an infeasible result into [`AllocationError::InfeasibleBudget`].
    pub fn ensure_feasible(self) -> Result<Self, AllocationError> {
        if self.feasible {
            return Ok(self);
        }
        let subjects = self
            .diagnostics_of(DiagnosticKind::ShortfallContributor)
            .iter()
            .filter_map(|d| d.subject_id.clone())
            .collect();
        Err(AllocationError::InfeasibleBudget {
            shortfall_hours: self.shortfall_hours,
            subjects,
        })
    }

    /// Renders the plan as text lines, following the caller's subject order.
    pub fn plan_lines(&self, subjects: &[Subject]) -> Vec<String> {
        if !self.feasible {
            return vec![format!(
                "Minimum study times exceed the available {} hours by {} hours.",
                self.total_hours, self.shortfall_hours
            )];
        }
        if self.included.is_empty() {
            if subjects.is_empty() {
                return Vec::new();
            }
            return vec!["Not enough time to allocate a study block to any subject.".to_string()];
        }

        subjects
            .iter()
            .filter(|s| self.is_included(&s.id))
            .map(|s| {
                format!(
                    "Study {} for {} hours (Priority points = {})",
                    s.id,
                    self.allocated(&s.id),
                    s.priority
                )
            })
            .collect()
    }
}
