//! Input validation for schedule requests.
//!
//! Checks structural integrity of a request before any allocator sees it.
//! Detects:
//! - Negative or non-finite budgets
//! - Priorities outside `[1, 5]`
//! - Negative or non-finite minimum times
//! - Duplicate or empty subject IDs
//! - Out-of-range Pareto parameters
//!
//! All problems are collected, not just the first one.

use crate::models::{AllocationMode, ScheduleRequest, MAX_PRIORITY, MIN_PRIORITY};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Total hours below zero.
    NegativeBudget,
    /// A numeric input is NaN or infinite.
    NonFiniteValue,
    /// Priority outside `[1, 5]`.
    PriorityOutOfRange,
    /// Minimum time below zero.
    NegativeMinTime,
    /// Two subjects share the same ID.
    DuplicateId,
    /// A subject has an empty ID.
    EmptyId,
    /// Pareto lambda outside `[0, 1]`.
    LambdaOutOfRange,
    /// Pareto beta not strictly positive.
    NonPositiveBeta,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a schedule request.
///
/// Checks:
/// 1. Total hours finite and `>= 0`
/// 2. Every priority in `[1, 5]`
/// 3. Every minimum time finite and `>= 0`
/// 4. No empty and no duplicate subject IDs
/// 5. Pareto mode only: `lambda` in `[0, 1]`, `beta > 0` and finite
///
/// An empty subject list is valid.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(request: &ScheduleRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if !request.total_hours.is_finite() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonFiniteValue,
            format!("Total hours must be finite, got {}", request.total_hours),
        ));
    } else if request.total_hours < 0.0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NegativeBudget,
            format!("Total hours must be >= 0, got {}", request.total_hours),
        ));
    }

    let mut ids = HashSet::new();
    for subject in &request.subjects {
        if subject.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Subject ID must not be empty",
            ));
        } else if !ids.insert(subject.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate subject ID: {}", subject.id),
            ));
        }

        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&subject.priority) {
            errors.push(ValidationError::new(
                ValidationErrorKind::PriorityOutOfRange,
                format!(
                    "Subject '{}' priority {} is outside {}..={}",
                    subject.id, subject.priority, MIN_PRIORITY, MAX_PRIORITY
                ),
            ));
        }

        if !subject.min_time.is_finite() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonFiniteValue,
                format!("Subject '{}' minimum time must be finite", subject.id),
            ));
        } else if subject.min_time < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeMinTime,
                format!(
                    "Subject '{}' minimum time must be >= 0, got {}",
                    subject.id, subject.min_time
                ),
            ));
        }
    }

    if request.mode == AllocationMode::Pareto {
        let params = &request.params;
        if !(0.0..=1.0).contains(&params.lambda) {
            errors.push(ValidationError::new(
                ValidationErrorKind::LambdaOutOfRange,
                format!("Pareto lambda must be in [0, 1], got {}", params.lambda),
            ));
        }
        if !(params.beta.is_finite() && params.beta > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveBeta,
                format!("Pareto beta must be finite and > 0, got {}", params.beta),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
