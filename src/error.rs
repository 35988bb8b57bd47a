//! Error taxonomy for allocation requests.

use thiserror::Error;

use crate::engine::EngineState;
use crate::validation::ValidationError;

/// Allocation error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    /// The request is malformed. Raised by the validator only.
    #[error("Invalid schedule request: {}", join_messages(.errors))]
    InvalidInput { errors: Vec<ValidationError> },

    /// Minimum study times do not fit into the budget.
    #[error("Budget short by {shortfall_hours} hours for subjects [{}]", .subjects.join(", "))]
    InfeasibleBudget {
        shortfall_hours: f64,
        subjects: Vec<String>,
    },

    /// The computation could not be carried out for this request.
    #[error("Computation failed while {stage}: {message}")]
    ComputationError { stage: EngineState, message: String },
}

/// Result type for allocation operations
pub type Result<T> = std::result::Result<T, AllocationError>;

impl AllocationError {
    /// Create an InvalidInput error
    pub fn invalid_input(errors: Vec<ValidationError>) -> Self {
        Self::InvalidInput { errors }
    }

    /// Create a ComputationError
    pub fn computation(stage: EngineState, message: impl Into<String>) -> Self {
        Self::ComputationError {
            stage,
            message: message.into(),
        }
    }

    /// Whether the error comes from a malformed request.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
