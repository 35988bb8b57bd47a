//! Study allocation domain models.
//!
//! Provides the data types exchanged with the engine: the subjects and
//! budget going in, the per-subject hours and diagnostics coming out.
//! All types are serde-serializable so UI and storage layers can pass
//! them around as JSON.

mod request;
mod result;
mod subject;

pub use request::{AllocationMode, ModeParams, ScheduleRequest, DEFAULT_BETA, DEFAULT_LAMBDA};
pub use result::{Diagnostic, DiagnosticKind, ScheduleResult};
pub use subject::{Difficulty, Subject, MAX_PRIORITY, MIN_PRIORITY};
