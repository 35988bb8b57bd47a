//! Study-time allocation engine for the U-Engine ecosystem.
//!
//! Given subjects with priorities, minimum study times and optional
//! difficulty ratings, plus a fixed time budget, produces a per-subject
//! allocation that respects minimums, never exceeds the budget, and comes
//! in whole half-hour blocks.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Subject`, `Difficulty`, `ScheduleRequest`,
//!   `ModeParams`, `ScheduleResult`, `Diagnostic`
//! - **`validation`**: Request integrity checks (ranges, duplicate IDs, λ/β)
//! - **`allocators`**: The three strategies — `ExactAllocator` (knapsack +
//!   proportional), `EntropyAllocator` (softmax), `ParetoAllocator`
//!   (priority/difficulty trade-off)
//! - **`quantize`**: Largest-remainder rounding to whole blocks
//! - **`engine`**: `ScheduleEngine`, the single entry point
//! - **`kpi`**: Plan quality metrics
//!
//! # Example
//!
//! ```
//! use u_study::models::{AllocationMode, ScheduleRequest, Subject};
//!
//! let request = ScheduleRequest::new(
//!     vec![Subject::new("Physics", 4, 1.0), Subject::new("History", 2, 0.5)],
//!     3.0,
//! )
//! .with_mode(AllocationMode::Entropy);
//!
//! let result = u_study::allocate(&request).unwrap();
//! assert_eq!(result.total_allocated(), 3.0);
//! assert!(result.allocated("Physics") > result.allocated("History"));
//! ```
//!
//! # References
//!
//! - Kellerer, Pferschy & Pisinger (2004), "Knapsack Problems"
//! - Balinski & Young (2001), "Fair Representation"

pub mod allocators;
pub mod config;
pub mod engine;
pub mod error;
pub mod kpi;
pub mod models;
pub mod quantize;
pub mod validation;

pub use config::EngineConfig;
pub use engine::{EngineState, ScheduleEngine};
pub use error::{AllocationError, Result};

/// Allocates with a default-configured engine.
pub fn allocate(request: &models::ScheduleRequest) -> Result<models::ScheduleResult> {
    ScheduleEngine::default().allocate(request)
}
