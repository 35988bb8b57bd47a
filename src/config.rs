//! Engine configuration.
//!
//! All fields have defaults, so a partial JSON/TOML document (or none at
//! all) yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::engine::EngineState;
use crate::error::{AllocationError, Result};
use crate::quantize::DEFAULT_GRANULARITY_HOURS;

/// Default upper bound on knapsack capacity (blocks).
pub const DEFAULT_MAX_CAPACITY_UNITS: usize = 10_000;

/// Default upper bound on the budget, in blocks, for every mode.
pub const DEFAULT_MAX_BUDGET_UNITS: usize = 1_000_000;

/// Default upper bound on knapsack table size (subjects+1 × capacity+1).
pub const DEFAULT_MAX_TABLE_CELLS: usize = 4_000_000;

/// Configuration for the schedule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Block length in hours. Every allocation is a multiple of it.
    pub granularity_hours: f64,
    /// Largest knapsack capacity (in blocks) the exact allocator accepts.
    pub max_capacity_units: usize,
    /// Largest budget (in blocks) any mode accepts.
    pub max_budget_units: usize,
    /// Largest knapsack table (in cells) the exact allocator builds.
    pub max_table_cells: usize,
}

impl EngineConfig {
    /// Sets the block length.
    pub fn with_granularity(mut self, hours: f64) -> Self {
        self.granularity_hours = hours;
        self
    }

    /// Sets the knapsack capacity limit.
    pub fn with_max_capacity_units(mut self, units: usize) -> Self {
        self.max_capacity_units = units;
        self
    }

    /// Sets the budget limit.
    pub fn with_max_budget_units(mut self, units: usize) -> Self {
        self.max_budget_units = units;
        self
    }

    /// Sets the knapsack table size limit.
    pub fn with_max_table_cells(mut self, cells: usize) -> Self {
        self.max_table_cells = cells;
        self
    }

    /// Checks that the configuration can drive an allocation.
    pub fn validate(&self) -> Result<()> {
        if !(self.granularity_hours.is_finite() && self.granularity_hours > 0.0) {
            return Err(AllocationError::computation(
                EngineState::Validating,
                format!(
                    "granularity must be finite and > 0, got {}",
                    self.granularity_hours
                ),
            ));
        }
        if self.max_capacity_units == 0 {
            return Err(AllocationError::computation(
                EngineState::Validating,
                "knapsack capacity limit must be > 0",
            ));
        }
        if self.max_budget_units == 0 || self.max_table_cells == 0 {
            return Err(AllocationError::computation(
                EngineState::Validating,
                "budget and table limits must be > 0",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            granularity_hours: DEFAULT_GRANULARITY_HOURS,
            max_capacity_units: DEFAULT_MAX_CAPACITY_UNITS,
            max_budget_units: DEFAULT_MAX_BUDGET_UNITS,
            max_table_cells: DEFAULT_MAX_TABLE_CELLS,
        }
    }
}
