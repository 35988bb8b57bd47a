//! Subject model.
//!
//! A subject is the unit that receives study time. It carries the user's
//! priority rating, the minimum time it needs to be worth studying at all,
//! and an optional difficulty rating used by the Pareto allocator.

use serde::{Deserialize, Serialize};

/// Lowest accepted priority rating.
pub const MIN_PRIORITY: u8 = 1;
/// Highest accepted priority rating.
pub const MAX_PRIORITY: u8 = 5;

/// A subject competing for study time.
///
/// Subjects are inputs only: the engine never writes allocated time back
/// into them. Allocations live in [`ScheduleResult`](super::ScheduleResult).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier (also used as display name).
    pub id: String,
    /// Priority rating in `[1, 5]` (higher = more important).
    pub priority: u8,
    /// Minimum study time in hours if the subject is scheduled at all.
    pub min_time: f64,
    /// Perceived difficulty. `None` = not rated.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl Subject {
    /// Creates a subject without a difficulty rating.
    pub fn new(id: impl Into<String>, priority: u8, min_time: f64) -> Self {
        Self {
            id: id.into(),
            priority,
            min_time,
            difficulty: None,
        }
    }

    /// Sets the difficulty rating.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Difficulty level as a number, `None` if unrated.
    #[inline]
    pub fn difficulty_level(&self) -> Option<f64> {
        self.difficulty.map(|d| d.level() as f64)
    }
}

/// Difficulty rating of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Explicitly rated as trivial.
    None,
    Low,
    Medium,
    High,
}

impl Difficulty {
    /// Ordinal level (None=0 .. High=3).
    pub fn level(self) -> u8 {
        match self {
            Difficulty::None => 0,
            Difficulty::Low => 1,
            Difficulty::Medium => 2,
            Difficulty::High => 3,
        }
    }
}
