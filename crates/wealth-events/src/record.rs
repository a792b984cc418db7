//! Collector Records
//!
//! Append-only rows written by the data collector, one batch per step.

use serde::{Deserialize, Serialize};

/// Model-level reporter row: one per collected step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepMetrics {
    /// Number of completed scheduler passes when the row was taken
    pub step: u64,
    /// Inequality index of the wealth distribution (0.0 = perfect equality)
    pub gini: f64,
    /// Sum of all agent wealth
    pub total_wealth: u64,
}

/// Agent-level reporter row: one per agent per collected step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentWealthRecord {
    pub step: u64,
    pub agent_id: u32,
    pub wealth: u32,
}

/// When the collector samples the population relative to the scheduler pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollectionTiming {
    /// Sample once all agents have acted
    #[default]
    AfterStep,
    /// Sample before any agent acts, so the first row is the initial state
    BeforeStep,
}

impl CollectionTiming {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionTiming::AfterStep => "after_step",
            CollectionTiming::BeforeStep => "before_step",
        }
    }
}
