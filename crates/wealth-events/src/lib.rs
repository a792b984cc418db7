//! Shared record types for the wealth-exchange simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Everything the data collector appends and every snapshot the model
//! produces is defined here so external reporters can depend on it alone.

pub mod record;
pub mod snapshot;

// Re-export record types
pub use record::{AgentWealthRecord, CollectionTiming, StepMetrics};

// Re-export snapshot types
pub use snapshot::{generate_snapshot_id, AgentSnapshot, ModelSnapshot};
