//! ECS Components
//!
//! Agent data and the spatial grid.

pub mod agent;
pub mod grid;

pub use agent::{Agent, AgentBundle, AgentId, Wealth};
pub use grid::{GridError, GridPos, MultiGrid};
