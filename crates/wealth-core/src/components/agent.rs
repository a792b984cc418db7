//! Agent Components
//!
//! Components for individual agents: identity and wealth.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Marker component identifying an entity as an agent
#[derive(Component, Debug, Clone, Default)]
pub struct Agent;

/// Unique identifier for an agent, assigned 0..N-1 in creation order
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Units of wealth held by an agent
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Wealth(pub u32);

impl Wealth {
    pub fn is_broke(&self) -> bool {
        self.0 == 0
    }
}

/// Everything spawned for a new agent, except its position
#[derive(Bundle)]
pub struct AgentBundle {
    pub agent: Agent,
    pub id: AgentId,
    pub wealth: Wealth,
}

impl AgentBundle {
    pub fn new(id: u32, wealth: u32) -> Self {
        Self {
            agent: Agent,
            id: AgentId(id),
            wealth: Wealth(wealth),
        }
    }
}
