//! Snapshot Types
//!
//! Serialization structs for full model snapshots.
//!
//! A snapshot captures every agent's wealth and cell at one step, used for
//! analysis and debugging outside the simulation process.

use serde::{Deserialize, Serialize};

/// Generates a snapshot ID with the given step number.
pub fn generate_snapshot_id(step: u64) -> String {
    format!("snap_{:06}", step)
}

/// One agent inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: u32,
    pub wealth: u32,
    pub x: u32,
    pub y: u32,
}

/// Complete model state at one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub snapshot_id: String,
    pub step: u64,
    pub width: u32,
    pub height: u32,
    pub gini: f64,
    pub total_wealth: u64,
    /// Agents ordered by id
    pub agents: Vec<AgentSnapshot>,
}

impl ModelSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn agent(&self, agent_id: u32) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }

    /// Number of agents sharing each occupied cell, keyed by (x, y)
    pub fn occupancy(&self) -> std::collections::BTreeMap<(u32, u32), usize> {
        let mut counts = std::collections::BTreeMap::new();
        for agent in &self.agents {
            *counts.entry((agent.x, agent.y)).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelSnapshot {
        ModelSnapshot {
            snapshot_id: generate_snapshot_id(12),
            step: 12,
            width: 4,
            height: 4,
            gini: 0.5,
            total_wealth: 3,
            agents: vec![
                AgentSnapshot { agent_id: 0, wealth: 0, x: 1, y: 1 },
                AgentSnapshot { agent_id: 1, wealth: 3, x: 1, y: 1 },
                AgentSnapshot { agent_id: 2, wealth: 0, x: 3, y: 0 },
            ],
        }
    }

    #[test]
    fn test_snapshot_id_format() {
        assert_eq!(generate_snapshot_id(0), "snap_000000");
        assert_eq!(generate_snapshot_id(1234), "snap_001234");
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = sample();
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"snapshot_id\": \"snap_000012\""));

        let parsed = ModelSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_occupancy_counts_shared_cells() {
        let snapshot = sample();
        let occupancy = snapshot.occupancy();
        assert_eq!(occupancy.get(&(1, 1)), Some(&2));
        assert_eq!(occupancy.get(&(3, 0)), Some(&1));
        assert_eq!(snapshot.agent(1).map(|a| a.wealth), Some(3));
        assert!(snapshot.agent(7).is_none());
    }
}
