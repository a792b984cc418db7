//! Data Collector
//!
//! Append-only time series of model-level and agent-level reporters.

use bevy_ecs::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

use wealth_events::{AgentWealthRecord, CollectionTiming, StepMetrics};

use crate::components::agent::{AgentId, Wealth};
use crate::output::inequality::inequality_index;

/// Resource: Collected reporter rows
#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct DataCollector {
    timing: CollectionTiming,
    record_agents: bool,
    model_vars: Vec<StepMetrics>,
    agent_vars: Vec<AgentWealthRecord>,
    /// Span of `agent_vars` holding each step's rows, sorted by agent id
    #[serde(skip)]
    agent_rows: HashMap<u64, Range<usize>>,
}

impl DataCollector {
    pub fn new(timing: CollectionTiming, record_agents: bool) -> Self {
        Self {
            timing,
            record_agents,
            ..Self::default()
        }
    }

    pub fn timing(&self) -> CollectionTiming {
        self.timing
    }

    /// Record one step. Agent rows are stored in agent id order.
    pub fn collect(&mut self, step: u64, population: &[(AgentId, Wealth)]) -> StepMetrics {
        let wealths: Vec<u32> = population.iter().map(|(_, w)| w.0).collect();
        let row = StepMetrics {
            step,
            gini: inequality_index(&wealths),
            total_wealth: wealths.iter().map(|&w| u64::from(w)).sum(),
        };
        self.model_vars.push(row);

        if self.record_agents {
            let start = self.agent_vars.len();
            self.agent_vars.extend(population.iter().map(|(id, wealth)| AgentWealthRecord {
                step,
                agent_id: id.0,
                wealth: wealth.0,
            }));
            self.agent_vars[start..].sort_by_key(|r| r.agent_id);
            // A repeated step label keeps pointing at its first rows
            self.agent_rows.entry(step).or_insert(start..self.agent_vars.len());
        }
        row
    }

    pub fn model_vars(&self) -> &[StepMetrics] {
        &self.model_vars
    }

    pub fn agent_vars(&self) -> &[AgentWealthRecord] {
        &self.agent_vars
    }

    /// Inequality index per collected step, oldest first
    pub fn gini_series(&self) -> Vec<f64> {
        self.model_vars.iter().map(|row| row.gini).collect()
    }

    pub fn latest(&self) -> Option<&StepMetrics> {
        self.model_vars.last()
    }

    /// Wealth of one agent at one collected step
    pub fn agent_wealth(&self, step: u64, agent_id: u32) -> Option<u32> {
        let rows = &self.agent_vars[self.agent_rows.get(&step)?.clone()];
        rows.binary_search_by_key(&agent_id, |r| r.agent_id)
            .ok()
            .map(|i| rows[i].wealth)
    }

    /// Wealth trace of one agent across all collected steps
    pub fn agent_history(&self, agent_id: u32) -> Vec<(u64, u32)> {
        self.model_vars
            .iter()
            .filter_map(|row| Some((row.step, self.agent_wealth(row.step, agent_id)?)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.model_vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model_vars.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population(wealths: &[u32]) -> Vec<(AgentId, Wealth)> {
        wealths
            .iter()
            .enumerate()
            .map(|(i, &w)| (AgentId(i as u32), Wealth(w)))
            .collect()
    }

    #[test]
    fn test_collect_appends_rows() {
        let mut collector = DataCollector::new(CollectionTiming::AfterStep, true);
        assert!(collector.is_empty());

        collector.collect(1, &population(&[1, 1, 1]));
        let row = collector.collect(2, &population(&[0, 3, 0]));

        assert_eq!(collector.len(), 2);
        assert_eq!(row.step, 2);
        assert_eq!(row.total_wealth, 3);
        assert!(collector.gini_series()[0].abs() < 1e-12);
        assert_eq!(collector.latest(), Some(&row));
        assert_eq!(collector.agent_vars().len(), 6);
        assert_eq!(collector.agent_wealth(2, 1), Some(3));
        assert_eq!(collector.agent_wealth(3, 1), None);
        assert_eq!(collector.agent_history(0), vec![(1, 1), (2, 0)]);
    }

    #[test]
    fn test_agent_lookup_across_many_steps() {
        let mut collector = DataCollector::new(CollectionTiming::AfterStep, true);
        for step in 1..=200u64 {
            let wealths: Vec<u32> = (0..500).map(|i| (i + step as u32) % 7).collect();
            collector.collect(step, &population(&wealths));
        }

        assert_eq!(collector.agent_vars().len(), 100_000);
        assert_eq!(collector.agent_wealth(1, 0), Some(1));
        assert_eq!(collector.agent_wealth(137, 499), Some((499 + 137) % 7));
        assert_eq!(collector.agent_wealth(200, 500), None);
        assert_eq!(collector.agent_wealth(201, 0), None);

        let history = collector.agent_history(42);
        assert_eq!(history.len(), 200);
        assert_eq!(history[9], (10, (42 + 10) % 7));
    }

    #[test]
    fn test_unordered_population_is_sorted_by_id() {
        let mut collector = DataCollector::new(CollectionTiming::AfterStep, true);
        let rows = vec![
            (AgentId(2), Wealth(5)),
            (AgentId(0), Wealth(1)),
            (AgentId(1), Wealth(0)),
        ];
        collector.collect(1, &rows);

        let ids: Vec<u32> = collector.agent_vars().iter().map(|r| r.agent_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(collector.agent_wealth(1, 2), Some(5));
        assert_eq!(collector.agent_wealth(1, 1), Some(0));
    }

    #[test]
    fn test_agent_rows_optional() {
        let mut collector = DataCollector::new(CollectionTiming::BeforeStep, false);
        collector.collect(0, &population(&[2, 2]));

        assert_eq!(collector.len(), 1);
        assert!(collector.agent_vars().is_empty());
        assert_eq!(collector.agent_wealth(0, 0), None);
        assert!(collector.agent_history(0).is_empty());
        assert_eq!(collector.timing(), CollectionTiming::BeforeStep);
    }

    #[test]
    fn test_json_output() {
        let mut collector = DataCollector::new(CollectionTiming::AfterStep, true);
        collector.collect(1, &population(&[1, 2]));

        let value: serde_json::Value = serde_json::from_str(&collector.to_json().unwrap()).unwrap();
        assert_eq!(value["timing"], "after_step");
        assert_eq!(value["model_vars"][0]["total_wealth"], 3);
        assert_eq!(value["agent_vars"][1]["wealth"], 2);
    }
}
