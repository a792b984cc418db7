//! Metrics System
//!
//! Samples the wealth distribution into the data collector.

use bevy_ecs::prelude::*;

use crate::components::agent::{Agent, AgentId, Wealth};
use crate::output::DataCollector;
use crate::systems::scheduler::RandomActivation;

/// System: Append one collector row for the current step
pub fn collect_metrics(
    scheduler: Res<RandomActivation>,
    mut collector: ResMut<DataCollector>,
    query: Query<(&AgentId, &Wealth), With<Agent>>,
) {
    let mut population: Vec<(AgentId, Wealth)> = query.iter().map(|(id, w)| (*id, *w)).collect();
    population.sort_by_key(|(id, _)| *id);

    collector.collect(scheduler.steps(), &population);
}
