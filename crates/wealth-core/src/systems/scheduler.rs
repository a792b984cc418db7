//! Random Activation
//!
//! Scheduler that activates every registered agent once per pass, in a fresh
//! uniformly random order each time.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

/// Resource: Registered agents and the number of completed passes
#[derive(Resource, Debug, Default)]
pub struct RandomActivation {
    agents: Vec<Entity>,
    steps: u64,
}

impl RandomActivation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent. Returns false if it was already registered.
    pub fn add(&mut self, agent: Entity) -> bool {
        if self.agents.contains(&agent) {
            tracing::warn!("Agent {:?} is already scheduled", agent);
            return false;
        }
        self.agents.push(agent);
        true
    }

    pub fn agents(&self) -> &[Entity] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Completed passes
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Start a pass: a new permutation of all registered agents.
    ///
    /// The registration list itself is never reordered, so each permutation
    /// depends only on the RNG state, not on previous shuffles.
    pub fn begin_pass(&mut self, rng: &mut impl Rng) -> Vec<Entity> {
        let mut order = self.agents.clone();
        order.shuffle(rng);
        order
    }

    /// Close the pass started by `begin_pass`
    pub fn finish_pass(&mut self) {
        self.steps += 1;
    }

    /// Run one full pass, calling `activate` once per agent
    pub fn step(&mut self, rng: &mut impl Rng, mut activate: impl FnMut(Entity)) {
        for agent in self.begin_pass(rng) {
            activate(agent);
        }
        self.finish_pass();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn scheduler_with(n: usize) -> (RandomActivation, Vec<Entity>) {
        let mut world = World::new();
        let mut scheduler = RandomActivation::new();
        let agents: Vec<Entity> = (0..n).map(|_| world.spawn_empty().id()).collect();
        for &agent in &agents {
            assert!(scheduler.add(agent));
        }
        (scheduler, agents)
    }

    #[test]
    fn test_add_refuses_duplicates() {
        let (mut scheduler, agents) = scheduler_with(2);
        assert!(!scheduler.add(agents[0]));
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn test_step_activates_each_agent_once() {
        let (mut scheduler, agents) = scheduler_with(25);
        let mut rng = SmallRng::seed_from_u64(42);

        for pass in 1..=10 {
            let mut counts: HashMap<Entity, usize> = HashMap::new();
            scheduler.step(&mut rng, |agent| *counts.entry(agent).or_insert(0) += 1);

            assert_eq!(counts.len(), agents.len());
            assert!(counts.values().all(|&c| c == 1));
            assert_eq!(scheduler.steps(), pass);
        }
    }

    #[test]
    fn test_order_reshuffled_each_pass() {
        let (mut scheduler, _) = scheduler_with(10);
        let mut rng = SmallRng::seed_from_u64(3);

        let orders: Vec<Vec<Entity>> = (0..5)
            .map(|_| {
                let order = scheduler.begin_pass(&mut rng);
                scheduler.finish_pass();
                order
            })
            .collect();

        assert!(orders.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_same_seed_same_order() {
        let (mut first, _) = scheduler_with(10);
        let mut second = RandomActivation::new();
        for &agent in first.agents() {
            second.add(agent);
        }

        let mut rng1 = SmallRng::seed_from_u64(99);
        let mut rng2 = SmallRng::seed_from_u64(99);
        assert_eq!(first.begin_pass(&mut rng1), second.begin_pass(&mut rng2));
    }
}
