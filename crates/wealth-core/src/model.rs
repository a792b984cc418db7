//! Money Model
//!
//! Owns the ECS world (agents, grid, scheduler, RNG, collector) and the
//! schedule that advances it one pass at a time.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use wealth_events::{generate_snapshot_id, AgentSnapshot, CollectionTiming, ModelSnapshot};

use crate::components::agent::{AgentBundle, Wealth};
use crate::components::grid::{GridPos, MultiGrid};
use crate::config::Config;
use crate::error::ModelError;
use crate::output::{inequality_index, DataCollector};
use crate::systems::{activate_agents, collect_metrics, ExchangeRules, RandomActivation, StepReport};
use crate::SimRng;

/// A population of wealth-trading agents on a grid
pub struct MoneyModel {
    world: World,
    schedule: Schedule,
    /// Indexed by agent id
    agents: Vec<Entity>,
    running: bool,
}

impl MoneyModel {
    /// Model with default options and an entropy-seeded RNG
    pub fn new(population: u32, width: u32, height: u32) -> Result<Self, ModelError> {
        Self::from_config(&Config::with_size(population, width, height))
    }

    /// Model with default options and a fixed seed
    pub fn seeded(population: u32, width: u32, height: u32, seed: u64) -> Result<Self, ModelError> {
        let mut config = Config::with_size(population, width, height);
        config.model.seed = Some(seed);
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self, ModelError> {
        let rng = match config.model.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Build the model, drawing initial placement and every later random
    /// choice from `rng`.
    pub fn with_rng(config: &Config, mut rng: SmallRng) -> Result<Self, ModelError> {
        config.validate()?;
        let settings = &config.model;

        let mut world = World::new();
        let mut grid = MultiGrid::new(settings.width, settings.height, settings.torus);
        let mut scheduler = RandomActivation::new();
        let mut agents = Vec::with_capacity(settings.population as usize);

        for id in 0..settings.population {
            let cell = grid.random_cell(&mut rng);
            let entity = world
                .spawn((AgentBundle::new(id, settings.initial_wealth), cell))
                .id();
            grid.place_agent(entity, cell)?;
            scheduler.add(entity);
            agents.push(entity);
        }

        world.insert_resource(grid);
        world.insert_resource(scheduler);
        world.insert_resource(SimRng(rng));
        world.insert_resource(ExchangeRules {
            allow_self_pick: config.exchange.allow_self_pick,
        });
        world.insert_resource(DataCollector::new(
            config.metrics.timing,
            config.metrics.record_agents,
        ));
        world.insert_resource(StepReport::default());

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        match config.metrics.timing {
            CollectionTiming::AfterStep => {
                schedule.add_systems((activate_agents, collect_metrics).chain());
            }
            CollectionTiming::BeforeStep => {
                schedule.add_systems((collect_metrics, activate_agents).chain());
            }
        }

        tracing::info!(
            "Created model: {} agents on a {}x{} grid (torus: {}, collect {})",
            settings.population,
            settings.width,
            settings.height,
            settings.torus,
            config.metrics.timing.as_str()
        );

        Ok(Self {
            world,
            schedule,
            agents,
            running: true,
        })
    }

    /// One scheduler pass plus one collector row
    pub fn step(&mut self) {
        self.schedule.run(&mut self.world);
    }

    /// Step up to `steps` times, stopping early once `running` is cleared.
    /// Returns the number of steps taken.
    pub fn run(&mut self, steps: u64) -> u64 {
        let mut taken = 0;
        while taken < steps && self.running {
            self.step();
            taken += 1;
        }
        taken
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Completed scheduler passes
    pub fn steps(&self) -> u64 {
        self.world.resource::<RandomActivation>().steps()
    }

    pub fn population(&self) -> usize {
        self.agents.len()
    }

    pub fn entity(&self, agent_id: u32) -> Option<Entity> {
        self.agents.get(agent_id as usize).copied()
    }

    pub fn wealth(&self, agent_id: u32) -> Result<u32, ModelError> {
        self.entity(agent_id)
            .and_then(|e| self.world.get::<Wealth>(e))
            .map(|w| w.0)
            .ok_or(ModelError::UnknownAgent(agent_id))
    }

    pub fn position(&self, agent_id: u32) -> Result<GridPos, ModelError> {
        self.entity(agent_id)
            .and_then(|e| self.world.get::<GridPos>(e))
            .copied()
            .ok_or(ModelError::UnknownAgent(agent_id))
    }

    /// Current wealth of every agent, indexed by agent id
    pub fn wealths(&self) -> Vec<u32> {
        self.agents
            .iter()
            .map(|&e| self.world.get::<Wealth>(e).map_or(0, |w| w.0))
            .collect()
    }

    pub fn total_wealth(&self) -> u64 {
        self.wealths().iter().map(|&w| u64::from(w)).sum()
    }

    /// Inequality index of the current distribution
    pub fn inequality(&self) -> f64 {
        inequality_index(&self.wealths())
    }

    pub fn grid(&self) -> &MultiGrid {
        self.world.resource::<MultiGrid>()
    }

    pub fn collector(&self) -> &DataCollector {
        self.world.resource::<DataCollector>()
    }

    /// Activation summary of the most recent pass
    pub fn last_report(&self) -> &StepReport {
        self.world.resource::<StepReport>()
    }

    pub fn gini_series(&self) -> Vec<f64> {
        self.collector().gini_series()
    }

    pub fn agent_wealth(&self, step: u64, agent_id: u32) -> Option<u32> {
        self.collector().agent_wealth(step, agent_id)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Capture the current state of every agent
    pub fn snapshot(&self) -> ModelSnapshot {
        let step = self.steps();
        let agents: Vec<AgentSnapshot> = self
            .agents
            .iter()
            .enumerate()
            .map(|(id, &e)| {
                let pos = self.world.get::<GridPos>(e).copied().unwrap_or(GridPos::new(0, 0));
                AgentSnapshot {
                    agent_id: id as u32,
                    wealth: self.world.get::<Wealth>(e).map_or(0, |w| w.0),
                    x: pos.x,
                    y: pos.y,
                }
            })
            .collect();
        let grid = self.grid();

        ModelSnapshot {
            snapshot_id: generate_snapshot_id(step),
            step,
            width: grid.width(),
            height: grid.height(),
            gini: self.inequality(),
            total_wealth: self.total_wealth(),
            agents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let model = MoneyModel::seeded(30, 6, 4, 1).unwrap();

        assert_eq!(model.population(), 30);
        assert_eq!(model.steps(), 0);
        assert!(model.running());
        assert_eq!(model.wealths(), vec![1; 30]);
        assert_eq!(model.grid().agent_count(), 30);
        assert!(model.collector().is_empty());
        for id in 0..30 {
            let pos = model.position(id).unwrap();
            assert!(!model.grid().out_of_bounds(pos));
            assert!(model.grid().cell_contents(pos).contains(&model.entity(id).unwrap()));
        }
    }

    #[test]
    fn test_rejects_invalid_sizes() {
        assert!(matches!(MoneyModel::new(0, 10, 10), Err(ModelError::Config(_))));
        assert!(matches!(MoneyModel::new(10, 0, 10), Err(ModelError::Config(_))));
        assert!(matches!(MoneyModel::new(10, 10, 0), Err(ModelError::Config(_))));
    }

    #[test]
    fn test_large_initial_wealth() {
        let mut config = Config::with_size(2, 1, 1);
        config.model.seed = Some(1);
        config.model.initial_wealth = u32::MAX;
        assert!(matches!(MoneyModel::from_config(&config), Err(ModelError::Config(_))));

        config.model.initial_wealth = u32::MAX / 2;
        let mut model = MoneyModel::from_config(&config).unwrap();
        model.run(10);
        assert_eq!(model.total_wealth(), u64::from(u32::MAX / 2) * 2);
    }

    #[test]
    fn test_step_appends_one_row() {
        let mut model = MoneyModel::seeded(20, 5, 5, 2).unwrap();
        model.step();
        model.step();

        assert_eq!(model.steps(), 2);
        let rows = model.collector().model_vars();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].step, 1);
        assert_eq!(rows[1].step, 2);
        assert_eq!(model.collector().agent_vars().len(), 40);
        assert_eq!(model.last_report().activations, 20);
    }

    #[test]
    fn test_run_respects_running_flag() {
        let mut model = MoneyModel::seeded(5, 3, 3, 3).unwrap();
        assert_eq!(model.run(4), 4);

        model.set_running(false);
        assert_eq!(model.run(10), 0);
        assert_eq!(model.steps(), 4);
    }

    #[test]
    fn test_unknown_agent() {
        let model = MoneyModel::seeded(3, 3, 3, 4).unwrap();
        assert!(matches!(model.wealth(3), Err(ModelError::UnknownAgent(3))));
        assert!(model.position(99).is_err());
        assert_eq!(model.wealth(2).unwrap(), 1);
    }

    #[test]
    fn test_snapshot_matches_state() {
        let mut model = MoneyModel::seeded(8, 4, 4, 5).unwrap();
        model.run(3);
        let snapshot = model.snapshot();

        assert_eq!(snapshot.step, 3);
        assert_eq!(snapshot.snapshot_id, "snap_000003");
        assert_eq!(snapshot.total_wealth, 8);
        assert_eq!(snapshot.agents.len(), 8);
        for agent in &snapshot.agents {
            let pos = model.position(agent.agent_id).unwrap();
            assert_eq!((agent.x, agent.y), (pos.x, pos.y));
            assert_eq!(agent.wealth, model.wealth(agent.agent_id).unwrap());
        }
    }
}
