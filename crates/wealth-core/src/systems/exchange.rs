//! Exchange System
//!
//! Per-activation agent behavior: step to a random neighboring cell, then give
//! to or take from one cellmate depending on whether the agent has wealth.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::components::agent::Wealth;
use crate::components::grid::{GridError, GridPos, MultiGrid};
use crate::systems::scheduler::RandomActivation;
use crate::SimRng;

/// Constants for the give/take rule
pub mod exchange_constants {
    /// Units handed to a cellmate by an agent with wealth
    pub const GIFT: u32 = 1;
    /// A peer holding more than this loses `LARGE_TAKE` to a broke agent
    pub const RICH_PEER_THRESHOLD: u32 = 3;
    /// Units taken from a rich peer
    pub const LARGE_TAKE: u32 = 3;
    /// Units taken from a peer with 1..=RICH_PEER_THRESHOLD
    pub const SMALL_TAKE: u32 = 1;
}

/// Resource: Exchange options
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ExchangeRules {
    /// Draw the peer from every cellmate including the acting agent.
    /// Drawing oneself makes the exchange a no-op.
    pub allow_self_pick: bool,
}

/// Wealth moved by one exchange, seen from the acting agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    ToPeer(u32),
    FromPeer(u32),
    Nothing,
}

impl Transfer {
    /// Apply to both balances. Never drives either side below zero or past
    /// `u32::MAX`; the moved amount shrinks to fit instead.
    pub fn apply(self, own: &mut Wealth, peer: &mut Wealth) {
        match self {
            Transfer::ToPeer(units) => {
                let units = units.min(own.0).min(u32::MAX - peer.0);
                own.0 -= units;
                peer.0 += units;
            }
            Transfer::FromPeer(units) => {
                let units = units.min(peer.0).min(u32::MAX - own.0);
                peer.0 -= units;
                own.0 += units;
            }
            Transfer::Nothing => {}
        }
    }
}

/// Decide the transfer between an acting agent and its chosen peer
pub fn settle(own: Wealth, peer: Wealth) -> Transfer {
    use exchange_constants::*;

    if own.0 > 0 {
        Transfer::ToPeer(GIFT)
    } else if peer.0 > RICH_PEER_THRESHOLD {
        Transfer::FromPeer(LARGE_TAKE)
    } else if peer.0 > 0 {
        Transfer::FromPeer(SMALL_TAKE)
    } else {
        Transfer::Nothing
    }
}

/// Pick the exchange partner among the agents sharing a cell.
///
/// Returns None when the agent is alone. Unless `allow_self_pick` is set the
/// acting agent is never returned.
pub fn choose_peer(
    cellmates: &[Entity],
    agent: Entity,
    allow_self_pick: bool,
    rng: &mut SmallRng,
) -> Option<Entity> {
    if cellmates.len() < 2 {
        return None;
    }
    if allow_self_pick {
        return cellmates.choose(rng).copied();
    }
    let others: Vec<Entity> = cellmates.iter().copied().filter(|&e| e != agent).collect();
    others.choose(rng).copied()
}

/// What a single activation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Gave,
    Took(u32),
    Idle,
}

/// Resource: Summary of the last scheduler pass
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Completed passes once this one finished
    pub step: u64,
    pub activations: usize,
    pub gives: usize,
    pub takes: usize,
    pub units_taken: u64,
    pub idle: usize,
}

impl StepReport {
    pub fn record(&mut self, activation: Activation) {
        self.activations += 1;
        match activation {
            Activation::Gave => self.gives += 1,
            Activation::Took(units) => {
                self.takes += 1;
                self.units_taken += u64::from(units);
            }
            Activation::Idle => self.idle += 1,
        }
    }
}

/// Activate one agent: move, then exchange with a cellmate.
///
/// Requires the `MultiGrid` and `SimRng` resources.
pub fn activate_agent(world: &mut World, agent: Entity) -> Activation {
    let rules = world
        .get_resource::<ExchangeRules>()
        .copied()
        .unwrap_or_default();

    world.resource_scope(|world, mut grid: Mut<MultiGrid>| {
        world.resource_scope(|world, mut rng: Mut<SimRng>| {
            match step_to_neighbor(world, &mut grid, &mut rng.0, agent) {
                Ok(pos) => exchange(world, &grid, &mut rng.0, rules, agent, pos),
                Err(e) => {
                    tracing::error!("Skipping activation: {}", e);
                    Activation::Idle
                }
            }
        })
    })
}

fn step_to_neighbor(
    world: &mut World,
    grid: &mut MultiGrid,
    rng: &mut SmallRng,
    agent: Entity,
) -> Result<GridPos, GridError> {
    let mut pos = world
        .get_mut::<GridPos>(agent)
        .ok_or(GridError::Unplaced { agent })?;

    let choices = grid.neighborhood(*pos, false);
    if let Some(&target) = choices.choose(rng) {
        grid.move_agent(agent, &mut pos, target)?;
    }
    Ok(*pos)
}

fn exchange(
    world: &mut World,
    grid: &MultiGrid,
    rng: &mut SmallRng,
    rules: ExchangeRules,
    agent: Entity,
    pos: GridPos,
) -> Activation {
    let Some(peer) = choose_peer(grid.cell_contents(pos), agent, rules.allow_self_pick, rng) else {
        return Activation::Idle;
    };
    if peer == agent {
        return Activation::Idle;
    }

    let (Some(mut own), Some(mut other)) = (
        world.get::<Wealth>(agent).copied(),
        world.get::<Wealth>(peer).copied(),
    ) else {
        return Activation::Idle;
    };

    let transfer = settle(own, other);
    transfer.apply(&mut own, &mut other);

    if let Some(mut wealth) = world.get_mut::<Wealth>(agent) {
        *wealth = own;
    }
    if let Some(mut wealth) = world.get_mut::<Wealth>(peer) {
        *wealth = other;
    }

    match transfer {
        Transfer::ToPeer(_) => Activation::Gave,
        Transfer::FromPeer(units) => Activation::Took(units),
        Transfer::Nothing => Activation::Idle,
    }
}

/// System: One scheduler pass over every agent, in random order
pub fn activate_agents(world: &mut World) {
    let order = world.resource_scope(|world, mut scheduler: Mut<RandomActivation>| {
        let mut rng = world.resource_mut::<SimRng>();
        scheduler.begin_pass(&mut rng.0)
    });

    let mut report = StepReport::default();
    for agent in order {
        report.record(activate_agent(world, agent));
    }

    {
        let mut scheduler = world.resource_mut::<RandomActivation>();
        scheduler.finish_pass();
        report.step = scheduler.steps();
    }

    tracing::debug!(
        "[Step {:>5}] {} activations (gives: {}, takes: {}, idle: {})",
        report.step,
        report.activations,
        report.gives,
        report.takes,
        report.idle
    );
    world.insert_resource(report);
}
