//! Grid Components
//!
//! Agent positions and the multi-occupancy lattice that tracks them.

use bevy_ecs::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Component: An agent's current cell
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Errors raised by grid membership updates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("position {pos} is outside the {width}x{height} grid")]
    OutOfBounds { pos: GridPos, width: u32, height: u32 },
    #[error("agent {agent:?} is not a member of cell {pos}")]
    NotInCell { agent: Entity, pos: GridPos },
    #[error("agent {agent:?} is already placed")]
    AlreadyPlaced { agent: Entity },
    #[error("agent {agent:?} has no position")]
    Unplaced { agent: Entity },
}

/// Resource: Width x height lattice where each cell holds any number of agents
///
/// Cells are keyed by coordinate; empty cells have no entry. Membership lists
/// keep insertion order so `cell_contents` is stable between moves.
#[derive(Resource, Debug, Clone)]
pub struct MultiGrid {
    width: u32,
    height: u32,
    torus: bool,
    cells: HashMap<GridPos, Vec<Entity>>,
    placed: HashSet<Entity>,
}

impl MultiGrid {
    pub fn new(width: u32, height: u32, torus: bool) -> Self {
        Self {
            width,
            height,
            torus,
            cells: HashMap::new(),
            placed: HashSet::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_torus(&self) -> bool {
        self.torus
    }

    /// Number of agents currently placed on the grid
    pub fn agent_count(&self) -> usize {
        self.placed.len()
    }

    pub fn out_of_bounds(&self, pos: GridPos) -> bool {
        pos.x >= self.width || pos.y >= self.height
    }

    /// Uniformly random cell, x drawn before y
    pub fn random_cell(&self, rng: &mut impl Rng) -> GridPos {
        let x = rng.gen_range(0..self.width);
        let y = rng.gen_range(0..self.height);
        GridPos::new(x, y)
    }

    /// Moore neighborhood of `pos`.
    ///
    /// Offsets are visited row by row (dy, then dx, each -1..=1). On a torus
    /// every offset wraps; otherwise offsets past an edge are dropped. Offsets
    /// that land on the same cell (possible when a side is shorter than 3)
    /// are reported once, and the wrapped image of an offset may be `pos`
    /// itself even when `include_center` is false.
    pub fn neighborhood(&self, pos: GridPos, include_center: bool) -> Vec<GridPos> {
        let mut result = Vec::with_capacity(9);
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 && !include_center {
                    continue;
                }
                let Some(cell) = self.offset(pos, dx, dy) else {
                    continue;
                };
                if !result.contains(&cell) {
                    result.push(cell);
                }
            }
        }
        result
    }

    fn offset(&self, pos: GridPos, dx: i64, dy: i64) -> Option<GridPos> {
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let mut x = i64::from(pos.x) + dx;
        let mut y = i64::from(pos.y) + dy;
        if self.torus {
            x = x.rem_euclid(w);
            y = y.rem_euclid(h);
        } else if x < 0 || x >= w || y < 0 || y >= h {
            return None;
        }
        Some(GridPos::new(x as u32, y as u32))
    }

    /// Agents occupying `pos`, in the order they arrived
    pub fn cell_contents(&self, pos: GridPos) -> &[Entity] {
        self.cells.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_cell_empty(&self, pos: GridPos) -> bool {
        self.cell_contents(pos).is_empty()
    }

    /// Insert a not-yet-placed agent into `pos`
    pub fn place_agent(&mut self, agent: Entity, pos: GridPos) -> Result<GridPos, GridError> {
        self.check_bounds(pos)?;
        if !self.placed.insert(agent) {
            return Err(GridError::AlreadyPlaced { agent });
        }
        self.cells.entry(pos).or_default().push(agent);
        Ok(pos)
    }

    /// Move an agent from its recorded cell to `to`, updating the record.
    ///
    /// Both checks run before anything is touched, so on error neither the
    /// membership lists nor `current` change.
    pub fn move_agent(
        &mut self,
        agent: Entity,
        current: &mut GridPos,
        to: GridPos,
    ) -> Result<(), GridError> {
        self.check_bounds(to)?;
        let from = *current;
        let index = self
            .cells
            .get(&from)
            .and_then(|members| members.iter().position(|&e| e == agent))
            .ok_or(GridError::NotInCell { agent, pos: from })?;

        if from == to {
            return Ok(());
        }

        if let Some(members) = self.cells.get_mut(&from) {
            members.remove(index);
            if members.is_empty() {
                self.cells.remove(&from);
            }
        }
        self.cells.entry(to).or_default().push(agent);
        *current = to;
        Ok(())
    }

    /// Occupied cells and their members
    pub fn occupied_cells(&self) -> impl Iterator<Item = (GridPos, &[Entity])> + '_ {
        self.cells.iter().map(|(pos, members)| (*pos, members.as_slice()))
    }

    fn check_bounds(&self, pos: GridPos) -> Result<(), GridError> {
        if self.out_of_bounds(pos) {
            return Err(GridError::OutOfBounds {
                pos,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
