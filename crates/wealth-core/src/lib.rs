//! Wealth-exchange grid simulation.
//!
//! Agents wander a toroidal grid and trade single units of wealth with
//! whoever shares their cell. Each step activates every agent once in a
//! fresh random order, then records a Gini-style inequality index.
//!
//! # Modules
//!
//! - [`components`]: agent components and the multi-occupancy grid
//! - [`systems`]: random activation, the give/take rule, metrics sampling
//! - [`output`]: inequality index and data collector
//! - [`config`]: TOML configuration
//! - [`model`]: the `MoneyModel` facade that wires everything into a schedule

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod systems;

pub use components::*;
pub use config::{Config, ConfigError, ExchangeConfig, MetricsConfig, ModelConfig};
pub use error::ModelError;
pub use model::MoneyModel;
pub use output::{inequality_index, DataCollector};
pub use systems::{Activation, ExchangeRules, RandomActivation, StepReport, Transfer};
pub use wealth_events::{AgentSnapshot, AgentWealthRecord, CollectionTiming, ModelSnapshot, StepMetrics};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
