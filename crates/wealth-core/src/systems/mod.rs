//! ECS Systems
//!
//! Scheduling, agent exchange behavior, and metrics collection.

pub mod exchange;
pub mod metrics;
pub mod scheduler;

pub use exchange::{
    activate_agent, activate_agents, choose_peer, settle, Activation, ExchangeRules, StepReport,
    Transfer,
};
pub use metrics::collect_metrics;
pub use scheduler::RandomActivation;
