//! Model construction and query errors.

use crate::components::grid::GridError;
use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
    #[error("no agent with id {0}")]
    UnknownAgent(u32),
}
