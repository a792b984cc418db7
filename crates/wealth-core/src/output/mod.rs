//! Output Module
//!
//! Inequality statistic and the data collector that records it.

pub mod collector;
pub mod inequality;

pub use collector::DataCollector;
pub use inequality::inequality_index;
