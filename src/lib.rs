//! Tabular Q-learning for a ball-and-goal pitch
//!
//! The [`QTableAgent`] keeps one value estimate per exact [`State`] and action, picks
//! actions epsilon-greedily with an injected random source, and learns with one-step
//! Q-learning backups. Tables can be saved to and restored from disk.

/// Implemented RL algorithms
pub mod algo;

/// Environment
pub mod env;

mod error;

/// Recorded transitions
pub mod exp;

/// Exploration policies
pub mod exploration;

/// Saving and loading action-value tables
pub mod persist;

/// Environment states
pub mod state;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

mod util;

pub use algo::{tabular::ActionValueTable, QTableAgent, QTableAgentConfig};
pub use error::{Error, Result};
pub use state::State;
