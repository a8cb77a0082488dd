pub mod q_table;
pub mod tabular;
pub mod td;

pub use q_table::{EpisodeSummary, QTableAgent, QTableAgentConfig};
pub use td::QLearning;
