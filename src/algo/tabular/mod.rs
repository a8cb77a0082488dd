pub mod action_values;

pub use action_values::ActionValueTable;

/// A trait for action types that can be used as keys in a [`HashMap`](std::collections::HashMap)
/// and reported in errors
pub trait Hashable: Copy + Eq + std::hash::Hash + std::fmt::Debug {}

impl<T> Hashable for T where T: Copy + Eq + std::hash::Hash + std::fmt::Debug {}
