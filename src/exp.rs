/// Represents a single experience or transition in the environment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exp<S, A> {
    /// The state of the environment before taking the action
    pub state: S,
    /// The action taken in the given state
    pub action: A,
    /// The state of the environment after the action is taken
    pub next_state: S,
    /// The reward received after taking the action
    pub reward: f32,
}
