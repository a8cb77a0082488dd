/// The outcome of a single environment step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<S> {
    /// The state of the environment after the action was applied
    pub state: S,
    /// The reward received for the action
    pub reward: f32,
    /// Whether the episode ended with this step
    pub done: bool,
}

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent
/// and a finite action space. Episode boundaries are signalled through [`Step::done`];
/// the agent never special-cases terminal states on its own.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action;

    /// Observe the current state without changing it
    fn observe(&self) -> Self::State;

    /// Update the environment in response to an action taken by an agent, producing a new state and associated reward
    fn step(&mut self, action: Self::Action) -> Step<Self::State>;

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::State;

    /// A one-dimensional corridor with the goal at position `len`
    ///
    /// Action `true` moves right, `false` moves left. Reaching the goal yields reward 1.
    pub struct Corridor {
        pub pos: i32,
        pub len: i32,
    }

    impl Corridor {
        pub fn new(len: i32) -> Self {
            Self { pos: 0, len }
        }
    }

    impl Environment for Corridor {
        type State = State<1>;
        type Action = bool;

        fn observe(&self) -> Self::State {
            State::new([self.pos as f32])
        }

        fn step(&mut self, action: Self::Action) -> Step<Self::State> {
            self.pos = if action { self.pos + 1 } else { (self.pos - 1).max(0) };
            let done = self.pos == self.len;
            Step {
                state: self.observe(),
                reward: if done { 1.0 } else { 0.0 },
                done,
            }
        }

        fn reset(&mut self) -> Self::State {
            self.pos = 0;
            self.observe()
        }
    }

    #[test]
    fn corridor_reaches_goal() {
        let mut env = Corridor::new(2);
        assert_eq!(env.reset(), State::new([0.0]));
        assert!(!env.step(true).done);
        let last = env.step(true);
        assert!(last.done);
        assert_eq!(last.reward, 1.0);
        assert_eq!(last.state, State::new([2.0]));
    }
}
