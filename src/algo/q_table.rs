use std::path::Path;

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    algo::{
        tabular::{ActionValueTable, Hashable},
        td::QLearning,
    },
    env::{Environment, Step},
    exploration::EpsilonGreedy,
    exp::Exp,
    Error, Result, State,
};

/// Configuration for the [`QTableAgent`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QTableAgentConfig {
    /// The learning rate - must be between 0 and 1
    ///
    /// **Default**: `0.1`
    pub alpha: f32,
    /// The discount factor - must be between 0 and 1
    ///
    /// **Default**: `0.9`
    pub gamma: f32,
    /// The probability of taking a random action - must be between 0 and 1
    ///
    /// **Default**: `0.8`
    pub epsilon: f32,
    /// Upper bound on the steps [`QTableAgent::go`] takes before giving up on an episode
    ///
    /// **Default**: `10_000`
    pub max_steps: u32,
}

impl Default for QTableAgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.8,
            max_steps: 10_000,
        }
    }
}

/// What happened during one call to [`QTableAgent::go`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeSummary {
    pub steps: u32,
    pub reward: f32,
    /// Whether the environment reported the end of the episode before `max_steps`
    pub done: bool,
}

/// A simple Q-learning agent that utilizes a Q-table to learn its environment
///
/// ### Generics
/// - `A` - The action type. The action set is fixed when the agent is built
/// - `N` - The number of features in a [`State`]
/// - `R` - The source of randomness for exploration, seedable for reproducible runs
pub struct QTableAgent<A, const N: usize, R = StdRng>
where
    A: Hashable,
    R: Rng,
{
    table: ActionValueTable<A, N>,
    actions: Vec<A>,
    exploration: EpsilonGreedy,
    update: QLearning,
    config: QTableAgentConfig,
    rng: R,
    episode: u32, // current episode
}

impl<A: Hashable, const N: usize> QTableAgent<A, N> {
    /// Initialize a new `QTableAgent` with an entropy-seeded random source
    pub fn new(config: QTableAgentConfig, actions: Vec<A>) -> Result<Self> {
        Self::with_rng(config, actions, StdRng::from_entropy())
    }

    /// Initialize a new `QTableAgent` whose choices are reproducible from `seed`
    pub fn seeded(config: QTableAgentConfig, actions: Vec<A>, seed: u64) -> Result<Self> {
        Self::with_rng(config, actions, StdRng::seed_from_u64(seed))
    }
}

impl<A, const N: usize, R> QTableAgent<A, N, R>
where
    A: Hashable,
    R: Rng,
{
    /// Initialize a new `QTableAgent` with a caller-supplied random source
    ///
    /// **Errors** if `actions` is empty or has duplicates, or if `alpha`, `gamma` or
    /// `epsilon` is not in the interval `[0,1]`
    pub fn with_rng(config: QTableAgentConfig, actions: Vec<A>, rng: R) -> Result<Self> {
        let update = QLearning::new(config.alpha, config.gamma)?;
        let exploration = EpsilonGreedy::new(config.epsilon)?;
        let table = ActionValueTable::new(actions.clone())?;
        Ok(Self {
            table,
            actions,
            exploration,
            update,
            config,
            rng,
            episode: 0,
        })
    }

    pub fn config(&self) -> &QTableAgentConfig {
        &self.config
    }

    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    pub fn table(&self) -> &ActionValueTable<A, N> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ActionValueTable<A, N> {
        &mut self.table
    }

    pub fn into_table(self) -> ActionValueTable<A, N> {
        self.table
    }

    /// Number of episodes completed by [`go`](Self::go)
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Choose an action for `state` from the configured set
    pub fn select_action(&mut self, state: &State<N>) -> Result<A> {
        self.exploration
            .select_action(state, &mut self.table, &self.actions, &mut self.rng)
    }

    /// Learn from one transition and return the updated estimate for `(state, action)`
    pub fn learn(
        &mut self,
        state: &State<N>,
        action: A,
        next_state: &State<N>,
        reward: f32,
    ) -> Result<f32> {
        self.update
            .update(&mut self.table, state, action, next_state, reward)
    }

    /// Learn from a recorded [experience](Exp)
    pub fn learn_from(&mut self, experience: Exp<State<N>, A>) -> Result<f32> {
        let Exp {
            state,
            action,
            next_state,
            reward,
        } = experience;
        self.learn(&state, action, &next_state, reward)
    }

    /// Run one episode in the given environment
    ///
    /// The environment is reset, then the agent acts and learns from every transition
    /// until the environment reports `done` or `max_steps` is reached.
    pub fn go<E>(&mut self, env: &mut E) -> Result<EpisodeSummary>
    where
        E: Environment<State = State<N>, Action = A>,
    {
        let mut summary = EpisodeSummary::default();
        let mut state = env.reset();

        while summary.steps < self.config.max_steps {
            let action = self.select_action(&state)?;
            let Step {
                state: next_state,
                reward,
                done,
            } = env.step(action);

            self.learn(&state, action, &next_state, reward)?;
            summary.steps += 1;
            summary.reward += reward;
            state = next_state;

            if done {
                summary.done = true;
                break;
            }
        }

        debug!(
            "episode {} finished after {} steps with reward {} (done: {})",
            self.episode, summary.steps, summary.reward, summary.done
        );
        self.episode += 1;
        Ok(summary)
    }
}

impl<A, const N: usize, R> QTableAgent<A, N, R>
where
    A: Hashable + Serialize + DeserializeOwned,
    R: Rng,
{
    /// Save the agent's table to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.table.save(path)
    }

    /// Replace the agent's table with one loaded from `path`
    ///
    /// The current table is kept if loading fails, or if the stored actions differ from
    /// the agent's configured actions.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let table = ActionValueTable::load(path)?;
        if table.actions() != self.actions.as_slice() {
            return Err(Error::ActionSetMismatch {
                stored: format!("{:?}", table.actions()),
                configured: format!("{:?}", self.actions),
            });
        }
        self.table = table;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::env::tests::Corridor;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    enum Dir {
        Up,
        Down,
        Left,
        Right,
    }

    const DIRS: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    fn greedy() -> QTableAgentConfig {
        QTableAgentConfig {
            epsilon: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn construction_is_validated() {
        assert!(matches!(
            QTableAgent::<Dir, 2>::new(Default::default(), vec![]),
            Err(Error::EmptyActionSet)
        ));
        let bad = QTableAgentConfig {
            gamma: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            QTableAgent::<Dir, 2>::new(bad, DIRS.to_vec()),
            Err(Error::OutOfInterval { .. })
        ));
        let nan = QTableAgentConfig {
            epsilon: f32::NAN,
            ..Default::default()
        };
        assert!(QTableAgent::<Dir, 2>::new(nan, DIRS.to_vec()).is_err());
    }

    #[test]
    fn learn_updates_only_the_taken_action() {
        let mut agent = QTableAgent::<Dir, 2>::seeded(greedy(), DIRS.to_vec(), 0).unwrap();
        let s = State::new([400.0, 300.0]);
        let s_next = State::new([400.0, 295.0]);

        assert_eq!(agent.learn(&s, Dir::Up, &s_next, 1.0).unwrap(), 0.1);

        let t = agent.table_mut();
        assert_eq!(t.get(&s, Dir::Up).unwrap(), 0.1);
        for d in [Dir::Down, Dir::Left, Dir::Right] {
            assert_eq!(t.get(&s, d).unwrap(), 0.0);
        }
    }

    #[test]
    fn greedy_agent_follows_learned_value() {
        let mut agent = QTableAgent::<Dir, 2>::seeded(greedy(), DIRS.to_vec(), 5).unwrap();
        let s = State::new([1.0, 1.0]);
        agent
            .learn_from(Exp {
                state: s,
                action: Dir::Left,
                next_state: s,
                reward: 1.0,
            })
            .unwrap();
        for _ in 0..100 {
            assert_eq!(agent.select_action(&s).unwrap(), Dir::Left);
        }
    }

    #[test]
    fn same_seed_same_episode() {
        let config = QTableAgentConfig {
            epsilon: 0.5,
            max_steps: 200,
            ..Default::default()
        };
        let run = || {
            let mut agent = QTableAgent::<bool, 1>::seeded(config, vec![false, true], 42).unwrap();
            let mut env = Corridor::new(4);
            let summaries = (0..5)
                .map(|_| agent.go(&mut env).unwrap())
                .collect::<Vec<_>>();
            (summaries, agent.into_table())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn go_learns_a_corridor() {
        let config = QTableAgentConfig {
            alpha: 0.5,
            gamma: 0.9,
            epsilon: 0.3,
            max_steps: 500,
        };
        let mut agent = QTableAgent::<bool, 1>::seeded(config, vec![false, true], 9).unwrap();
        let mut env = Corridor::new(3);
        agent.table_mut().mark_terminal(&State::new([3.0]));

        for _ in 0..200 {
            let summary = agent.go(&mut env).unwrap();
            assert!(summary.done);
            assert_eq!(summary.reward, 1.0);
        }
        assert_eq!(agent.episode(), 200);

        let t = agent.table_mut();
        for pos in 0..3 {
            let s = State::new([pos as f32]);
            assert!(
                t.get(&s, true).unwrap() > t.get(&s, false).unwrap(),
                "moving right is preferred at {pos}"
            );
        }
        assert_eq!(t.get_max(&State::new([3.0])), 0.0);
    }

    #[test]
    fn go_stops_at_max_steps() {
        let config = QTableAgentConfig {
            max_steps: 3,
            ..greedy()
        };
        // only moving left, the goal is never reached
        let mut agent = QTableAgent::<bool, 1>::seeded(config, vec![false], 0).unwrap();
        let mut env = Corridor::new(5);
        let summary = agent.go(&mut env).unwrap();
        assert_eq!(
            summary,
            EpisodeSummary {
                steps: 3,
                reward: 0.0,
                done: false
            }
        );
    }

    #[test]
    fn save_and_load_through_the_agent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agent.msgpack");

        let mut trained = QTableAgent::<Dir, 2>::seeded(greedy(), DIRS.to_vec(), 1).unwrap();
        let s = State::new([10.0, 20.0]);
        trained.learn(&s, Dir::Right, &s, 2.0).unwrap();
        trained.save(&path).unwrap();

        let mut fresh = QTableAgent::<Dir, 2>::seeded(greedy(), DIRS.to_vec(), 1).unwrap();
        fresh.load(&path).unwrap();
        assert_eq!(fresh.table(), trained.table());
        assert_eq!(fresh.select_action(&s).unwrap(), Dir::Right);
    }

    #[test]
    fn failed_load_keeps_the_current_table() {
        let dir = TempDir::new().unwrap();
        let mut agent = QTableAgent::<Dir, 2>::seeded(greedy(), DIRS.to_vec(), 1).unwrap();
        let s = State::new([0.0, 0.0]);
        agent.learn(&s, Dir::Up, &s, 1.0).unwrap();
        let before = agent.table().clone();

        let missing = dir.path().join("missing.msgpack");
        assert!(matches!(agent.load(&missing), Err(Error::NotFound { .. })));

        let corrupt = dir.path().join("corrupt.msgpack");
        std::fs::write(&corrupt, b"definitely not a q-table").unwrap();
        assert!(matches!(agent.load(&corrupt), Err(Error::CorruptData { .. })));

        let other = QTableAgent::<Dir, 2>::seeded(greedy(), vec![Dir::Up, Dir::Down], 1).unwrap();
        let mismatched = dir.path().join("mismatched.msgpack");
        other.save(&mismatched).unwrap();
        assert!(matches!(
            agent.load(&mismatched),
            Err(Error::ActionSetMismatch { .. })
        ));

        assert_eq!(agent.table(), &before);
    }
}
