use crate::{
    algo::tabular::{ActionValueTable, Hashable},
    ensure_interval, Error, Result, State,
};

/// One-step Q-learning backup
///
/// Q(s,a) ← (1 - α) Q(s,a) + α (r + γ max<sub>a'</sub> Q(s',a'))
///
/// The target always bootstraps from `next_state`. A terminal transition only
/// contributes a zero future value if the caller has marked `next_state` terminal
/// in the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QLearning {
    alpha: f32,
    gamma: f32,
}

impl QLearning {
    /// ### Parameters
    /// - `alpha` - The learning rate - must be between 0 and 1
    /// - `gamma` - The discount factor - must be between 0 and 1
    pub fn new(alpha: f32, gamma: f32) -> Result<Self> {
        ensure_interval!(alpha, 0.0, 1.0);
        ensure_interval!(gamma, 0.0, 1.0);
        Ok(Self { alpha, gamma })
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Apply the backup for one transition and return the new estimate
    pub fn update<A: Hashable, const N: usize>(
        &self,
        table: &mut ActionValueTable<A, N>,
        state: &State<N>,
        action: A,
        next_state: &State<N>,
        reward: f32,
    ) -> Result<f32> {
        if !reward.is_finite() {
            return Err(Error::NonFiniteReward { reward });
        }
        let q_value = table.get(state, action)?;
        let max_next_q = table.get_max(next_state);
        let target = reward + self.gamma * max_next_q;
        let new_q_value = (1.0 - self.alpha) * q_value + self.alpha * target;
        table.set(state, action, new_q_value)?;
        Ok(new_q_value)
    }
}
