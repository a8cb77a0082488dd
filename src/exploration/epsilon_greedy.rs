use rand::{seq::SliceRandom, Rng};

use crate::{
    algo::tabular::{ActionValueTable, Hashable},
    ensure_interval, Error, Result, State,
};

use super::Choice;

/// Epsilon greedy exploration policy with a constant epsilon threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f32,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy policy with the probability of exploring
    ///
    /// **Errors** if `epsilon` is not in the interval `[0,1]`
    pub fn new(epsilon: f32) -> Result<Self> {
        ensure_interval!(epsilon, 0.0, 1.0);
        Ok(Self { epsilon })
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Decide whether to explore or exploit on this draw
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Pick one of `actions` for `state`
    ///
    /// Exploring draws uniformly from `actions`. Exploiting draws uniformly among the
    /// actions whose estimate equals the maximum, so ties carry no positional bias.
    ///
    /// **Errors** if `actions` is empty or holds an action the table was not configured with
    pub fn select_action<A, R, const N: usize>(
        &self,
        state: &State<N>,
        table: &mut ActionValueTable<A, N>,
        actions: &[A],
        rng: &mut R,
    ) -> Result<A>
    where
        A: Hashable,
        R: Rng + ?Sized,
    {
        if actions.is_empty() {
            return Err(Error::EmptyActionSet);
        }
        if let Some(a) = actions.iter().find(|a| table.index_of(a).is_err()) {
            return Err(Error::invalid_action(a));
        }

        match self.choose(rng) {
            Choice::Explore => Ok(*actions.choose(rng).expect("`actions` is not empty")),
            Choice::Exploit => {
                let q_values = actions
                    .iter()
                    .map(|&a| table.get(state, a))
                    .collect::<Result<Vec<_>>>()?;
                let max = q_values.iter().copied().reduce(f32::max).unwrap_or(f32::NAN);
                let best = actions
                    .iter()
                    .zip(&q_values)
                    .filter(|&(_, &q)| q == max)
                    .map(|(&a, _)| a)
                    .collect::<Vec<_>>();
                // all-NaN rows have no maximizer, fall back to a uniform draw
                let pool: &[A] = if best.is_empty() { actions } else { &best };
                Ok(*pool.choose(rng).expect("`pool` is not empty"))
            }
        }
    }
}
