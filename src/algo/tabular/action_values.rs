use std::collections::{HashMap, HashSet};

use log::trace;

use crate::{Error, Result, State};

use super::Hashable;

/// One value estimate per configured action, in configuration order
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Row {
    pub(crate) values: Box<[f32]>,
    pub(crate) terminal: bool,
}

impl Row {
    fn zeroed(len: usize) -> Self {
        Self {
            values: vec![0.0; len].into_boxed_slice(),
            terminal: false,
        }
    }
}

/// A table of action-value estimates keyed by exact [`State`]
///
/// Rows are created lazily: the first access to a state, by read or write, fills in a
/// baseline of `0.0` for every configured action, so a row is never partially populated.
///
/// ### Generics
/// - `A` - The action type, fixed to the set given at construction
/// - `N` - The number of features in a state
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValueTable<A: Hashable, const N: usize> {
    actions: Vec<A>,
    rows: HashMap<State<N>, Row>,
}

impl<A: Hashable, const N: usize> ActionValueTable<A, N> {
    /// Create an empty table over a fixed set of actions
    ///
    /// **Errors** if `actions` is empty or contains duplicates
    pub fn new(actions: Vec<A>) -> Result<Self> {
        if actions.is_empty() {
            return Err(Error::EmptyActionSet);
        }
        let mut seen = HashSet::with_capacity(actions.len());
        if let Some(dup) = actions.iter().find(|&a| !seen.insert(a)) {
            return Err(Error::DuplicateAction {
                action: format!("{dup:?}"),
            });
        }
        Ok(Self {
            actions,
            rows: HashMap::new(),
        })
    }

    /// The configured actions, in the order their values are stored
    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// Number of states observed so far
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, state: &State<N>) -> bool {
        self.rows.contains_key(state)
    }

    /// Position of `action` in the configured set
    pub fn index_of(&self, action: &A) -> Result<usize> {
        self.actions
            .iter()
            .position(|a| a == action)
            .ok_or_else(|| Error::invalid_action(action))
    }

    fn row_mut(&mut self, state: &State<N>) -> &mut Row {
        let len = self.actions.len();
        self.rows.entry(*state).or_insert_with(|| Row::zeroed(len))
    }

    /// Get the estimate for a state-action pair, initializing the state's row if unseen
    pub fn get(&mut self, state: &State<N>, action: A) -> Result<f32> {
        let i = self.index_of(&action)?;
        Ok(self.row_mut(state).values[i])
    }

    /// Get the largest estimate over all configured actions, initializing the state's row if unseen
    ///
    /// NaN estimates are skipped. A row holding only NaN yields NaN.
    pub fn get_max(&mut self, state: &State<N>) -> f32 {
        self.row_mut(state)
            .values
            .iter()
            .copied()
            .reduce(f32::max)
            .unwrap_or(f32::NAN)
    }

    /// Overwrite the estimate for a state-action pair
    ///
    /// An unseen state gets a full row of zeros first. Writes to a terminal row are ignored.
    pub fn set(&mut self, state: &State<N>, action: A, value: f32) -> Result<()> {
        let i = self.index_of(&action)?;
        let row = self.row_mut(state);
        if row.terminal {
            trace!("ignoring write of {value} to terminal state {state:?}");
        } else {
            row.values[i] = value;
        }
        Ok(())
    }

    /// Read-only view of a state's row, without initializing it
    pub fn values(&self, state: &State<N>) -> Option<&[f32]> {
        self.rows.get(state).map(|row| &*row.values)
    }

    /// Register `state` as terminal: its row is reset to zeros and frozen
    pub fn mark_terminal(&mut self, state: &State<N>) {
        let mut row = Row::zeroed(self.actions.len());
        row.terminal = true;
        self.rows.insert(*state, row);
    }

    pub fn is_terminal(&self, state: &State<N>) -> bool {
        self.rows.get(state).is_some_and(|row| row.terminal)
    }

    /// Iterate over every observed state and its row of estimates
    pub fn iter(&self) -> impl Iterator<Item = (&State<N>, &[f32])> {
        self.rows.iter().map(|(s, row)| (s, &*row.values))
    }

    pub(crate) fn rows(&self) -> &HashMap<State<N>, Row> {
        &self.rows
    }

    pub(crate) fn insert_row(&mut self, state: State<N>, values: Box<[f32]>, terminal: bool) {
        self.rows.insert(state, Row { values, terminal });
    }
}
