//! Enumerated transition model of a finite MDP.
use crate::error::RlError;
use anyhow::Result;
use ndarray::Array2;

/// One possible result of taking an action in a state.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Probability of this outcome.
    pub prob: f64,

    /// Index of the next state.
    pub next_state: usize,

    /// Reward paid on this outcome.
    pub reward: f64,

    /// If `true`, no value is bootstrapped from `next_state`.
    pub done: bool,
}

impl Outcome {
    /// Constructs an outcome with probability one.
    pub fn certain(next_state: usize, reward: f64, done: bool) -> Self {
        Self {
            prob: 1.0,
            next_state,
            reward,
            done,
        }
    }
}

/// Role of a state in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    /// A state whose value is estimated.
    Regular,

    /// An absorbing goal state. Its value is fixed at zero.
    Terminal,

    /// A cell that can never be occupied. Its value is fixed at zero.
    Wall,
}

/// Explicit mapping `state -> action -> [(probability, next_state, reward, done)]`.
///
/// States are the cells of a `rows x cols` grid enumerated in row-major
/// order; a bandit is the degenerate `1 x 1` model. Every state carries an
/// outcome list for every action, and the probabilities of each list sum
/// to one. Dynamic-programming solvers sweep the [`StateKind::Regular`]
/// states only.
#[derive(Debug, Clone)]
pub struct TransitionModel {
    rows: usize,
    cols: usize,
    n_actions: usize,
    kinds: Vec<StateKind>,
    outcomes: Vec<Vec<Vec<Outcome>>>,
}

const PROB_TOLERANCE: f64 = 1e-9;

impl TransitionModel {
    /// Constructs a model after validating it.
    ///
    /// Fails with [`RlError::InvalidConfig`] if a state misses an action,
    /// an outcome list is empty, a probability is negative or not finite,
    /// probabilities do not sum to one, or an outcome points outside the
    /// state space.
    pub fn new(
        rows: usize,
        cols: usize,
        n_actions: usize,
        kinds: Vec<StateKind>,
        outcomes: Vec<Vec<Vec<Outcome>>>,
    ) -> Result<Self> {
        let n_states = rows * cols;
        if n_states == 0 || n_actions == 0 {
            return Err(RlError::InvalidConfig(format!(
                "empty model: {} x {} states, {} actions",
                rows, cols, n_actions
            ))
            .into());
        }
        if kinds.len() != n_states || outcomes.len() != n_states {
            return Err(RlError::InvalidConfig(format!(
                "expected {} states, got {} kinds and {} outcome tables",
                n_states,
                kinds.len(),
                outcomes.len()
            ))
            .into());
        }

        for (s, per_action) in outcomes.iter().enumerate() {
            if per_action.len() != n_actions {
                return Err(RlError::InvalidConfig(format!(
                    "state {} defines {} of {} actions",
                    s,
                    per_action.len(),
                    n_actions
                ))
                .into());
            }
            for (a, list) in per_action.iter().enumerate() {
                if list.is_empty() {
                    return Err(RlError::InvalidConfig(format!(
                        "no outcome for state {}, action {}",
                        s, a
                    ))
                    .into());
                }
                let total: f64 = list.iter().map(|o| o.prob).sum();
                let malformed = list.iter().any(|o| !o.prob.is_finite() || o.prob < 0.0);
                if malformed || (total - 1.0).abs() > PROB_TOLERANCE {
                    return Err(RlError::InvalidConfig(format!(
                        "probabilities for state {}, action {} sum to {}",
                        s, a, total
                    ))
                    .into());
                }
                if let Some(o) = list.iter().find(|o| o.next_state >= n_states) {
                    return Err(RlError::InvalidConfig(format!(
                        "state {}, action {} leads to unknown state {}",
                        s, a, o.next_state
                    ))
                    .into());
                }
            }
        }

        Ok(Self {
            rows,
            cols,
            n_actions,
            kinds,
            outcomes,
        })
    }

    /// Number of grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of grid columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of states, including walls and terminals.
    pub fn n_states(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of actions.
    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Row-major index of a cell.
    pub fn state_index(&self, row: usize, col: usize) -> Result<usize, RlError> {
        if row >= self.rows || col >= self.cols {
            return Err(RlError::InvalidState(format!(
                "({}, {}) outside {} x {} grid",
                row, col, self.rows, self.cols
            )));
        }
        Ok(row * self.cols + col)
    }

    /// Fails with [`RlError::InvalidState`] unless `s` is an enumerated state.
    pub fn check_state(&self, s: usize) -> Result<(), RlError> {
        if s >= self.n_states() {
            return Err(RlError::InvalidState(format!(
                "state {} outside {} x {} grid",
                s, self.rows, self.cols
            )));
        }
        Ok(())
    }

    fn check_action(&self, a: usize) -> Result<(), RlError> {
        if a >= self.n_actions {
            return Err(RlError::InvalidAction {
                action: a,
                n_actions: self.n_actions,
            });
        }
        Ok(())
    }

    fn cell(&self, s: usize) -> (usize, usize) {
        (s / self.cols, s % self.cols)
    }

    /// Cell of a state index.
    pub fn pos(&self, s: usize) -> Result<(usize, usize), RlError> {
        self.check_state(s)?;
        Ok(self.cell(s))
    }

    /// Role of state `s`.
    pub fn kind(&self, s: usize) -> Result<StateKind, RlError> {
        self.check_state(s)?;
        Ok(self.kinds[s])
    }

    /// `true` for terminal and wall states, whose values stay at zero.
    pub fn is_fixed(&self, s: usize) -> Result<bool, RlError> {
        Ok(self.kind(s)? != StateKind::Regular)
    }

    /// Iterator over the regular states.
    pub fn regular_states(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_states()).filter(move |&s| self.kinds[s] == StateKind::Regular)
    }

    /// Outcomes of taking action `a` in state `s`.
    pub fn outcomes(&self, s: usize, a: usize) -> Result<&[Outcome], RlError> {
        self.check_state(s)?;
        self.check_action(a)?;
        Ok(&self.outcomes[s][a])
    }

    /// One-step lookahead `sum p * (r + gamma * V(s'))`, where `V(s')` is
    /// not used on `done` outcomes.
    ///
    /// `values` is indexed by `(row, col)` and must match the grid.
    pub fn lookahead(
        &self,
        s: usize,
        a: usize,
        values: &Array2<f64>,
        gamma: f64,
    ) -> Result<f64, RlError> {
        if values.dim() != (self.rows, self.cols) {
            return Err(RlError::InvalidConfig(format!(
                "values of shape {:?} for a {} x {} model",
                values.dim(),
                self.rows,
                self.cols
            )));
        }
        Ok(self
            .outcomes(s, a)?
            .iter()
            .map(|o| {
                let cont = if o.done {
                    0.0
                } else {
                    gamma * values[self.cell(o.next_state)]
                };
                o.prob * (o.reward + cont)
            })
            .sum())
    }
}
