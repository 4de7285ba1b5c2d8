//! Tabular stochastic policy.
use ndarray::Array2;
use tabula_core::{error::RlError, util::argmax_first};

/// Action probabilities `pi[s, a]` over enumerated states.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularPolicy {
    probs: Array2<f64>,
}

impl TabularPolicy {
    /// The uniform random policy.
    pub fn uniform(n_states: usize, n_actions: usize) -> Self {
        Self {
            probs: Array2::from_elem((n_states, n_actions), 1.0 / n_actions.max(1) as f64),
        }
    }

    /// A deterministic policy taking `actions[s]` in state `s`.
    pub fn deterministic(actions: &[usize], n_actions: usize) -> Result<Self, RlError> {
        let mut probs = Array2::zeros((actions.len(), n_actions));
        for (s, &a) in actions.iter().enumerate() {
            if a >= n_actions {
                return Err(RlError::InvalidAction {
                    action: a,
                    n_actions,
                });
            }
            probs[[s, a]] = 1.0;
        }
        Ok(Self { probs })
    }

    /// Number of states.
    pub fn n_states(&self) -> usize {
        self.probs.nrows()
    }

    /// Number of actions.
    pub fn n_actions(&self) -> usize {
        self.probs.ncols()
    }

    fn check_state(&self, s: usize) -> Result<(), RlError> {
        if s >= self.n_states() {
            return Err(RlError::InvalidState(format!(
                "state {} of a policy over {} states",
                s,
                self.n_states()
            )));
        }
        Ok(())
    }

    fn check(&self, s: usize, a: usize) -> Result<(), RlError> {
        self.check_state(s)?;
        if a >= self.n_actions() {
            return Err(RlError::InvalidAction {
                action: a,
                n_actions: self.n_actions(),
            });
        }
        Ok(())
    }

    /// `pi[s, a]`.
    pub fn prob(&self, s: usize, a: usize) -> Result<f64, RlError> {
        self.check(s, a)?;
        Ok(self.probs[[s, a]])
    }

    /// The probability matrix.
    pub fn probs(&self) -> &Array2<f64> {
        &self.probs
    }

    /// Makes the policy take `a` with certainty in `s`.
    pub fn set_action(&mut self, s: usize, a: usize) -> Result<(), RlError> {
        self.check(s, a)?;
        self.probs.row_mut(s).fill(0.0);
        self.probs[[s, a]] = 1.0;
        Ok(())
    }

    /// The action taken with certainty in `s`, if any.
    pub fn deterministic_action(&self, s: usize) -> Result<Option<usize>, RlError> {
        self.check_state(s)?;
        Ok(self.probs.row(s).iter().position(|&p| p == 1.0))
    }

    /// Most likely action in `s`, lowest index on ties.
    pub fn greedy_action(&self, s: usize) -> Result<usize, RlError> {
        self.check_state(s)?;
        Ok(argmax_first(&self.probs.row(s).to_vec()))
    }
}
