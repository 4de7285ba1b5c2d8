//! Policy iteration.
use crate::{
    evaluation::{action_values, evaluate_policy},
    DpConfig, MdpSolver, TabularPolicy,
};
use anyhow::Result;
use log::{debug, info};
use ndarray::Array2;
use tabula_core::{error::RlError, TransitionModel};

/// Actions whose values are within this distance of the best count as ties.
const TIE_TOLERANCE: f64 = 1e-9;

/// Policy iteration starting from the uniform random policy.
///
/// Each round evaluates the current policy with
/// [`evaluate_policy`](crate::evaluate_policy), warm-started from the
/// previous values, then makes the policy greedy with respect to the one-step
/// lookahead. Improvement keeps the current action of a state whenever it is
/// among the maximizers and otherwise takes the lowest-index maximizer, so the
/// loop ends as soon as a round leaves the policy unchanged.
pub struct PolicyIteration {
    model: TransitionModel,
    config: DpConfig,
    policy: TabularPolicy,
    values: Array2<f64>,
}

impl PolicyIteration {
    /// Constructs the solver.
    pub fn new(model: TransitionModel, config: DpConfig) -> Self {
        let policy = TabularPolicy::uniform(model.n_states(), model.n_actions());
        let values = Array2::zeros((model.rows(), model.cols()));
        Self {
            model,
            config,
            policy,
            values,
        }
    }

    /// The current policy.
    pub fn policy(&self) -> &TabularPolicy {
        &self.policy
    }

    /// Makes the policy greedy. Returns `true` if no state changed its action.
    fn improve(&mut self) -> Result<bool, RlError> {
        let mut stable = true;
        let states: Vec<usize> = self.model.regular_states().collect();
        for s in states {
            let q = action_values(&self.model, &self.values, self.config.gamma, s)?;
            let best = q.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let is_best = |a: usize| q[a] >= best - TIE_TOLERANCE;

            let current = self.policy.deterministic_action(s)?;
            let chosen = match current {
                Some(a) if is_best(a) => a,
                _ => (0..q.len()).find(|&a| is_best(a)).unwrap_or(0),
            };
            if current != Some(chosen) {
                stable = false;
                self.policy.set_action(s, chosen)?;
            }
        }
        Ok(stable)
    }
}

impl MdpSolver for PolicyIteration {
    fn exec(&mut self) -> Result<usize> {
        self.config.check()?;
        for iteration in 1..=self.config.max_iterations {
            let sweeps = evaluate_policy(&self.model, &self.policy, &mut self.values, &self.config)?;
            let stable = self.improve()?;
            debug!(
                "Policy iteration {}: {} evaluation sweeps, stable = {}",
                iteration, sweeps, stable
            );
            if stable {
                info!("Policy iteration converged after {} iterations", iteration);
                return Ok(iteration);
            }
        }
        Err(RlError::ConvergenceNotReached {
            iterations: self.config.max_iterations,
            delta: f64::NAN,
        }
        .into())
    }

    fn v_star(&self, s: usize) -> Result<f64, RlError> {
        Ok(self.values[self.model.pos(s)?])
    }

    fn q_star(&self, s: usize, a: usize) -> Result<f64, RlError> {
        self.model.lookahead(s, a, &self.values, self.config.gamma)
    }

    fn pi_star(&self, s: usize) -> Result<Option<usize>, RlError> {
        if self.model.is_fixed(s)? {
            return Ok(None);
        }
        Ok(Some(self.policy.greedy_action(s)?))
    }

    fn values(&self) -> &Array2<f64> {
        &self.values
    }

    fn model(&self) -> &TransitionModel {
        &self.model
    }
}
