#![warn(missing_docs)]
//! Dynamic programming on a fully known [`TransitionModel`].
//!
//! * [`evaluate_policy`] - synchronous iterative policy evaluation
//! * [`PolicyIteration`] - alternating evaluation and greedy improvement
//! * [`ValueIteration`] - synchronous Bellman optimality backups
//!
//! Both solvers implement [`MdpSolver`].
//!
//! ```rust
//! use tabula_core::Env;
//! use tabula_dp::{DpConfig, MdpSolver, PolicyIteration};
//! use tabula_env::{GridWorld, GridWorldConfig};
//!
//! let env = GridWorld::build(&GridWorldConfig::new(3, 3)).unwrap();
//! let mut solver = PolicyIteration::new(env.model().unwrap(), DpConfig::default());
//! solver.exec().unwrap();
//! assert_eq!(solver.pi_star(8), Ok(None)); // goal
//! assert!(solver.v_star(9).is_err()); // outside the 3 x 3 grid
//! ```
mod config;
mod evaluation;
mod policy;
mod policy_iteration;
mod value_iteration;
pub use config::DpConfig;
pub use evaluation::{action_values, evaluate_policy};
pub use policy::TabularPolicy;
pub use policy_iteration::PolicyIteration;
pub use value_iteration::ValueIteration;

use anyhow::Result;
use ndarray::Array2;
use tabula_core::{error::RlError, TransitionModel};

/// A solver of a finite MDP.
pub trait MdpSolver {
    /// Runs the solver. Returns the number of iterations (policy iteration)
    /// or sweeps (value iteration) performed.
    ///
    /// On [`RlError::ConvergenceNotReached`] the partial values and policy
    /// remain available through the other methods.
    fn exec(&mut self) -> Result<usize>;

    /// Optimal value of state `s`.
    ///
    /// Fails with [`RlError::InvalidState`] if `s` is outside the model.
    fn v_star(&self, s: usize) -> Result<f64, RlError>;

    /// Optimal value of taking action `a` in state `s`.
    ///
    /// Fails with [`RlError::InvalidState`] or [`RlError::InvalidAction`]
    /// if `s` or `a` is out of range.
    fn q_star(&self, s: usize, a: usize) -> Result<f64, RlError>;

    /// Optimal action in state `s`, `None` for terminal and wall states.
    ///
    /// Fails with [`RlError::InvalidState`] if `s` is outside the model.
    fn pi_star(&self, s: usize) -> Result<Option<usize>, RlError>;

    /// State values indexed by `(row, col)`.
    fn values(&self) -> &Array2<f64>;

    /// The model being solved.
    fn model(&self) -> &TransitionModel;
}

/// States visited by following [`MdpSolver::pi_star`] from `start` until a
/// fixed state, including `start` and the last state.
///
/// Only the most likely outcome of each action is followed. Fails with
/// [`RlError::InvalidState`] if the path revisits a state.
pub fn greedy_path(solver: &impl MdpSolver, start: usize) -> Result<Vec<usize>> {
    let model = solver.model();
    model.check_state(start)?;
    let mut path = vec![start];
    let mut s = start;
    while let Some(a) = solver.pi_star(s)? {
        let next = model
            .outcomes(s, a)?
            .iter()
            .max_by(|x, y| x.prob.total_cmp(&y.prob))
            .map(|o| o.next_state)
            .ok_or_else(|| RlError::InvalidConfig(format!("no outcome for ({}, {})", s, a)))?;
        if path.contains(&next) {
            return Err(RlError::InvalidState(format!(
                "greedy path from {} loops at {}",
                start, next
            ))
            .into());
        }
        path.push(next);
        s = next;
    }
    Ok(path)
}
