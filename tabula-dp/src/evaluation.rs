//! Iterative policy evaluation.
use crate::{DpConfig, TabularPolicy};
use anyhow::Result;
use log::debug;
use ndarray::Array2;
use tabula_core::{error::RlError, TransitionModel};

/// One-step lookahead values of every action in state `s`.
///
/// Fails with [`RlError::InvalidState`] if `s` is outside the model.
pub fn action_values(
    model: &TransitionModel,
    values: &Array2<f64>,
    gamma: f64,
    s: usize,
) -> Result<Vec<f64>, RlError> {
    (0..model.n_actions())
        .map(|a| model.lookahead(s, a, values, gamma))
        .collect()
}

pub(crate) fn check_values(model: &TransitionModel, values: &Array2<f64>) -> Result<(), RlError> {
    if values.dim() != (model.rows(), model.cols()) {
        return Err(RlError::InvalidConfig(format!(
            "values of shape {:?} for a {} x {} model",
            values.dim(),
            model.rows(),
            model.cols()
        )));
    }
    Ok(())
}

/// Evaluates `policy` by synchronous Bellman expectation backups.
///
/// Each sweep computes every new value from a frozen copy of `values`, then
/// replaces `values` at once. Terminal and wall states are held at zero.
/// Sweeps stop when the largest change falls below `config.theta`; the
/// number of sweeps is returned.
///
/// After `config.max_sweeps` sweeps without convergence, fails with
/// [`RlError::ConvergenceNotReached`] and leaves the latest values in
/// `values`.
pub fn evaluate_policy(
    model: &TransitionModel,
    policy: &TabularPolicy,
    values: &mut Array2<f64>,
    config: &DpConfig,
) -> Result<usize> {
    config.check()?;
    check_values(model, values)?;
    if policy.n_states() != model.n_states() || policy.n_actions() != model.n_actions() {
        return Err(RlError::InvalidConfig(format!(
            "policy over {} states and {} actions for a model with {} and {}",
            policy.n_states(),
            policy.n_actions(),
            model.n_states(),
            model.n_actions()
        ))
        .into());
    }

    let mut delta = f64::INFINITY;
    for sweep in 1..=config.max_sweeps {
        let mut new_values = Array2::zeros(values.raw_dim());
        delta = 0f64;

        for s in model.regular_states() {
            let pos = model.pos(s)?;
            let mut v = 0f64;
            for a in 0..model.n_actions() {
                let p = policy.prob(s, a)?;
                if p > 0.0 {
                    v += p * model.lookahead(s, a, values, config.gamma)?;
                }
            }
            delta = delta.max((v - values[pos]).abs());
            new_values[pos] = v;
        }

        *values = new_values;
        if delta < config.theta {
            debug!("Policy evaluation converged after {} sweeps", sweep);
            return Ok(sweep);
        }
    }

    Err(RlError::ConvergenceNotReached {
        iterations: config.max_sweeps,
        delta,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tabula_core::Env;
    use tabula_env::{GridAction, GridWorld, GridWorldConfig};

    fn grid5() -> TransitionModel {
        let env = GridWorld::build(&GridWorldConfig::new(5, 5)).unwrap();
        env.model().unwrap()
    }

    /// Right along each row, down in the last column.
    fn right_then_down(model: &TransitionModel) -> TabularPolicy {
        let actions: Vec<usize> = (0..model.n_states())
            .map(|s| {
                let (_, col) = model.pos(s).unwrap();
                if col + 1 < model.cols() {
                    GridAction::Right as usize
                } else {
                    GridAction::Down as usize
                }
            })
            .collect();
        TabularPolicy::deterministic(&actions, 4).unwrap()
    }

    #[test]
    fn test_deterministic_policy_on_5x5() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let model = grid5();
        let policy = right_then_down(&model);
        let mut values = Array2::zeros((5, 5));
        let sweeps = evaluate_policy(&model, &policy, &mut values, &DpConfig::default())?;

        assert!(sweeps < DpConfig::default().max_sweeps);
        assert_abs_diff_eq!(values[[4, 3]], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(values[[3, 4]], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(values[[4, 2]], -1.0 - 0.99, epsilon = 1e-6);
        assert_eq!(values[[4, 4]], 0.0);
        Ok(())
    }

    #[test]
    fn test_sweep_cap_keeps_partial_values() {
        let model = grid5();
        let policy = TabularPolicy::uniform(25, 4);
        let mut values = Array2::zeros((5, 5));
        let config = DpConfig::default().max_sweeps(3);
        let err = evaluate_policy(&model, &policy, &mut values, &config).unwrap_err();

        match err.downcast_ref::<RlError>() {
            Some(RlError::ConvergenceNotReached { iterations, delta }) => {
                assert_eq!(*iterations, 3);
                assert!(*delta > 0.0);
            }
            e => panic!("unexpected error {:?}", e),
        }
        // three sweeps of -1 rewards far from the goal
        assert_abs_diff_eq!(values[[0, 0]], -1.0 - 0.99 - 0.99 * 0.99, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let model = grid5();
        let policy = TabularPolicy::uniform(25, 4);
        let mut values = Array2::zeros((4, 5));
        assert!(evaluate_policy(&model, &policy, &mut values, &DpConfig::default()).is_err());
    }

    #[test]
    fn test_action_values_out_of_range_state() {
        let model = grid5();
        let values = Array2::zeros((5, 5));
        assert_eq!(action_values(&model, &values, 0.99, 3).unwrap(), vec![-1.0; 4]);
        assert!(matches!(
            action_values(&model, &values, 0.99, 25),
            Err(RlError::InvalidState(_))
        ));
    }
}
