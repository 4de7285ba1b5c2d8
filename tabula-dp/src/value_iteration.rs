//! Value iteration.
use crate::{evaluation::action_values, DpConfig, MdpSolver};
use anyhow::Result;
use log::{debug, info};
use ndarray::Array2;
use tabula_core::{error::RlError, util::argmax_first, TransitionModel};

/// Value iteration by synchronous Bellman optimality backups.
///
/// The greedy policy takes the lowest-index maximizer of the one-step
/// lookahead.
pub struct ValueIteration {
    model: TransitionModel,
    config: DpConfig,
    values: Array2<f64>,
}

impl ValueIteration {
    /// Constructs the solver.
    pub fn new(model: TransitionModel, config: DpConfig) -> Self {
        let values = Array2::zeros((model.rows(), model.cols()));
        Self {
            model,
            config,
            values,
        }
    }

    /// Greedy action of every state, `None` for terminal and wall states.
    pub fn greedy_policy(&self) -> Result<Vec<Option<usize>>, RlError> {
        (0..self.model.n_states()).map(|s| self.pi_star(s)).collect()
    }
}

impl MdpSolver for ValueIteration {
    fn exec(&mut self) -> Result<usize> {
        self.config.check()?;
        let mut delta = f64::INFINITY;

        for sweep in 1..=self.config.max_sweeps {
            let mut new_values = Array2::zeros(self.values.raw_dim());
            delta = 0f64;
            for s in self.model.regular_states() {
                let pos = self.model.pos(s)?;
                let v = action_values(&self.model, &self.values, self.config.gamma, s)?
                    .into_iter()
                    .fold(f64::NEG_INFINITY, f64::max);
                delta = delta.max((v - self.values[pos]).abs());
                new_values[pos] = v;
            }
            self.values = new_values;
            debug!("Value iteration sweep {}: delta = {}", sweep, delta);

            if delta < self.config.theta {
                info!("Value iteration converged after {} sweeps", sweep);
                return Ok(sweep);
            }
        }

        Err(RlError::ConvergenceNotReached {
            iterations: self.config.max_sweeps,
            delta,
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
        let q = action_values(&self.model, &self.values, self.config.gamma, s)?;
        Ok(Some(argmax_first(&q)))
    }

    fn values(&self) -> &Array2<f64> {
        &self.values
    }

    fn model(&self) -> &TransitionModel {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{greedy_path, PolicyIteration};
    use approx::assert_abs_diff_eq;
    use tabula_core::{Env, Outcome, StateKind};
    use tabula_env::{GridWorld, GridWorldConfig};

    #[test]
    fn test_agrees_with_policy_iteration() -> Result<()> {
        let config = GridWorldConfig::new(4, 5).terminal_reward(10.0).bump_reward(Some(-5.0));
        let env = GridWorld::build(&config)?;
        let mut vi = ValueIteration::new(env.model()?, DpConfig::default());
        let mut pi = PolicyIteration::new(env.model()?, DpConfig::default());
        vi.exec()?;
        pi.exec()?;

        for s in 0..20 {
            assert_abs_diff_eq!(vi.v_star(s)?, pi.v_star(s)?, epsilon = 1e-3);
        }
        assert_eq!(greedy_path(&vi, 0)?.len(), greedy_path(&pi, 0)?.len());
        Ok(())
    }

    #[test]
    fn test_stochastic_outcomes() -> Result<()> {
        // 1 x 2: from state 0 action 0 reaches the goal with probability 0.5
        // and stays otherwise; action 1 always stays.
        let outcomes = vec![
            vec![
                vec![
                    Outcome {
                        prob: 0.5,
                        next_state: 1,
                        reward: 1.0,
                        done: true,
                    },
                    Outcome {
                        prob: 0.5,
                        next_state: 0,
                        reward: 0.0,
                        done: false,
                    },
                ],
                vec![Outcome::certain(0, 0.0, false)],
            ],
            vec![
                vec![Outcome::certain(1, 0.0, true)],
                vec![Outcome::certain(1, 0.0, true)],
            ],
        ];
        let model = TransitionModel::new(
            1,
            2,
            2,
            vec![StateKind::Regular, StateKind::Terminal],
            outcomes,
        )?;
        let mut vi = ValueIteration::new(model, DpConfig::default().gamma(0.9));
        vi.exec()?;
        // v = 0.5 + 0.45 v
        assert_abs_diff_eq!(vi.v_star(0)?, 0.5 / 0.55, epsilon = 1e-5);
        assert_eq!(vi.pi_star(0)?, Some(0));
        assert_eq!(vi.greedy_policy()?, vec![Some(0), None]);
        Ok(())
    }

    #[test]
    fn test_out_of_range_state() -> Result<()> {
        let env = GridWorld::build(&GridWorldConfig::new(3, 3))?;
        let mut vi = ValueIteration::new(env.model()?, DpConfig::default());
        vi.exec()?;

        assert!(matches!(vi.v_star(9), Err(RlError::InvalidState(_))));
        assert!(matches!(vi.q_star(9, 0), Err(RlError::InvalidState(_))));
        assert!(matches!(vi.pi_star(100), Err(RlError::InvalidState(_))));
        assert_abs_diff_eq!(vi.q_star(5, 3)?, -1.0);
        Ok(())
    }
}
