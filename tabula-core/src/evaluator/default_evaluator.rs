//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{
    record::{Record, RecordValue},
    Agent, Env,
};
use anyhow::Result;

/// Runs a fixed number of episodes and reports the mean return.
///
/// Episodes are cut after `max_steps` steps, so a greedy policy that
/// cycles cannot stall evaluation. The agent is not updated.
///
/// The returned record holds `eval_return` and `eval_length`, the means
/// over episodes of the return and of the number of steps.
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    max_steps: usize,
    env: E,
}

impl<E: Env> DefaultEvaluator<E> {
    /// Step cap of a greedy rollout.
    pub const DEFAULT_MAX_STEPS: usize = 200;

    /// Constructs a new [`DefaultEvaluator`].
    pub fn new(config: &E::Config, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            max_steps: Self::DEFAULT_MAX_STEPS,
            env: E::build(config)?,
        })
    }

    /// Sets the step cap of an evaluation episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<A, R>(&mut self, agent: &mut A, rng: &mut R) -> Result<Record>
    where
        A: Agent<E>,
        R: rand::Rng,
    {
        let mut r_total = 0f64;
        let mut steps_total = 0usize;

        for _ in 0..self.n_episodes {
            let mut prev_obs = self.env.reset()?;

            for _ in 0..self.max_steps {
                let act = agent.sample(&prev_obs, rng)?;
                let step = self.env.step(&act, rng)?;
                r_total += step.reward;
                steps_total += 1;
                if step.is_terminated {
                    break;
                }
                prev_obs = step.obs;
            }
        }

        let n = self.n_episodes.max(1) as f64;
        Ok(Record::from_slice(&[
            ("eval_return", RecordValue::Scalar((r_total / n) as f32)),
            ("eval_length", RecordValue::Scalar((steps_total as f64 / n) as f32)),
        ]))
    }
}
