use super::{check_arm, check_n_arms, load_yaml, sample_average, save_yaml};
use crate::explorer::EpsilonGreedy;
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabula_core::{
    record::Record, util::argmax_first, Act, Agent, Configurable, Env, Policy, Transition,
};

/// Configuration of [`SampleAverage`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SampleAverageConfig {
    /// Number of arms.
    pub n_arms: usize,

    /// Behavior policy in training mode.
    pub explorer: EpsilonGreedy,
}

impl Default for SampleAverageConfig {
    fn default() -> Self {
        Self {
            n_arms: 4,
            explorer: EpsilonGreedy::constant(0.1),
        }
    }
}

impl SampleAverageConfig {
    /// Sets the number of arms.
    pub fn n_arms(mut self, v: usize) -> Self {
        self.n_arms = v;
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Constructs [`SampleAverageConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_yaml(path, "sample-average agent")
    }

    /// Saves [`SampleAverageConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_yaml(self, path, "sample-average agent")
    }
}

/// Epsilon-greedy agent over incremental sample averages of each arm.
pub struct SampleAverage {
    means: Vec<f64>,
    counts: Vec<u64>,
    explorer: EpsilonGreedy,
    train: bool,
}

impl SampleAverage {
    /// Estimated mean reward of each arm.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Number of pulls of each arm.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Selects an arm.
    pub fn select_action(&mut self, rng: &mut impl Rng) -> usize {
        if self.train {
            self.explorer.action(&self.means, rng)
        } else {
            argmax_first(&self.means)
        }
    }

    /// Adds a reward sample of arm `a` and returns `r - mean` before the update.
    pub fn update(&mut self, a: usize, reward: f64) -> Result<f64> {
        check_arm(a, self.means.len())?;
        Ok(sample_average(
            &mut self.means[a],
            &mut self.counts[a],
            reward,
        ))
    }
}

impl Configurable for SampleAverage {
    type Config = SampleAverageConfig;

    fn build(config: Self::Config) -> Result<Self> {
        check_n_arms(config.n_arms)?;
        Ok(Self {
            means: vec![0.0; config.n_arms],
            counts: vec![0; config.n_arms],
            explorer: config.explorer,
            train: true,
        })
    }
}

impl<E> Policy<E> for SampleAverage
where
    E: Env,
    E::Act: From<usize>,
{
    fn sample(&mut self, _obs: &E::Obs, rng: &mut impl Rng) -> Result<E::Act> {
        Ok(self.select_action(rng).into())
    }
}

impl<E> Agent<E> for SampleAverage
where
    E: Env,
    E::Act: From<usize>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, t: &Transition<E>, _rng: &mut impl Rng) -> Result<Record> {
        let error = self.update(t.act.index(), t.reward)?;
        Ok(Record::from_scalar("td_error", error as f32))
    }
}
