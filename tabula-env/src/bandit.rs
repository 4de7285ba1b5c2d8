//! Stateless multi-armed bandit.
use anyhow::Result;
use log::info;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tabula_core::{error::RlError, Act, DiscreteAct, Env, Step};

/// Reward distributions of the arms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArmDistribution {
    /// Normal rewards with per-arm mean and a shared standard deviation.
    Gaussian {
        /// Mean of each arm.
        means: Vec<f64>,
        /// Standard deviation shared by all arms.
        std: f64,
    },

    /// Rewards of `1.0` with per-arm probability, `0.0` otherwise.
    Bernoulli {
        /// Success probability of each arm.
        probs: Vec<f64>,
    },
}

/// Configuration of [`BanditEnv`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanditConfig {
    /// Reward distributions.
    pub arms: ArmDistribution,
}

impl BanditConfig {
    /// Gaussian arms with the given means and unit standard deviation.
    pub fn gaussian(means: Vec<f64>) -> Self {
        Self {
            arms: ArmDistribution::Gaussian { means, std: 1.0 },
        }
    }

    /// Bernoulli arms with the given success probabilities.
    pub fn bernoulli(probs: Vec<f64>) -> Self {
        Self {
            arms: ArmDistribution::Bernoulli { probs },
        }
    }

    /// Sets the standard deviation of Gaussian arms. Ignored for Bernoulli arms.
    pub fn std(mut self, v: f64) -> Self {
        if let ArmDistribution::Gaussian { std, .. } = &mut self.arms {
            *std = v;
        }
        self
    }

    /// Expected reward of each arm.
    pub fn means(&self) -> &[f64] {
        match &self.arms {
            ArmDistribution::Gaussian { means, .. } => means,
            ArmDistribution::Bernoulli { probs } => probs,
        }
    }

    /// Constructs [`BanditConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of bandit from {}", path_.display());
        Ok(b)
    }

    /// Saves [`BanditConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of bandit into {}", path_.display());
        Ok(())
    }
}

enum Arms {
    Gaussian(Vec<Normal<f64>>),
    Bernoulli(Vec<Bernoulli>),
}

/// A K-armed bandit.
///
/// The observation is `()`: there is a single state. [`Env::step`] draws
/// one reward from the chosen arm and never terminates, so training runs are
/// bounded by the step cap of the trainer.
pub struct BanditEnv {
    means: Vec<f64>,
    arms: Arms,
}

impl BanditEnv {
    /// Number of arms.
    pub fn n_arms(&self) -> usize {
        self.means.len()
    }

    /// Expected reward of each arm.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Largest expected reward.
    pub fn optimal_mean(&self) -> f64 {
        self.means.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Index of the arm with the largest expected reward (lowest on ties).
    pub fn optimal_arm(&self) -> usize {
        tabula_core::util::argmax_first(&self.means)
    }

    /// Expected cumulative regret of a sequence of pulls: the sum over pulls
    /// of `optimal_mean - mean[a]`.
    pub fn regret(&self, actions: &[usize]) -> Result<f64, RlError> {
        let best = self.optimal_mean();
        actions.iter().try_fold(0.0, |acc, &a| {
            let mean = self.means.get(a).ok_or(RlError::InvalidAction {
                action: a,
                n_actions: self.n_arms(),
            })?;
            Ok(acc + best - mean)
        })
    }
}

impl Env for BanditEnv {
    type Config = BanditConfig;
    type Obs = ();
    type Act = DiscreteAct;
    type Info = ();

    fn build(config: &Self::Config) -> Result<Self> {
        let invalid = |e: &dyn std::fmt::Display| RlError::InvalidConfig(e.to_string());
        let means = config.means().to_vec();
        if means.is_empty() {
            return Err(RlError::InvalidConfig("bandit without arms".to_string()).into());
        }
        let arms = match &config.arms {
            ArmDistribution::Gaussian { means, std } => Arms::Gaussian(
                means
                    .iter()
                    .map(|m| Normal::new(*m, *std).map_err(|e| invalid(&e)))
                    .collect::<Result<_, _>>()?,
            ),
            ArmDistribution::Bernoulli { probs } => Arms::Bernoulli(
                probs
                    .iter()
                    .map(|p| Bernoulli::new(*p).map_err(|e| invalid(&e)))
                    .collect::<Result<_, _>>()?,
            ),
        };
        Ok(Self { means, arms })
    }

    fn n_actions(&self) -> usize {
        self.n_arms()
    }

    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    fn step(&mut self, a: &DiscreteAct, rng: &mut impl Rng) -> Result<Step<Self>> {
        let ix = a.index();
        let reward = match &self.arms {
            Arms::Gaussian(arms) => arms.get(ix).map(|d| d.sample(rng)),
            Arms::Bernoulli(arms) => arms
                .get(ix)
                .map(|d| if d.sample(rng) { 1.0 } else { 0.0 }),
        }
        .ok_or(RlError::InvalidAction {
            action: ix,
            n_actions: self.n_arms(),
        })?;
        Ok(Step::new((), *a, reward, false, ()))
    }
}
