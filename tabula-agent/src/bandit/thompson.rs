use super::{check_arm, check_n_arms, load_yaml, save_yaml};
use crate::explorer::Thompson;
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabula_core::{
    record::Record, util::argmax_first, Act, Agent, Configurable, Env, Policy, Transition,
};

/// Configuration of [`ThompsonAgent`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ThompsonConfig {
    /// Number of arms.
    pub n_arms: usize,
}

impl Default for ThompsonConfig {
    fn default() -> Self {
        Self { n_arms: 2 }
    }
}

impl ThompsonConfig {
    /// Sets the number of arms.
    pub fn n_arms(mut self, v: usize) -> Self {
        self.n_arms = v;
        self
    }

    /// Constructs [`ThompsonConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_yaml(path, "Thompson agent")
    }

    /// Saves [`ThompsonConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_yaml(self, path, "Thompson agent")
    }
}

/// Thompson sampling with a `Beta(successes + 1, failures + 1)` belief per arm.
///
/// A reward greater than zero counts as a success.
pub struct ThompsonAgent {
    alpha: Vec<f64>,
    beta: Vec<f64>,
    counts: Vec<u64>,
    thompson: Thompson,
    train: bool,
}

impl ThompsonAgent {
    /// First Beta parameter of each arm, `successes + 1`.
    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    /// Second Beta parameter of each arm, `failures + 1`.
    pub fn beta(&self) -> &[f64] {
        &self.beta
    }

    /// Number of pulls of each arm.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Posterior mean `alpha / (alpha + beta)` of each arm.
    pub fn posterior_means(&self) -> Vec<f64> {
        self.alpha
            .iter()
            .zip(&self.beta)
            .map(|(a, b)| a / (a + b))
            .collect()
    }

    /// Selects an arm.
    pub fn select_action(&mut self, rng: &mut impl Rng) -> Result<usize> {
        if self.train {
            self.thompson.action(&self.alpha, &self.beta, rng)
        } else {
            Ok(argmax_first(&self.posterior_means()))
        }
    }

    /// Adds an outcome of arm `a` to its belief. Returns `true` on success.
    pub fn update(&mut self, a: usize, reward: f64) -> Result<bool> {
        check_arm(a, self.alpha.len())?;
        let success = reward > 0.0;
        if success {
            self.alpha[a] += 1.0;
        } else {
            self.beta[a] += 1.0;
        }
        self.counts[a] += 1;
        Ok(success)
    }
}

impl Configurable for ThompsonAgent {
    type Config = ThompsonConfig;

    fn build(config: Self::Config) -> Result<Self> {
        check_n_arms(config.n_arms)?;
        Ok(Self {
            alpha: vec![1.0; config.n_arms],
            beta: vec![1.0; config.n_arms],
            counts: vec![0; config.n_arms],
            thompson: Thompson::default(),
            train: true,
        })
    }
}

impl<E> Policy<E> for ThompsonAgent
where
    E: Env,
    E::Act: From<usize>,
{
    fn sample(&mut self, _obs: &E::Obs, rng: &mut impl Rng) -> Result<E::Act> {
        Ok(self.select_action(rng)?.into())
    }
}

impl<E> Agent<E> for ThompsonAgent
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
        let success = self.update(t.act.index(), t.reward)?;
        Ok(Record::from_scalar("success", if success { 1.0 } else { 0.0 }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_belief_counts() -> Result<()> {
        let mut agent = ThompsonAgent::build(ThompsonConfig::default())?;
        agent.update(0, 1.0)?;
        agent.update(0, 0.0)?;
        agent.update(1, 0.0)?;
        assert_eq!(agent.alpha(), &[2.0, 1.0]);
        assert_eq!(agent.beta(), &[2.0, 2.0]);
        assert_eq!(agent.counts(), &[2, 1]);
        assert!(agent.update(2, 1.0).is_err());
        Ok(())
    }
}
