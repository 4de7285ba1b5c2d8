use super::{check_arm, check_n_arms, load_yaml, sample_average, save_yaml};
use crate::explorer::Ucb1;
use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabula_core::{
    error::RlError, record::Record, util::argmax_first, Act, Agent, Configurable, Env, Policy,
    Transition,
};

/// Configuration of [`Ucb1Agent`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Ucb1Config {
    /// Number of arms.
    pub n_arms: usize,

    /// Exploration coefficient.
    pub c: f64,
}

impl Default for Ucb1Config {
    fn default() -> Self {
        Self { n_arms: 4, c: 2.0 }
    }
}

impl Ucb1Config {
    /// Sets the number of arms.
    pub fn n_arms(mut self, v: usize) -> Self {
        self.n_arms = v;
        self
    }

    /// Sets the exploration coefficient.
    pub fn c(mut self, v: f64) -> Self {
        self.c = v;
        self
    }

    /// Constructs [`Ucb1Config`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_yaml(path, "UCB1 agent")
    }

    /// Saves [`Ucb1Config`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_yaml(self, path, "UCB1 agent")
    }
}

/// Agent selecting arms by upper confidence bounds on sample averages.
///
/// See [`Ucb1`] for the selection rule.
pub struct Ucb1Agent {
    means: Vec<f64>,
    counts: Vec<u64>,
    ucb: Ucb1,
    train: bool,
}

impl Ucb1Agent {
    /// Estimated mean reward of each arm.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Number of pulls of each arm.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of selections made in training mode.
    pub fn t(&self) -> u64 {
        self.ucb.t
    }

    /// Selects an arm.
    pub fn select_action(&mut self) -> usize {
        if self.train {
            self.ucb.action(&self.means, &self.counts)
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

impl Configurable for Ucb1Agent {
    type Config = Ucb1Config;

    fn build(config: Self::Config) -> Result<Self> {
        check_n_arms(config.n_arms)?;
        if config.c.is_nan() || config.c < 0.0 {
            return Err(RlError::InvalidConfig(format!("c = {}", config.c)).into());
        }
        Ok(Self {
            means: vec![0.0; config.n_arms],
            counts: vec![0; config.n_arms],
            ucb: Ucb1::new(config.c),
            train: true,
        })
    }
}

impl<E> Policy<E> for Ucb1Agent
where
    E: Env,
    E::Act: From<usize>,
{
    fn sample(&mut self, _obs: &E::Obs, _rng: &mut impl Rng) -> Result<E::Act> {
        Ok(self.select_action().into())
    }
}

impl<E> Agent<E> for Ucb1Agent
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_k_selections_cover_all_arms() -> Result<()> {
        let mut agent = Ucb1Agent::build(Ucb1Config::default().n_arms(5))?;
        let mut picks = vec![];
        for _ in 0..5 {
            let a = agent.select_action();
            // rewards favor the last arm so score order cannot explain the picks
            agent.update(a, a as f64)?;
            picks.push(a);
        }
        assert_eq!(picks, vec![0, 1, 2, 3, 4]);
        assert_eq!(agent.counts(), &[1, 1, 1, 1, 1]);
        assert_eq!(agent.t(), 5);
        Ok(())
    }

    #[test]
    fn test_single_arm() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut agent = Ucb1Agent::build(Ucb1Config::default().n_arms(1))?;
        for r in [1.0, 3.0, -1.0, 5.0] {
            let a = agent.select_action();
            assert_eq!(a, 0);
            agent.update(a, r)?;
        }
        assert_eq!(agent.counts(), &[4]);
        assert_eq!(agent.means(), &[2.0]);
        assert_eq!(agent.t(), 4);

        agent.train = false;
        assert_eq!(agent.select_action(), 0);
        assert!(agent.update(1, 0.0).is_err());
        Ok(())
    }

    #[test]
    fn test_concentrates_on_best_arm() -> Result<()> {
        let mut agent = Ucb1Agent::build(Ucb1Config::default().n_arms(3))?;
        let rewards = [0.2, 0.9, 0.5];
        for _ in 0..2000 {
            let a = agent.select_action();
            agent.update(a, rewards[a])?;
        }
        let counts = agent.counts();
        assert!(counts[1] > counts[0] && counts[1] > counts[2]);
        Ok(())
    }
}
