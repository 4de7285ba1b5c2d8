//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Seed of the pseudo-random source shared by environment, explorer and agent.
    pub seed: u64,

    /// The number of training episodes.
    pub max_episodes: usize,

    /// Episodes are truncated after this many steps.
    ///
    /// Bandits never terminate, so a bandit run is a single episode of
    /// `max_steps_per_episode` pulls.
    pub max_steps_per_episode: usize,

    /// Interval of evaluation in episodes. `0` disables evaluation.
    pub eval_interval: usize,

    /// Interval of flushing records in episodes. `0` flushes only at the end.
    pub flush_record_interval: usize,

    /// If `true`, a record is written for every environment step.
    pub record_steps: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_episodes: 500,
            max_steps_per_episode: 10_000,
            eval_interval: 0,
            flush_record_interval: 0,
            record_steps: false,
        }
    }
}

impl TrainerConfig {
    /// Configuration of a bandit run of `n_pulls` pulls.
    pub fn bandit(n_pulls: usize) -> Self {
        Self::default().max_episodes(1).max_steps_per_episode(n_pulls)
    }

    /// Sets the seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of training episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the step cap of an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    /// Sets the interval of evaluation in episodes.
    pub fn eval_interval(mut self, v: usize) -> Self {
        self.eval_interval = v;
        self
    }

    /// Sets the interval of flushing records in episodes.
    pub fn flush_record_interval(mut self, v: usize) -> Self {
        self.flush_record_interval = v;
        self
    }

    /// Enables or disables per-step records.
    pub fn record_steps(mut self, v: bool) -> Self {
        self.record_steps = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of trainer from {}", path_.display());
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of trainer into {}", path_.display());
        Ok(())
    }
}
