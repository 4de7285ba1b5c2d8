//! Configuration of temporal-difference agents.
use crate::explorer::TdExplorer;
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tabula_core::error::RlError;

/// Configuration shared by [`QLearning`](super::QLearning),
/// [`Sarsa`](super::Sarsa) and [`DoubleQLearning`](super::DoubleQLearning).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TdConfig {
    /// Number of grid rows.
    pub rows: usize,

    /// Number of grid columns.
    pub cols: usize,

    /// Number of actions.
    pub n_actions: usize,

    /// Step size.
    pub alpha: f64,

    /// Discount factor.
    pub gamma: f64,

    /// Initial action value.
    pub q_init: f64,

    /// Behavior policy in training mode.
    pub explorer: TdExplorer,
}

impl Default for TdConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            n_actions: 4,
            alpha: 0.1,
            gamma: 0.99,
            q_init: 0.0,
            explorer: TdExplorer::default(),
        }
    }
}

impl TdConfig {
    /// Configuration for a `rows x cols` grid with four actions.
    pub fn grid(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Sets the number of actions.
    pub fn n_actions(mut self, v: usize) -> Self {
        self.n_actions = v;
        self
    }

    /// Sets the step size.
    pub fn alpha(mut self, v: f64) -> Self {
        self.alpha = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the initial action value.
    pub fn q_init(mut self, v: f64) -> Self {
        self.q_init = v;
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: TdExplorer) -> Self {
        self.explorer = v;
        self
    }

    pub(super) fn check(&self) -> Result<(), RlError> {
        if self.rows == 0 || self.cols == 0 || self.n_actions == 0 {
            return Err(RlError::InvalidConfig(format!(
                "empty table {} x {} x {}",
                self.rows, self.cols, self.n_actions
            )));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(RlError::InvalidConfig(format!("alpha = {}", self.alpha)));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(RlError::InvalidConfig(format!("gamma = {}", self.gamma)));
        }
        self.explorer.check()
    }

    /// Constructs [`TdConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of TD agent from {}", path_.display());
        Ok(b)
    }

    /// Saves [`TdConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of TD agent into {}", path_.display());
        Ok(())
    }
}
