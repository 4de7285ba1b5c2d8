//! Configuration of dynamic-programming solvers.
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tabula_core::error::RlError;

/// Configuration of [`evaluate_policy`](crate::evaluate_policy),
/// [`PolicyIteration`](crate::PolicyIteration) and
/// [`ValueIteration`](crate::ValueIteration).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DpConfig {
    /// Discount factor.
    pub gamma: f64,

    /// A sweep whose largest value change is below `theta` ends evaluation.
    pub theta: f64,

    /// Cap on sweeps of one evaluation or of value iteration.
    pub max_sweeps: usize,

    /// Cap on evaluation-improvement rounds of policy iteration.
    pub max_iterations: usize,
}

impl Default for DpConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            theta: 1e-6,
            max_sweeps: 10_000,
            max_iterations: 100,
        }
    }
}

impl DpConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the convergence threshold.
    pub fn theta(mut self, v: f64) -> Self {
        self.theta = v;
        self
    }

    /// Sets the sweep cap.
    pub fn max_sweeps(mut self, v: usize) -> Self {
        self.max_sweeps = v;
        self
    }

    /// Sets the iteration cap.
    pub fn max_iterations(mut self, v: usize) -> Self {
        self.max_iterations = v;
        self
    }

    pub(crate) fn check(&self) -> Result<(), RlError> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(RlError::InvalidConfig(format!("gamma = {}", self.gamma)));
        }
        if self.theta.is_nan() || self.theta <= 0.0 {
            return Err(RlError::InvalidConfig(format!("theta = {}", self.theta)));
        }
        Ok(())
    }

    /// Constructs [`DpConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of DP solver from {}", path_.display());
        Ok(b)
    }

    /// Saves [`DpConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of DP solver into {}", path_.display());
        Ok(())
    }
}
