//! Agents for the single state of a multi-armed bandit.
mod gradient;
mod sample_average;
mod thompson;
mod ucb;
pub use gradient::{GradientBandit, GradientBanditConfig};
pub use sample_average::{SampleAverage, SampleAverageConfig};
pub use thompson::{ThompsonAgent, ThompsonConfig};
pub use ucb::{Ucb1Agent, Ucb1Config};

use anyhow::Result;
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tabula_core::error::RlError;

fn check_arm(a: usize, n_arms: usize) -> Result<(), RlError> {
    if a >= n_arms {
        return Err(RlError::InvalidAction {
            action: a,
            n_actions: n_arms,
        });
    }
    Ok(())
}

fn check_n_arms(n_arms: usize) -> Result<(), RlError> {
    if n_arms == 0 {
        return Err(RlError::InvalidConfig("bandit agent without arms".to_string()));
    }
    Ok(())
}

/// Incremental sample average: `n += 1; mu += (r - mu) / n`.
///
/// Returns `r - mu` before the update.
fn sample_average(mean: &mut f64, count: &mut u64, reward: f64) -> f64 {
    *count += 1;
    let error = reward - *mean;
    *mean += error / *count as f64;
    error
}

fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>, what: &str) -> Result<T> {
    let path_ = path.as_ref().to_owned();
    let file = File::open(path)?;
    let rdr = BufReader::new(file);
    let b = serde_yaml::from_reader(rdr)?;
    info!("Load config of {} from {}", what, path_.display());
    Ok(b)
}

fn save_yaml<T: Serialize>(config: &T, path: impl AsRef<Path>, what: &str) -> Result<()> {
    let path_ = path.as_ref().to_owned();
    let mut file = File::create(path)?;
    file.write_all(serde_yaml::to_string(config)?.as_bytes())?;
    info!("Save config of {} into {}", what, path_.display());
    Ok(())
}
