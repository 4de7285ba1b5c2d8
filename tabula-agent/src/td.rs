//! Temporal-difference control on tabular action values.
mod config;
mod double_q;
mod q_learning;
mod sarsa;
pub use config::TdConfig;
pub use double_q::{DoubleQLearning, DoubleQSide};
pub use q_learning::QLearning;
pub use sarsa::Sarsa;

use crate::explorer::TdExplorer;
use anyhow::Result;
use rand::Rng;
use tabula_core::util::argmax_first;

/// Behavior action in training mode, greedy action (lowest index on ties)
/// in evaluation mode.
fn select(
    values: &[f64],
    train: bool,
    explorer: &mut TdExplorer,
    rng: &mut impl Rng,
) -> Result<usize> {
    if train {
        explorer.action(values, rng)
    } else {
        Ok(argmax_first(values))
    }
}

/// `r` on termination, `r + gamma * bootstrap` otherwise.
fn td_target(reward: f64, gamma: f64, bootstrap: f64, is_terminated: bool) -> f64 {
    if is_terminated {
        reward
    } else {
        reward + gamma * bootstrap
    }
}
