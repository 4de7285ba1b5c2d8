#![warn(missing_docs)]
//! Environments with small discrete state spaces and exactly known dynamics.
//!
//! * [`GridWorld`] - a rectangular grid with four directional moves, walls,
//!   cliff cells and a single absorbing goal. Its dynamics are exported as a
//!   [`TransitionModel`](tabula_core::TransitionModel) for dynamic programming.
//! * [`BanditEnv`] - a stateless K-armed bandit with Gaussian or Bernoulli
//!   arms.
mod bandit;
mod grid_world;
pub use bandit::{ArmDistribution, BanditConfig, BanditEnv};
pub use grid_world::{GridAction, GridInfo, GridWorld, GridWorldConfig, Pos};
