//! Environment.
use super::{Act, Info, Obs, Step};
use anyhow::Result;
use rand::Rng;

/// Represents an environment, typically an MDP.
///
/// Environments hold no random source of their own. Stochastic dynamics draw
/// from the generator lent to [`Env::step`], so that a single seed fixes a
/// whole run.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// The number of actions available in every state.
    fn n_actions(&self) -> usize;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step.
    ///
    /// Fails with [`RlError::InvalidAction`](crate::error::RlError::InvalidAction)
    /// if `a` lies outside the action enumeration.
    fn step(&mut self, a: &Self::Act, rng: &mut impl Rng) -> Result<Step<Self>>
    where
        Self: Sized;
}
