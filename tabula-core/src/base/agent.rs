//! Agent.
use super::{Env, Policy, Transition};
use crate::record::Record;
use anyhow::Result;
use rand::Rng;

/// Represents a trainable policy on an environment.
///
/// In training mode [`Policy::sample`] follows the behavior (exploring)
/// policy; in evaluation mode it follows the greedy policy derived from the
/// agent's current estimates.
pub trait Agent<E: Env>: Policy<E> {
    /// If `true`, the training loop selects the action for the next
    /// observation before calling [`Agent::opt`], passes it in
    /// [`Transition::next_act`] and executes it on the following step.
    const ON_POLICY: bool = false;

    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an update with a single transition.
    fn opt(&mut self, transition: &Transition<E>, rng: &mut impl Rng) -> Result<()> {
        self.opt_with_record(transition, rng).map(|_| ())
    }

    /// Performs an update with a single transition and returns some information.
    fn opt_with_record(&mut self, transition: &Transition<E>, rng: &mut impl Rng)
        -> Result<Record>;
}
