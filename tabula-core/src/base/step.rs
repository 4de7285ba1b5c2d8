//! Environment step.
use super::Env;

/// Additional information to `Obs` and `Act`.
pub trait Info {}

impl Info for () {}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
///
/// An environment emits a [`Step`] object at every interaction step.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation after the action.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f64,

    /// Flag denoting if the episode reached a terminal state.
    pub is_terminated: bool,

    /// Flag denoting if the episode was cut by a step cap.
    pub is_truncated: bool,

    /// Information defined by user.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: E::Obs, act: E::Act, reward: f64, is_terminated: bool, info: E::Info) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated: false,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// A transition `(o_t, a_t, r_t, o_t+1)` handed to an agent's update rule.
///
/// `next_act` is set only for on-policy agents: it is the action already
/// selected for `next_obs`, which will be executed on the following step.
pub struct Transition<E: Env> {
    /// Observation before the action.
    pub obs: E::Obs,

    /// Action.
    pub act: E::Act,

    /// Reward.
    pub reward: f64,

    /// Observation after the action.
    pub next_obs: E::Obs,

    /// Action selected for `next_obs`, if it was requested.
    pub next_act: Option<E::Act>,

    /// Flag denoting if `next_obs` is terminal. No value is bootstrapped
    /// through a terminal transition.
    pub is_terminated: bool,
}
