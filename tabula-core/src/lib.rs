#![warn(missing_docs)]
//! Core components of tabular reinforcement learning.
//!
//! The crate defines the interaction protocol between environments and agents
//! ([`Env`], [`Policy`], [`Agent`]), the enumerated transition model consumed by
//! dynamic-programming solvers ([`TransitionModel`]), the training loop
//! ([`Trainer`]), evaluation ([`Evaluator`]) and a small record system used to
//! report metrics to external collaborators.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{
    Act, Agent, Configurable, DiscreteAct, Env, Info, Obs, Policy, Step, TabularObs, Transition,
};

mod model;
pub use model::{Outcome, StateKind, TransitionModel};

mod trainer;
pub use trainer::{Sampler, TrainStats, Trainer, TrainerConfig};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};
