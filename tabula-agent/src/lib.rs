#![warn(missing_docs)]
//! Tabular agents.
//!
//! Temporal-difference agents ([`QLearning`], [`Sarsa`], [`DoubleQLearning`])
//! learn a [`QTable`] over grid cells and act through a [`TdExplorer`].
//! Bandit agents ([`SampleAverage`], [`Ucb1Agent`], [`ThompsonAgent`],
//! [`GradientBandit`]) keep per-arm estimates or beliefs for the single state
//! of a bandit.
//!
//! Every agent implements [`Agent`](tabula_core::Agent) for any environment
//! whose observations are [`TabularObs`](tabula_core::TabularObs) and whose
//! actions convert from an index, and also offers inherent `select_action`
//! and `update` methods for use without an environment.
pub mod explorer;
mod bandit;
mod table;
mod td;
pub use bandit::{
    GradientBandit, GradientBanditConfig, SampleAverage, SampleAverageConfig, ThompsonAgent,
    ThompsonConfig, Ucb1Agent, Ucb1Config,
};
pub use explorer::TdExplorer;
pub use table::QTable;
pub use td::{DoubleQLearning, DoubleQSide, QLearning, Sarsa, TdConfig};
