//! Tabular reinforcement learning on small, fully enumerable problems.
//!
//! Tabula consists of the following crates:
//!
//! * [tabula-core](tabula_core) provides the interaction protocol between
//!   environments and agents, the enumerated transition model, the training
//!   loop, evaluation and records.
//! * [tabula-env](tabula_env) includes a configurable grid-world, cliff
//!   walking and multi-armed bandits with Gaussian or Bernoulli arms.
//! * [tabula-agent](tabula_agent) includes Q-learning, SARSA, double
//!   Q-learning and the bandit agents: sample average, UCB1, Thompson
//!   sampling and the gradient bandit.
//! * [tabula-dp](tabula_dp) solves a known model with policy evaluation,
//!   policy iteration and value iteration.
//!
//! This crate re-exports them and hosts the end-to-end tests and demos.
//!
//! ```rust
//! use tabula::{
//!     agent::{QLearning, TdConfig},
//!     core::{record::NullRecorder, Configurable, DefaultEvaluator, Trainer, TrainerConfig},
//!     env::{GridWorld, GridWorldConfig},
//! };
//!
//! let env_config = GridWorldConfig::new(3, 3);
//! let mut agent = QLearning::build(TdConfig::grid(3, 3).alpha(0.5)).unwrap();
//! let mut evaluator = DefaultEvaluator::<GridWorld>::new(&env_config, 1).unwrap();
//! let mut trainer = Trainer::<GridWorld>::build(TrainerConfig::default().max_episodes(50), env_config);
//! let stats = trainer.train(&mut agent, &mut NullRecorder {}, &mut evaluator).unwrap();
//! assert_eq!(stats.episodes, 50);
//! ```
pub use tabula_agent as agent;
pub use tabula_core as core;
pub use tabula_dp as dp;
pub use tabula_env as env;
