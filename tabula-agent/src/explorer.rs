//! Action-selection rules.
//!
//! [`EpsilonGreedy`] and [`Softmax`] act on a vector of action values and
//! are combined in [`TdExplorer`]. [`Ucb1`] and [`Thompson`] act on per-arm
//! statistics of a bandit.
use anyhow::Result;
use rand::{distributions::WeightedIndex, Rng};
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};
use tabula_core::{
    error::RlError,
    util::{argmax_first, argmax_random_tie, softmax},
};

/// Explorers for temporal-difference agents.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum TdExplorer {
    /// Softmax action selection.
    Softmax(Softmax),

    /// Epsilon-greedy action selection.
    EpsilonGreedy(EpsilonGreedy),
}

impl TdExplorer {
    /// Checks the parameters of the explorer.
    pub fn check(&self) -> Result<(), RlError> {
        match self {
            TdExplorer::Softmax(softmax) => check_temperature(softmax.temperature),
            TdExplorer::EpsilonGreedy(_) => Ok(()),
        }
    }

    /// Selects an action given the values of all actions in the current state.
    pub fn action(&mut self, values: &[f64], rng: &mut impl Rng) -> Result<usize> {
        match self {
            TdExplorer::Softmax(softmax) => softmax.action(values, rng),
            TdExplorer::EpsilonGreedy(egreedy) => Ok(egreedy.action(values, rng)),
        }
    }
}

impl Default for TdExplorer {
    fn default() -> Self {
        TdExplorer::EpsilonGreedy(EpsilonGreedy::constant(0.1))
    }
}

fn check_temperature(t: f64) -> Result<(), RlError> {
    if !(t.is_finite() && t > 0.0) {
        return Err(RlError::InvalidConfig(format!("temperature = {}", t)));
    }
    Ok(())
}

/// Softmax (Boltzmann) explorer.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Softmax {
    /// Values are divided by the temperature before the softmax.
    pub temperature: f64,
}

impl Default for Softmax {
    fn default() -> Self {
        Self::new()
    }
}

impl Softmax {
    /// Constructs softmax explorer with unit temperature.
    pub fn new() -> Self {
        Self { temperature: 1.0 }
    }

    /// Constructs softmax explorer with the given temperature.
    ///
    /// The temperature must be finite and positive.
    pub fn with_temperature(temperature: f64) -> Result<Self, RlError> {
        check_temperature(temperature)?;
        Ok(Self { temperature })
    }

    /// Samples an action from the softmax of `values`.
    ///
    /// Fails if the temperature, possibly set by deserialization, is not
    /// finite and positive.
    pub fn action(&mut self, values: &[f64], rng: &mut impl Rng) -> Result<usize> {
        check_temperature(self.temperature)?;
        let scaled: Vec<f64> = values.iter().map(|v| v / self.temperature).collect();
        sample_categorical(&softmax(&scaled), rng)
    }
}

/// Samples an index from a categorical distribution.
pub fn sample_categorical(probs: &[f64], rng: &mut impl Rng) -> Result<usize> {
    let dist = WeightedIndex::new(probs)
        .map_err(|e| RlError::InvalidState(format!("bad distribution {:?}: {}", probs, e)))?;
    Ok(dist.sample(rng))
}

/// Epsilon-greedy explorer.
///
/// Epsilon decays linearly from `eps_start` to `eps_final` over `final_step`
/// selections and stays at `eps_final` afterwards. Greedy choices break
/// ties uniformly at random among all maximizers.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Number of selections made so far.
    pub n_opts: usize,
    /// Epsilon at the first selection.
    pub eps_start: f64,
    /// Epsilon after `final_step` selections.
    pub eps_final: f64,
    /// Length of the decay.
    pub final_step: usize,
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer with a fixed epsilon.
    pub fn constant(eps: f64) -> Self {
        Self {
            n_opts: 0,
            eps_start: eps,
            eps_final: eps,
            final_step: 1,
        }
    }

    /// Constructs epsilon-greedy explorer decaying from 1.0 to 0.02.
    pub fn with_final_step(final_step: usize) -> Self {
        Self {
            n_opts: 0,
            eps_start: 1.0,
            eps_final: 0.02,
            final_step,
        }
    }

    /// Set the epsilon value at the final step.
    pub fn eps_final(mut self, v: f64) -> Self {
        self.eps_final = v;
        self
    }

    /// Set the epsilon value at the start.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Current epsilon.
    pub fn eps(&self) -> f64 {
        let d = (self.eps_start - self.eps_final) / (self.final_step.max(1) as f64);
        (self.eps_start - d * self.n_opts as f64).max(self.eps_final)
    }

    /// Selects an action given the values of all actions.
    pub fn action(&mut self, values: &[f64], rng: &mut impl Rng) -> usize {
        let eps = self.eps();
        self.n_opts += 1;
        if rng.gen::<f64>() < eps {
            rng.gen_range(0..values.len().max(1))
        } else {
            argmax_random_tie(values, rng)
        }
    }
}

/// UCB1 selection rule.
///
/// Each untried arm is selected once, lowest index first, before any score
/// is computed. Afterwards the arm maximizing
/// `mean[a] + c * sqrt(ln(t) / count[a])` is selected, where `t` counts
/// calls to [`Ucb1::action`] including the current one.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Ucb1 {
    /// Exploration coefficient.
    pub c: f64,
    /// Number of selections so far.
    pub t: u64,
}

impl Ucb1 {
    /// Constructs UCB1 with exploration coefficient `c`.
    pub fn new(c: f64) -> Self {
        Self { c, t: 0 }
    }

    /// Selects an arm.
    pub fn action(&mut self, means: &[f64], counts: &[u64]) -> usize {
        self.t += 1;
        if let Some(untried) = counts.iter().position(|&n| n == 0) {
            return untried;
        }
        let ln_t = (self.t as f64).ln();
        let scores: Vec<f64> = means
            .iter()
            .zip(counts)
            .map(|(m, &n)| m + self.c * (ln_t / n as f64).sqrt())
            .collect();
        argmax_first(&scores)
    }
}

/// Thompson sampling over Beta-Bernoulli beliefs.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct Thompson {}

impl Thompson {
    /// Draws one sample per arm from `Beta(alpha[a], beta[a])` and selects
    /// the largest.
    pub fn action(&self, alpha: &[f64], beta: &[f64], rng: &mut impl Rng) -> Result<usize> {
        let mut samples = Vec::with_capacity(alpha.len());
        for (&a, &b) in alpha.iter().zip(beta) {
            let dist = Beta::new(a, b)
                .map_err(|e| RlError::InvalidState(format!("Beta({}, {}): {}", a, b, e)))?;
            samples.push(dist.sample(rng));
        }
        Ok(argmax_random_tie(&samples, rng))
    }
}
