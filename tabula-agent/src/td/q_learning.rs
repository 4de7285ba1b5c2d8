//! Q-learning.
use super::{select, td_target, TdConfig};
use crate::{explorer::TdExplorer, QTable};
use anyhow::Result;
use rand::Rng;
use tabula_core::{
    record::Record, Act, Agent, Configurable, Env, Policy, TabularObs, Transition,
};

/// Off-policy TD control.
///
/// The target of an update is `r + gamma * max_a' Q[s', a']`, or `r` when
/// `s'` is terminal.
pub struct QLearning {
    q: QTable,
    alpha: f64,
    gamma: f64,
    explorer: TdExplorer,
    train: bool,
}

impl QLearning {
    /// The action-value table.
    pub fn q_table(&self) -> &QTable {
        &self.q
    }

    /// The explorer.
    pub fn explorer(&self) -> &TdExplorer {
        &self.explorer
    }

    /// Selects an action in `cell`.
    pub fn select_action(&mut self, cell: (usize, usize), rng: &mut impl Rng) -> Result<usize> {
        let values = self.q.action_values(cell)?;
        select(&values, self.train, &mut self.explorer, rng)
    }

    /// Applies one update and returns the TD error.
    pub fn update(
        &mut self,
        cell: (usize, usize),
        a: usize,
        reward: f64,
        next_cell: (usize, usize),
        is_terminated: bool,
    ) -> Result<f64> {
        let bootstrap = self.q.max(next_cell)?;
        let target = td_target(reward, self.gamma, bootstrap, is_terminated);
        Ok(self.q.update(cell, a, target, self.alpha)?)
    }
}

impl Configurable for QLearning {
    type Config = TdConfig;

    fn build(config: TdConfig) -> Result<Self> {
        config.check()?;
        Ok(Self {
            q: QTable::new(config.rows, config.cols, config.n_actions, config.q_init),
            alpha: config.alpha,
            gamma: config.gamma,
            explorer: config.explorer,
            train: true,
        })
    }
}

impl<E> Policy<E> for QLearning
where
    E: Env,
    E::Obs: TabularObs,
    E::Act: From<usize>,
{
    fn sample(&mut self, obs: &E::Obs, rng: &mut impl Rng) -> Result<E::Act> {
        Ok(self.select_action(obs.cell(), rng)?.into())
    }
}

impl<E> Agent<E> for QLearning
where
    E: Env,
    E::Obs: TabularObs,
    E::Act: From<usize>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, t: &Transition<E>, _rng: &mut impl Rng) -> Result<Record> {
        let td_error = self.update(
            t.obs.cell(),
            t.act.index(),
            t.reward,
            t.next_obs.cell(),
            t.is_terminated,
        )?;
        Ok(Record::from_scalar("td_error", td_error as f32))
    }
}
