//! SARSA.
use super::{select, td_target, TdConfig};
use crate::{explorer::TdExplorer, QTable};
use anyhow::{anyhow, Result};
use rand::Rng;
use tabula_core::{
    record::Record, Act, Agent, Configurable, Env, Policy, TabularObs, Transition,
};

/// On-policy TD control.
///
/// The target of an update is `r + gamma * Q[s', a']`, where `a'` is the
/// action the behavior policy has already selected for `s'` and will execute
/// next. The training loop provides `a'` in
/// [`Transition::next_act`](tabula_core::Transition).
pub struct Sarsa {
    q: QTable,
    alpha: f64,
    gamma: f64,
    explorer: TdExplorer,
    train: bool,
}

impl Sarsa {
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
    ///
    /// `next_a` may be `None` only if `is_terminated`.
    pub fn update(
        &mut self,
        cell: (usize, usize),
        a: usize,
        reward: f64,
        next_cell: (usize, usize),
        next_a: Option<usize>,
        is_terminated: bool,
    ) -> Result<f64> {
        let bootstrap = match (is_terminated, next_a) {
            (true, _) => 0.0,
            (false, Some(next_a)) => self.q.get(next_cell, next_a)?,
            (false, None) => {
                return Err(anyhow!(
                    "SARSA update from {:?} needs the next action",
                    cell
                ))
            }
        };
        let target = td_target(reward, self.gamma, bootstrap, is_terminated);
        Ok(self.q.update(cell, a, target, self.alpha)?)
    }
}

impl Configurable for Sarsa {
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

impl<E> Policy<E> for Sarsa
where
    E: Env,
    E::Obs: TabularObs,
    E::Act: From<usize>,
{
    fn sample(&mut self, obs: &E::Obs, rng: &mut impl Rng) -> Result<E::Act> {
        Ok(self.select_action(obs.cell(), rng)?.into())
    }
}

impl<E> Agent<E> for Sarsa
where
    E: Env,
    E::Obs: TabularObs,
    E::Act: From<usize>,
{
    const ON_POLICY: bool = true;

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
            t.next_act.as_ref().map(|a| a.index()),
            t.is_terminated,
        )?;
        Ok(Record::from_scalar("td_error", td_error as f32))
    }
}
