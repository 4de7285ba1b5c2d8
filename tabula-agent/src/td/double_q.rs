//! Double Q-learning.
use super::{select, td_target, TdConfig};
use crate::{explorer::TdExplorer, QTable};
use anyhow::Result;
use log::trace;
use rand::Rng;
use tabula_core::{
    record::{Record, RecordValue},
    util::argmax_random_tie,
    Act, Agent, Configurable, Env, Policy, TabularObs, Transition,
};

/// Which table an update modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleQSide {
    /// Table A.
    A,
    /// Table B.
    B,
}

/// Off-policy TD control with two independent estimators.
///
/// Each update flips a fair coin. On heads the greedy action of `Q_A` in
/// `s'` is evaluated with `Q_B` and only `Q_A` is updated; tails is
/// symmetric. Behavior uses `Q_A + Q_B`.
pub struct DoubleQLearning {
    q_a: QTable,
    q_b: QTable,
    alpha: f64,
    gamma: f64,
    explorer: TdExplorer,
    train: bool,
}

impl DoubleQLearning {
    /// Table A.
    pub fn q_a(&self) -> &QTable {
        &self.q_a
    }

    /// Table B.
    pub fn q_b(&self) -> &QTable {
        &self.q_b
    }

    /// `Q_A + Q_B`, the values behavior is based on.
    pub fn combined(&self) -> Result<QTable> {
        Ok(self.q_a.sum(&self.q_b)?)
    }

    /// The explorer.
    pub fn explorer(&self) -> &TdExplorer {
        &self.explorer
    }

    /// Selects an action in `cell` from the combined values.
    pub fn select_action(&mut self, cell: (usize, usize), rng: &mut impl Rng) -> Result<usize> {
        let values: Vec<f64> = self
            .q_a
            .row(cell)?
            .iter()
            .zip(self.q_b.row(cell)?.iter())
            .map(|(a, b)| a + b)
            .collect();
        select(&values, self.train, &mut self.explorer, rng)
    }

    /// Applies one update to the table chosen by a coin flip and returns the
    /// chosen side with the TD error.
    pub fn update(
        &mut self,
        cell: (usize, usize),
        a: usize,
        reward: f64,
        next_cell: (usize, usize),
        is_terminated: bool,
        rng: &mut impl Rng,
    ) -> Result<(DoubleQSide, f64)> {
        let side = if rng.gen_bool(0.5) {
            DoubleQSide::A
        } else {
            DoubleQSide::B
        };
        let (learner, evaluator) = match side {
            DoubleQSide::A => (&mut self.q_a, &self.q_b),
            DoubleQSide::B => (&mut self.q_b, &self.q_a),
        };

        learner.check(cell, a)?;
        let best = argmax_random_tie(&learner.action_values(next_cell)?, rng);
        let bootstrap = evaluator.get(next_cell, best)?;
        let target = td_target(reward, self.gamma, bootstrap, is_terminated);
        let td_error = learner.update(cell, a, target, self.alpha)?;
        trace!("Double Q: updated {:?}, td_error = {}", side, td_error);
        Ok((side, td_error))
    }
}

impl Configurable for DoubleQLearning {
    type Config = TdConfig;

    fn build(config: TdConfig) -> Result<Self> {
        config.check()?;
        let q = QTable::new(config.rows, config.cols, config.n_actions, config.q_init);
        Ok(Self {
            q_a: q.clone(),
            q_b: q,
            alpha: config.alpha,
            gamma: config.gamma,
            explorer: config.explorer,
            train: true,
        })
    }
}

impl<E> Policy<E> for DoubleQLearning
where
    E: Env,
    E::Obs: TabularObs,
    E::Act: From<usize>,
{
    fn sample(&mut self, obs: &E::Obs, rng: &mut impl Rng) -> Result<E::Act> {
        Ok(self.select_action(obs.cell(), rng)?.into())
    }
}

impl<E> Agent<E> for DoubleQLearning
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

    fn opt_with_record(&mut self, t: &Transition<E>, rng: &mut impl Rng) -> Result<Record> {
        let (side, td_error) = self.update(
            t.obs.cell(),
            t.act.index(),
            t.reward,
            t.next_obs.cell(),
            t.is_terminated,
            rng,
        )?;
        let side = match side {
            DoubleQSide::A => "A",
            DoubleQSide::B => "B",
        };
        Ok(Record::from_slice(&[
            ("td_error", RecordValue::Scalar(td_error as f32)),
            ("updated_table", RecordValue::String(side.to_string())),
        ]))
    }
}
