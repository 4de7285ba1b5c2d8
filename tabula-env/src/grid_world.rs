//! Grid-world environment.
mod action;
mod config;
pub use action::GridAction;
pub use config::{GridWorldConfig, Pos};

use anyhow::Result;
use itertools::iproduct;
use log::debug;
use rand::Rng;
use std::collections::HashSet;
use tabula_core::{
    error::RlError, Act, DiscreteAct, Env, Info, Outcome, StateKind, Step, TransitionModel,
};

/// What happened on a grid step besides the move itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridInfo {
    /// The move was clipped by the boundary or a wall.
    pub bumped: bool,

    /// The agent landed on a cliff cell and was sent back to the start.
    pub fell: bool,
}

impl Info for GridInfo {}

/// A rectangular grid-world.
///
/// States are cells `(row, col)` and the four actions are those of
/// [`GridAction`]. Moving off the grid or into a wall leaves the agent in
/// place. Every move pays `step_reward`, or `bump_reward` if set and the move
/// was clipped. Arriving at the goal additionally pays `terminal_reward` and
/// terminates the episode. Landing on a cliff cell pays `cliff_reward` and
/// teleports the agent to the start without terminating.
///
/// After termination the goal is absorbing: further steps stay on it with
/// zero reward until [`Env::reset`] is called.
pub struct GridWorld {
    config: GridWorldConfig,
    walls: HashSet<Pos>,
    cliffs: HashSet<Pos>,
    pos: Pos,
}

impl GridWorld {
    /// The configuration.
    pub fn config(&self) -> &GridWorldConfig {
        &self.config
    }

    /// Current cell.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.config.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.config.cols
    }

    /// `true` if `pos` is a wall cell.
    pub fn is_wall(&self, pos: &Pos) -> bool {
        self.walls.contains(pos)
    }

    /// `true` if `pos` is the goal.
    pub fn is_goal(&self, pos: &Pos) -> bool {
        *pos == self.config.goal
    }

    fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.config.rows && (col as usize) < self.config.cols
    }

    /// Deterministic dynamics: `(next, reward, done, info)` of moving from `from`.
    ///
    /// Fails with [`RlError::InvalidState`] if `from` is outside the grid.
    pub fn transition(
        &self,
        from: Pos,
        a: GridAction,
    ) -> Result<(Pos, f64, bool, GridInfo), RlError> {
        let config = &self.config;
        if from.row >= config.rows || from.col >= config.cols {
            return Err(RlError::InvalidState(format!(
                "{:?} outside {} x {} grid",
                from, config.rows, config.cols
            )));
        }
        if self.is_goal(&from) {
            return Ok((from, 0.0, true, GridInfo::default()));
        }

        let (dr, dc) = a.delta();
        let (row, col) = (from.row as isize + dr, from.col as isize + dc);
        let candidate = Pos::new(row.max(0) as usize, col.max(0) as usize);
        let bumped = !self.in_bounds(row, col) || self.is_wall(&candidate);
        let next = if bumped { from } else { candidate };

        let outcome = if self.is_goal(&next) {
            let reward = config.step_reward + config.terminal_reward;
            (next, reward, true, GridInfo::default())
        } else if self.cliffs.contains(&next) {
            let info = GridInfo {
                bumped: false,
                fell: true,
            };
            (config.start, config.cliff_reward, false, info)
        } else {
            let reward = match (bumped, config.bump_reward) {
                (true, Some(r)) => r,
                _ => config.step_reward,
            };
            let info = GridInfo {
                bumped,
                fell: false,
            };
            (next, reward, false, info)
        };
        Ok(outcome)
    }

    /// Enumerated transition model of the grid.
    ///
    /// The goal and wall cells are fixed states with absorbing self-loops.
    pub fn model(&self) -> Result<TransitionModel> {
        let (rows, cols) = (self.config.rows, self.config.cols);
        let n_states = rows * cols;
        let mut kinds = Vec::with_capacity(n_states);
        let mut outcomes = Vec::with_capacity(n_states);

        for (row, col) in iproduct!(0..rows, 0..cols) {
            let (s, pos) = (row * cols + col, Pos::new(row, col));
            let kind = if self.is_wall(&pos) {
                StateKind::Wall
            } else if self.is_goal(&pos) {
                StateKind::Terminal
            } else {
                StateKind::Regular
            };

            let per_action = GridAction::ALL
                .iter()
                .map(|a| match kind {
                    StateKind::Regular => {
                        let (next, reward, done, _) = self.transition(pos, *a)?;
                        Ok(vec![Outcome::certain(next.row * cols + next.col, reward, done)])
                    }
                    _ => Ok(vec![Outcome::certain(s, 0.0, true)]),
                })
                .collect::<Result<Vec<_>, RlError>>()?;
            kinds.push(kind);
            outcomes.push(per_action);
        }

        debug!("Built transition model of {} x {} grid", rows, cols);
        TransitionModel::new(rows, cols, GridAction::ALL.len(), kinds, outcomes)
    }
}

impl Env for GridWorld {
    type Config = GridWorldConfig;
    type Obs = Pos;
    type Act = DiscreteAct;
    type Info = GridInfo;

    fn build(config: &Self::Config) -> Result<Self> {
        config.check()?;
        Ok(Self {
            walls: config.walls.iter().copied().collect(),
            cliffs: config.cliffs.iter().copied().collect(),
            pos: config.start,
            config: config.clone(),
        })
    }

    fn n_actions(&self) -> usize {
        GridAction::ALL.len()
    }

    fn reset(&mut self) -> Result<Pos> {
        self.pos = self.config.start;
        Ok(self.pos)
    }

    fn step(&mut self, a: &DiscreteAct, _rng: &mut impl Rng) -> Result<Step<Self>> {
        let action = GridAction::from_index(a.index())?;
        let (next, reward, done, info) = self.transition(self.pos, action)?;
        self.pos = next;
        Ok(Step::new(next, *a, reward, done, info))
    }
}

impl From<GridAction> for DiscreteAct {
    fn from(a: GridAction) -> Self {
        DiscreteAct(a as usize)
    }
}

impl TryFrom<DiscreteAct> for GridAction {
    type Error = RlError;

    fn try_from(a: DiscreteAct) -> Result<Self, RlError> {
        GridAction::from_index(a.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn step(env: &mut GridWorld, a: GridAction) -> Step<GridWorld> {
        let mut rng = SmallRng::seed_from_u64(0);
        env.step(&a.into(), &mut rng).unwrap()
    }

    #[test]
    fn test_corners_clip() -> Result<()> {
        let config = GridWorldConfig::new(3, 3).goal(Pos::new(1, 1));
        let mut env = GridWorld::build(&config)?;
        let corners = [
            (Pos::new(0, 0), [GridAction::Up, GridAction::Left]),
            (Pos::new(0, 2), [GridAction::Up, GridAction::Right]),
            (Pos::new(2, 0), [GridAction::Down, GridAction::Left]),
            (Pos::new(2, 2), [GridAction::Down, GridAction::Right]),
        ];
        for (corner, actions) in corners {
            for a in actions {
                let (next, reward, done, info) = env.transition(corner, a)?;
                assert_eq!(next, corner);
                assert_eq!(reward, -1.0);
                assert!(!done);
                assert!(info.bumped);
            }
        }

        let s = step(&mut env, GridAction::Up);
        assert_eq!(s.obs, Pos::new(0, 0));
        Ok(())
    }

    #[test]
    fn test_steps_stay_in_grid() -> Result<()> {
        let config = GridWorldConfig::new(4, 5).walls(vec![Pos::new(1, 1), Pos::new(2, 3)]);
        let env = GridWorld::build(&config)?;
        for row in 0..4 {
            for col in 0..5 {
                let from = Pos::new(row, col);
                for a in GridAction::ALL {
                    let (next, _, _, _) = env.transition(from, a)?;
                    assert!(next.row < 4 && next.col < 5);
                    assert!(!env.is_wall(&next));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_wall_and_bump_reward() -> Result<()> {
        let config = GridWorldConfig::new(3, 3)
            .walls(vec![Pos::new(0, 1)])
            .bump_reward(Some(-5.0));
        let mut env = GridWorld::build(&config)?;
        let s = step(&mut env, GridAction::Right);
        assert_eq!(s.obs, Pos::new(0, 0));
        assert_eq!(s.reward, -5.0);
        assert!(s.info.bumped);

        let s = step(&mut env, GridAction::Down);
        assert_eq!(s.obs, Pos::new(1, 0));
        assert_eq!(s.reward, -1.0);
        Ok(())
    }

    #[test]
    fn test_goal_is_absorbing() -> Result<()> {
        let config = GridWorldConfig::new(1, 2).terminal_reward(10.0);
        let mut env = GridWorld::build(&config)?;
        env.reset()?;
        let s = step(&mut env, GridAction::Right);
        assert_eq!(s.obs, Pos::new(0, 1));
        assert_eq!(s.reward, 9.0);
        assert!(s.is_terminated);

        let s = step(&mut env, GridAction::Left);
        assert_eq!(s.obs, Pos::new(0, 1));
        assert_eq!(s.reward, 0.0);
        assert!(s.is_terminated);

        assert_eq!(env.reset()?, Pos::new(0, 0));
        Ok(())
    }

    #[test]
    fn test_goal_only_reward() -> Result<()> {
        let config = GridWorldConfig::new(1, 3)
            .step_reward(0.0)
            .terminal_reward(1.0);
        let env = GridWorld::build(&config)?;
        assert_eq!(env.transition(Pos::new(0, 0), GridAction::Right)?.1, 0.0);
        let (next, reward, done, _) = env.transition(Pos::new(0, 1), GridAction::Right)?;
        assert_eq!((next, reward, done), (Pos::new(0, 2), 1.0, true));
        Ok(())
    }

    #[test]
    fn test_invalid_action() -> Result<()> {
        let mut env = GridWorld::build(&GridWorldConfig::new(2, 2))?;
        let mut rng = SmallRng::seed_from_u64(0);
        let err = env.step(&DiscreteAct(4), &mut rng).err().unwrap();
        assert_eq!(
            err.downcast_ref::<RlError>(),
            Some(&RlError::InvalidAction {
                action: 4,
                n_actions: 4
            })
        );
        assert_eq!(env.pos(), Pos::new(0, 0));
        Ok(())
    }

    #[test]
    fn test_cliff_sends_back_to_start() -> Result<()> {
        let mut env = GridWorld::build(&GridWorldConfig::cliff_walking())?;
        assert_eq!(env.reset()?, Pos::new(3, 0));
        let s = step(&mut env, GridAction::Right);
        assert_eq!(s.obs, Pos::new(3, 0));
        assert_eq!(s.reward, -100.0);
        assert!(!s.is_terminated);
        assert!(s.info.fell);
        Ok(())
    }

    #[test]
    fn test_model_matches_dynamics() -> Result<()> {
        let config = GridWorldConfig::new(3, 4).walls(vec![Pos::new(1, 1)]);
        let env = GridWorld::build(&config)?;
        let model = env.model()?;
        assert_eq!(model.n_states(), 12);
        assert_eq!(model.kind(5)?, StateKind::Wall);
        assert_eq!(model.kind(11)?, StateKind::Terminal);

        for s in model.regular_states() {
            let pos = Pos::new(s / 4, s % 4);
            for a in GridAction::ALL {
                let (next, reward, done, _) = env.transition(pos, a)?;
                let o = &model.outcomes(s, a as usize)?[0];
                assert_eq!(o.next_state, next.row * 4 + next.col);
                assert_eq!(o.reward, reward);
                assert_eq!(o.done, done);
            }
        }
        Ok(())
    }

    #[test]
    fn test_transition_from_outside_grid() -> Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let env = GridWorld::build(&GridWorldConfig::new(5, 5))?;
        for from in [Pos::new(9, 9), Pos::new(5, 0), Pos::new(0, 5)] {
            assert!(matches!(
                env.transition(from, GridAction::Up),
                Err(RlError::InvalidState(_))
            ));
        }
        assert!(env.transition(Pos::new(4, 3), GridAction::Right)?.2);
        Ok(())
    }
}
