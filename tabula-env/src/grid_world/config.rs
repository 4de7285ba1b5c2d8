//! Configuration of [`GridWorld`](super::GridWorld).
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tabula_core::{error::RlError, Obs, TabularObs};

/// A grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    /// Row, from the top.
    pub row: usize,

    /// Column, from the left.
    pub col: usize,
}

impl Pos {
    /// Constructs a cell.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Obs for Pos {}

impl TabularObs for Pos {
    fn cell(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

impl From<(usize, usize)> for Pos {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Configuration of [`GridWorld`](super::GridWorld).
///
/// The move into the goal pays `step_reward + terminal_reward`, not
/// `terminal_reward` alone. A maze that pays only a goal reward `R` is
/// configured with `step_reward(0.0).terminal_reward(R)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridWorldConfig {
    /// Number of rows.
    pub rows: usize,

    /// Number of columns.
    pub cols: usize,

    /// Cell where episodes begin.
    pub start: Pos,

    /// The terminal cell.
    pub goal: Pos,

    /// Cells that cannot be entered.
    pub walls: Vec<Pos>,

    /// Cells that send the agent back to `start`.
    pub cliffs: Vec<Pos>,

    /// Reward of every move.
    pub step_reward: f64,

    /// Bonus paid on top of `step_reward` when arriving at the goal.
    ///
    /// The move into the goal pays `step_reward + terminal_reward`. To pay
    /// exactly `R` on arrival, set this to `R - step_reward`.
    pub terminal_reward: f64,

    /// Reward paid instead of `step_reward` for a clipped move.
    pub bump_reward: Option<f64>,

    /// Reward of landing on a cliff cell.
    pub cliff_reward: f64,
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl GridWorldConfig {
    /// An obstacle-free `rows x cols` grid from the top-left to the
    /// bottom-right corner with step reward `-1` and no terminal bonus.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            start: Pos::new(0, 0),
            goal: Pos::new(rows.saturating_sub(1), cols.saturating_sub(1)),
            walls: vec![],
            cliffs: vec![],
            step_reward: -1.0,
            terminal_reward: 0.0,
            bump_reward: None,
            cliff_reward: -100.0,
        }
    }

    /// The 4 x 12 cliff-walking layout: start and goal at the ends of the
    /// bottom row, cliff cells between them.
    pub fn cliff_walking() -> Self {
        Self::new(4, 12)
            .start(Pos::new(3, 0))
            .goal(Pos::new(3, 11))
            .cliffs((1..11).map(|col| Pos::new(3, col)).collect())
    }

    /// Sets the start cell.
    pub fn start(mut self, v: Pos) -> Self {
        self.start = v;
        self
    }

    /// Sets the goal cell.
    pub fn goal(mut self, v: Pos) -> Self {
        self.goal = v;
        self
    }

    /// Sets the wall cells.
    pub fn walls(mut self, v: Vec<Pos>) -> Self {
        self.walls = v;
        self
    }

    /// Sets the cliff cells.
    pub fn cliffs(mut self, v: Vec<Pos>) -> Self {
        self.cliffs = v;
        self
    }

    /// Sets the step reward.
    pub fn step_reward(mut self, v: f64) -> Self {
        self.step_reward = v;
        self
    }

    /// Sets the bonus of arriving at the goal.
    pub fn terminal_reward(mut self, v: f64) -> Self {
        self.terminal_reward = v;
        self
    }

    /// Sets the reward of a clipped move.
    pub fn bump_reward(mut self, v: Option<f64>) -> Self {
        self.bump_reward = v;
        self
    }

    /// Sets the reward of landing on a cliff cell.
    pub fn cliff_reward(mut self, v: f64) -> Self {
        self.cliff_reward = v;
        self
    }

    fn contains(&self, p: &Pos) -> bool {
        p.row < self.rows && p.col < self.cols
    }

    /// Checks that the layout is consistent.
    pub fn check(&self) -> Result<(), RlError> {
        let invalid = |msg: String| -> Result<(), RlError> { Err(RlError::InvalidConfig(msg)) };
        if self.rows == 0 || self.cols == 0 {
            return invalid(format!("empty grid {} x {}", self.rows, self.cols));
        }
        for (name, p) in [("start", &self.start), ("goal", &self.goal)] {
            if !self.contains(p) {
                return invalid(format!("{} {:?} outside the grid", name, p));
            }
            if self.walls.contains(p) || self.cliffs.contains(p) {
                return invalid(format!("{} {:?} is a wall or cliff cell", name, p));
            }
        }
        if let Some(p) = self
            .walls
            .iter()
            .chain(self.cliffs.iter())
            .find(|p| !self.contains(p))
        {
            return invalid(format!("cell {:?} outside the grid", p));
        }
        Ok(())
    }

    /// Constructs [`GridWorldConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of grid world from {}", path_.display());
        Ok(b)
    }

    /// Saves [`GridWorldConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of grid world into {}", path_.display());
        Ok(())
    }
}
