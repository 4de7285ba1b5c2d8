//! Dense action-value table.
use ndarray::{s, Array2, Array3, ArrayView1};
use tabula_core::{
    error::RlError,
    util::{argmax_first, best_actions},
};

/// Action values `Q[row, col, action]` over a grid of cells.
///
/// Bandits use a `1 x 1` grid. Every access through [`QTable::get`] and
/// [`QTable::update`] is bounds-checked and fails with
/// [`RlError::InvalidState`] or [`RlError::InvalidAction`].
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    q: Array3<f64>,
}

impl QTable {
    /// A table filled with `init`.
    pub fn new(rows: usize, cols: usize, n_actions: usize, init: f64) -> Self {
        Self {
            q: Array3::from_elem((rows, cols, n_actions), init),
        }
    }

    /// `(rows, cols, n_actions)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.q.dim()
    }

    /// Number of actions.
    pub fn n_actions(&self) -> usize {
        self.q.dim().2
    }

    /// The underlying array.
    pub fn as_array(&self) -> &Array3<f64> {
        &self.q
    }

    /// Fails unless `cell` and `a` lie inside the table.
    pub fn check(&self, cell: (usize, usize), a: usize) -> Result<(), RlError> {
        let (rows, cols, n_actions) = self.q.dim();
        if cell.0 >= rows || cell.1 >= cols {
            return Err(RlError::InvalidState(format!(
                "{:?} outside {} x {} table",
                cell, rows, cols
            )));
        }
        if a >= n_actions {
            return Err(RlError::InvalidAction {
                action: a,
                n_actions,
            });
        }
        Ok(())
    }

    fn check_cell(&self, cell: (usize, usize)) -> Result<(), RlError> {
        self.check(cell, 0)
    }

    /// `Q[cell, a]`.
    pub fn get(&self, cell: (usize, usize), a: usize) -> Result<f64, RlError> {
        self.check(cell, a)?;
        Ok(self.q[[cell.0, cell.1, a]])
    }

    /// Values of all actions in `cell`.
    pub fn row(&self, cell: (usize, usize)) -> Result<ArrayView1<f64>, RlError> {
        self.check_cell(cell)?;
        Ok(self.q.slice(s![cell.0, cell.1, ..]))
    }

    /// Values of all actions in `cell`, as a vector.
    pub fn action_values(&self, cell: (usize, usize)) -> Result<Vec<f64>, RlError> {
        Ok(self.row(cell)?.to_vec())
    }

    /// `max_a Q[cell, a]`.
    pub fn max(&self, cell: (usize, usize)) -> Result<f64, RlError> {
        Ok(self
            .row(cell)?
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max))
    }

    /// Moves `Q[cell, a]` toward `target` by step size `alpha` and returns
    /// the temporal-difference error `target - Q[cell, a]` before the move.
    pub fn update(
        &mut self,
        cell: (usize, usize),
        a: usize,
        target: f64,
        alpha: f64,
    ) -> Result<f64, RlError> {
        self.check(cell, a)?;
        let q = &mut self.q[[cell.0, cell.1, a]];
        let td_error = target - *q;
        *q += alpha * td_error;
        Ok(td_error)
    }

    /// Element-wise sum of two tables of the same shape.
    pub fn sum(&self, other: &QTable) -> Result<QTable, RlError> {
        if self.q.dim() != other.q.dim() {
            return Err(RlError::InvalidState(format!(
                "tables of shape {:?} and {:?}",
                self.q.dim(),
                other.q.dim()
            )));
        }
        Ok(QTable {
            q: &self.q + &other.q,
        })
    }

    /// Greedy action of each cell, lowest index on ties.
    pub fn greedy_policy(&self) -> Array2<usize> {
        let (rows, cols, _) = self.q.dim();
        Array2::from_shape_fn((rows, cols), |(r, c)| {
            argmax_first(&self.q.slice(s![r, c, ..]).to_vec())
        })
    }

    /// All greedy actions of `cell`.
    pub fn greedy_actions(&self, cell: (usize, usize)) -> Result<Vec<usize>, RlError> {
        Ok(best_actions(&self.action_values(cell)?))
    }

    /// State values `max_a Q[row, col, a]`.
    pub fn state_values(&self) -> Array2<f64> {
        let (rows, cols, _) = self.q.dim();
        Array2::from_shape_fn((rows, cols), |(r, c)| {
            self.q
                .slice(s![r, c, ..])
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max)
        })
    }

    /// `true` if every value is finite.
    pub fn is_finite(&self) -> bool {
        self.q.iter().all(|v| v.is_finite())
    }
}
