use serde::{Deserialize, Serialize};
use tabula_core::error::RlError;

/// The four moves of a grid-world, in action-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridAction {
    /// Row - 1.
    Up = 0,
    /// Col + 1.
    Right = 1,
    /// Col - 1.
    Left = 2,
    /// Row + 1.
    Down = 3,
}

impl GridAction {
    /// All actions, indexed by their discriminant.
    pub const ALL: [GridAction; 4] = [
        GridAction::Up,
        GridAction::Right,
        GridAction::Left,
        GridAction::Down,
    ];

    /// Action of an index, failing with [`RlError::InvalidAction`] on
    /// anything outside `0..4`.
    pub fn from_index(ix: usize) -> Result<Self, RlError> {
        Self::ALL.get(ix).copied().ok_or(RlError::InvalidAction {
            action: ix,
            n_actions: Self::ALL.len(),
        })
    }

    /// `(d_row, d_col)` of the move.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            GridAction::Up => (-1, 0),
            GridAction::Right => (0, 1),
            GridAction::Left => (0, -1),
            GridAction::Down => (1, 0),
        }
    }
}
