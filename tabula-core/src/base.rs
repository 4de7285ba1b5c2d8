//! Core functionalities.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use policy::{Configurable, Policy};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
pub use step::{Info, Step, Transition};

/// An observation of an environment.
pub trait Obs: Clone + Debug {}

/// An observation addressing a cell of a dense two-dimensional state table.
///
/// Grid positions map to `(row, col)`. Stateless problems, like bandits, use
/// the unit observation `()`, which is the single cell `(0, 0)`.
pub trait TabularObs: Obs {
    /// Returns the `(row, col)` coordinates of the observation.
    fn cell(&self) -> (usize, usize);
}

impl Obs for () {}

impl TabularObs for () {
    fn cell(&self) -> (usize, usize) {
        (0, 0)
    }
}

/// An action of an environment.
pub trait Act: Clone + Debug {
    /// Position of the action in the action enumeration.
    fn index(&self) -> usize;
}

/// An index into a finite action enumeration.
///
/// The index is validated by the environment receiving it, not on
/// construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteAct(pub usize);

impl Act for DiscreteAct {
    fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for DiscreteAct {
    fn from(ix: usize) -> Self {
        Self(ix)
    }
}
