mod error;
mod matrix;
mod problem;
mod simplex;
mod solution;

pub use error::SolveError;
pub use matrix::{dot, Matrix};
pub use problem::{Basis, StandardForm};
pub use simplex::Solver;
pub use solution::{Infeasibility, IterationRecord, Outcome, Pivot, Solution, SolutionStatus};
