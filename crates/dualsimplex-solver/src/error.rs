use thiserror::Error;

/// Faults that abort a solve. Infeasibility is not one of them, it is an
/// [`Outcome`](crate::Outcome).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Problem has no constraints")]
    EmptyProblem,
    #[error("Problem has {rows} constraints but only {columns} variables")]
    TooManyConstraints { rows: usize, columns: usize },
    #[error("Matrix row {row} has {found} entries, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Length of {what} is {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("Basis has {found} indices, expected {expected}")]
    BasisLength { expected: usize, found: usize },
    #[error("Basis index {index} out of range for {variables} variables")]
    BasisIndexOutOfRange { index: usize, variables: usize },
    #[error("Basis index {0} appears more than once")]
    DuplicateBasisIndex(usize),
    #[error("Basis indices are 1-based, found 0")]
    ZeroBasisIndex,
    #[error("Basis matrix is singular at iteration {iteration}")]
    SingularBasis { iteration: usize },
    #[error("No optimal basis after {iterations} iterations, the pivot sequence is likely cycling")]
    CyclingDetected { iterations: usize },
}
