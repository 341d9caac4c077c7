use crate::problem::{Basis, StandardForm};

/// Terminal result of a dual simplex run
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A primal-feasible, hence optimal, basis was reached
    Optimal(Solution),
    /// The ratio test found no entering column: Ax = b, x >= 0 has no solution
    Infeasible(Infeasibility),
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    Optimal,
    Infeasible,
}

/// Optimal basic solution
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Value of every variable (x); nonzero only on basic columns
    pub values: Vec<f64>,
    /// `c^T x`
    pub objective_value: f64,
    /// Final basis
    pub basis: Basis,
    /// Dual vector (y) as carried through the pivots
    pub duals: Vec<f64>,
    /// `c_j - A_j^T y` for every column
    pub reduced_costs: Vec<f64>,
    /// Number of iterations, counting the final feasibility check
    pub iterations: usize,
    /// Per-iteration records, empty unless tracing was enabled
    pub trace: Vec<IterationRecord>,
}

/// Proof that the problem has no feasible point
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Infeasibility {
    /// Basis at the iteration where infeasibility was detected
    pub basis: Basis,
    /// Basic variable with a negative value that no column can replace
    pub leaving: usize,
    /// Row of the basis inverse for the leaving variable.
    ///
    /// Its product with every column of A is non-negative while its product
    /// with b is negative, a Farkas certificate.
    pub certificate: Vec<f64>,
    pub iterations: usize,
    pub trace: Vec<IterationRecord>,
}

/// Snapshot of one iteration
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// 1-based iteration counter
    pub iteration: usize,
    /// Basis the iteration started from
    pub basis: Basis,
    /// Basic solution of that basis
    pub values: Vec<f64>,
    /// Dual vector at the start of the iteration
    pub duals: Vec<f64>,
    /// Pivot performed, `None` on the terminating iteration
    pub pivot: Option<Pivot>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    /// Variable leaving the basis
    pub leaving: usize,
    /// Basis slot it occupied
    pub leaving_position: usize,
    /// Variable entering that slot
    pub entering: usize,
    /// Minimum ratio (sigma_0)
    pub step: f64,
    /// Pivot row of the basis inverse (delta y)
    pub direction: Vec<f64>,
}

impl Outcome {
    pub fn status(&self) -> SolutionStatus {
        match self {
            Outcome::Optimal(_) => SolutionStatus::Optimal,
            Outcome::Infeasible(_) => SolutionStatus::Infeasible,
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, Outcome::Optimal(_))
    }

    pub fn iterations(&self) -> usize {
        match self {
            Outcome::Optimal(s) => s.iterations,
            Outcome::Infeasible(i) => i.iterations,
        }
    }

    pub fn trace(&self) -> &[IterationRecord] {
        match self {
            Outcome::Optimal(s) => &s.trace,
            Outcome::Infeasible(i) => &i.trace,
        }
    }

    pub fn basis(&self) -> &Basis {
        match self {
            Outcome::Optimal(s) => &s.basis,
            Outcome::Infeasible(i) => &i.basis,
        }
    }

    pub fn optimal(self) -> Option<Solution> {
        match self {
            Outcome::Optimal(s) => Some(s),
            Outcome::Infeasible(_) => None,
        }
    }

    pub fn infeasible(self) -> Option<Infeasibility> {
        match self {
            Outcome::Optimal(_) => None,
            Outcome::Infeasible(i) => Some(i),
        }
    }
}

impl Solution {
    /// Largest absolute entry of `A x - b`
    pub fn residual(&self, problem: &StandardForm) -> f64 {
        problem.residual(&self.values)
    }

    pub fn nonzero_count(&self) -> usize {
        self.values.iter().filter(|v| **v != 0.0).count()
    }
}
