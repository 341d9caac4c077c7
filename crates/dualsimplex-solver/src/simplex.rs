use log::{debug, info, trace};

use crate::error::SolveError;
use crate::matrix::Matrix;
use crate::problem::{Basis, StandardForm};
use crate::solution::{Infeasibility, IterationRecord, Outcome, Pivot, Solution};

/// Dual simplex solver for problems in standard form.
///
/// The caller supplies a starting basis whose dual vector is feasible. Each
/// iteration recomputes the basic solution from scratch, while the dual
/// vector is computed once and then only updated along the pivot row.
pub struct Solver {
    /// Maximum iterations before giving up
    max_iterations: usize,
    /// Tolerance for sign tests against zero
    tolerance: f64,
    /// Record every iteration in the outcome
    trace: bool,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            trace: false,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Run the dual simplex method from `basis` until the basic solution is
    /// non-negative or infeasibility is proven.
    pub fn solve(&self, problem: &StandardForm, basis: Basis) -> Result<Outcome, SolveError> {
        basis.validate(problem)?;
        info!(
            "dual simplex: {} constraints, {} variables, starting basis {:?}",
            problem.num_constraints(),
            problem.num_variables(),
            basis.to_one_based()
        );

        let mut basis = basis;
        let mut duals: Option<Vec<f64>> = None;
        let mut records = Vec::new();
        let costs = problem.costs();
        let matrix = problem.matrix();

        for iteration in 1..=self.max_iterations {
            let basis_matrix = matrix.select_columns(basis.indices());
            let inverse = basis_matrix
                .inverse()
                .ok_or(SolveError::SingularBasis { iteration })?;
            trace!("iteration {}: basis matrix\n{}inverse\n{}", iteration, basis_matrix, inverse);

            let y = duals.get_or_insert_with(|| self.initial_duals(problem, &basis, &inverse));
            let values = basic_solution(problem, &basis, &inverse);
            trace!("iteration {}: x = {:?}, y = {:?}", iteration, values, y);

            let Some((leaving, leaving_position)) = self.leaving_variable(&values, &basis) else {
                let reduced_costs = (0..problem.num_variables())
                    .map(|j| costs[j] - matrix.column_dot(j, y))
                    .collect();
                let duals = y.clone();
                if self.trace {
                    records.push(IterationRecord {
                        iteration,
                        basis: basis.clone(),
                        values: values.clone(),
                        duals: duals.clone(),
                        pivot: None,
                    });
                }
                let objective_value = problem.objective(&values);
                info!(
                    "optimal after {} iterations, objective {}, basis {:?}",
                    iteration,
                    objective_value,
                    basis.to_one_based()
                );
                return Ok(Outcome::Optimal(Solution {
                    values,
                    objective_value,
                    basis,
                    duals,
                    reduced_costs,
                    iterations: iteration,
                    trace: records,
                }));
            };

            // Pivot row of the basis inverse
            let direction = inverse.row(leaving_position).to_vec();

            let Some((entering, step)) = self.ratio_test(problem, &basis, &direction, y) else {
                if self.trace {
                    records.push(IterationRecord {
                        iteration,
                        basis: basis.clone(),
                        values,
                        duals: y.clone(),
                        pivot: None,
                    });
                }
                info!(
                    "infeasible at iteration {}: no column can replace x{}",
                    iteration,
                    leaving + 1
                );
                return Ok(Outcome::Infeasible(Infeasibility {
                    basis,
                    leaving,
                    certificate: direction,
                    iterations: iteration,
                    trace: records,
                }));
            };

            debug!(
                "iteration {}: x{} leaves slot {}, x{} enters, step {}",
                iteration,
                leaving + 1,
                leaving_position + 1,
                entering + 1,
                step
            );

            if self.trace {
                records.push(IterationRecord {
                    iteration,
                    basis: basis.clone(),
                    values,
                    duals: y.clone(),
                    pivot: Some(Pivot {
                        leaving,
                        leaving_position,
                        entering,
                        step,
                        direction: direction.clone(),
                    }),
                });
            }

            basis.replace(leaving_position, entering);
            for (yi, di) in y.iter_mut().zip(&direction) {
                *yi += step * di;
            }
        }

        Err(SolveError::CyclingDetected {
            iterations: self.max_iterations,
        })
    }

    /// `y = c_B * B^-1`, computed once at the first iteration
    fn initial_duals(&self, problem: &StandardForm, basis: &Basis, inverse: &Matrix) -> Vec<f64> {
        let basic_costs: Vec<f64> = basis.indices().iter().map(|&j| problem.costs()[j]).collect();
        let y = inverse.vec_mul(&basic_costs);

        let max_reduced = max_reduced_cost(problem, basis, &y);
        if max_reduced > self.tolerance {
            info!("starting basis is not dual feasible, largest reduced cost {}", max_reduced);
        }
        y
    }

    /// First variable, in ascending index order, with a negative value,
    /// together with its slot in the basis
    fn leaving_variable(&self, values: &[f64], basis: &Basis) -> Option<(usize, usize)> {
        values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v < -self.tolerance)
            .find_map(|(k, _)| basis.position(k).map(|slot| (k, slot)))
    }

    /// Entering column with the smallest ratio `(c_j - A_j y) / u_j` over
    /// nonbasic columns with `u_j = direction * A_j < 0`. Ties keep the
    /// lowest column index. `None` when no column qualifies.
    ///
    /// The sign test on `u_j` is exact: a tolerance here would declare
    /// problems with tiny negative entries infeasible.
    fn ratio_test(&self, problem: &StandardForm, basis: &Basis, direction: &[f64], y: &[f64]) -> Option<(usize, f64)> {
        let matrix = problem.matrix();
        let mut best: Option<(usize, f64)> = None;

        for j in basis.nonbasic(problem.num_variables()) {
            let u = matrix.column_dot(j, direction);
            if u < 0.0 {
                let sigma = (problem.costs()[j] - matrix.column_dot(j, y)) / u;
                trace!("ratio test: column {} u = {} sigma = {}", j + 1, u, sigma);
                if best.map_or(true, |(_, min)| sigma < min) {
                    best = Some((j, sigma));
                }
            }
        }

        best
    }
}

/// Largest `c_j - A_j y` over nonbasic columns. The ratio test keeps these
/// non-positive, so a positive value marks a start that is not dual feasible.
fn max_reduced_cost(problem: &StandardForm, basis: &Basis, y: &[f64]) -> f64 {
    basis
        .nonbasic(problem.num_variables())
        .into_iter()
        .map(|j| problem.costs()[j] - problem.matrix().column_dot(j, y))
        .fold(f64::NEG_INFINITY, f64::max)
}

/// `x_B = B^-1 b` scattered into a full-length vector
fn basic_solution(problem: &StandardForm, basis: &Basis, inverse: &Matrix) -> Vec<f64> {
    let basic_values = inverse.mul_vec(problem.rhs());
    let mut values = vec![0.0; problem.num_variables()];
    for (&j, v) in basis.indices().iter().zip(basic_values) {
        values[j] = v;
    }
    values
}
