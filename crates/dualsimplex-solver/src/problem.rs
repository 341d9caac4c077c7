use crate::error::SolveError;
use crate::matrix::Matrix;

/// A linear program in standard form:
/// minimize `c^T x` subject to `A x = b`, `x >= 0`
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct StandardForm {
    /// Objective coefficients (c), one per variable
    costs: Vec<f64>,
    /// Constraint matrix (A), one row per equality constraint
    matrix: Matrix,
    /// Right-hand side (b), one per constraint
    rhs: Vec<f64>,
}

impl StandardForm {
    pub fn new(costs: Vec<f64>, matrix: Matrix, rhs: Vec<f64>) -> Result<Self, SolveError> {
        let (m, n) = (matrix.nrows(), matrix.ncols());
        if m == 0 || n == 0 {
            return Err(SolveError::EmptyProblem);
        }
        if m > n {
            return Err(SolveError::TooManyConstraints { rows: m, columns: n });
        }
        if costs.len() != n {
            return Err(SolveError::DimensionMismatch {
                what: "cost vector",
                expected: n,
                found: costs.len(),
            });
        }
        if rhs.len() != m {
            return Err(SolveError::DimensionMismatch {
                what: "right-hand side",
                expected: m,
                found: rhs.len(),
            });
        }
        if !costs.iter().all(|v| v.is_finite()) {
            return Err(SolveError::NonFinite("cost vector"));
        }
        if !matrix.is_finite() {
            return Err(SolveError::NonFinite("constraint matrix"));
        }
        if !rhs.iter().all(|v| v.is_finite()) {
            return Err(SolveError::NonFinite("right-hand side"));
        }
        Ok(Self { costs, matrix, rhs })
    }

    /// Convenience constructor from nested rows
    pub fn from_rows(costs: Vec<f64>, rows: Vec<Vec<f64>>, rhs: Vec<f64>) -> Result<Self, SolveError> {
        Self::new(costs, Matrix::from_rows(rows)?, rhs)
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    pub fn num_variables(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn num_constraints(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn objective(&self, x: &[f64]) -> f64 {
        self.costs.iter().zip(x).map(|(c, v)| c * v).sum()
    }

    /// Largest absolute entry of `A x - b`
    pub fn residual(&self, x: &[f64]) -> f64 {
        self.matrix
            .mul_vec(x)
            .iter()
            .zip(&self.rhs)
            .fold(0.0_f64, |acc, (ax, b)| acc.max((ax - b).abs()))
    }
}

/// Ordered set of basic column indices, 0-based.
///
/// Position `i` of the basis names the column of A that forms column `i` of
/// the basis matrix.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basis(Vec<usize>);

impl Basis {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Convert from the 1-based convention used in problem files
    pub fn from_one_based(indices: &[usize]) -> Result<Self, SolveError> {
        indices
            .iter()
            .map(|&i| i.checked_sub(1).ok_or(SolveError::ZeroBasisIndex))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn to_one_based(&self) -> Vec<usize> {
        self.0.iter().map(|i| i + 1).collect()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    /// Slot holding column `index`, if it is basic
    pub fn position(&self, index: usize) -> Option<usize> {
        self.0.iter().position(|&i| i == index)
    }

    /// Put column `entering` into slot `position`, returning the column it replaces
    pub fn replace(&mut self, position: usize, entering: usize) -> usize {
        std::mem::replace(&mut self.0[position], entering)
    }

    /// Columns in `0..num_variables` that are not basic, ascending
    pub fn nonbasic(&self, num_variables: usize) -> Vec<usize> {
        let mut is_basic = vec![false; num_variables];
        for &i in &self.0 {
            if i < num_variables {
                is_basic[i] = true;
            }
        }
        (0..num_variables).filter(|&j| !is_basic[j]).collect()
    }

    /// Check length, range and uniqueness against a problem. Invertibility is
    /// checked by the solver when it forms the basis matrix.
    pub fn validate(&self, problem: &StandardForm) -> Result<(), SolveError> {
        let m = problem.num_constraints();
        let n = problem.num_variables();
        if self.0.len() != m {
            return Err(SolveError::BasisLength {
                expected: m,
                found: self.0.len(),
            });
        }
        let mut seen = vec![false; n];
        for &i in &self.0 {
            if i >= n {
                return Err(SolveError::BasisIndexOutOfRange { index: i, variables: n });
            }
            if seen[i] {
                return Err(SolveError::DuplicateBasisIndex(i));
            }
            seen[i] = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> StandardForm {
        StandardForm::from_rows(
            vec![-2.0, -7.0, 1.0, 0.0],
            vec![vec![1.0, -6.0, 1.0, 0.0], vec![0.0, -5.0, 1.0, 1.0]],
            vec![-6.0, -10.0],
        )
        .unwrap()
    }

    #[test]
    fn test_dimensions() {
        let p = reference();
        assert_eq!(p.num_variables(), 4);
        assert_eq!(p.num_constraints(), 2);
        assert_eq!(p.objective(&[6.0, 2.0, 0.0, 0.0]), -26.0);
        assert_eq!(p.residual(&[6.0, 2.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = StandardForm::from_rows(vec![1.0, 2.0], vec![vec![1.0, 1.0, 1.0]], vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            SolveError::DimensionMismatch {
                what: "cost vector",
                expected: 3,
                found: 2
            }
        );

        let err = StandardForm::from_rows(vec![1.0, 2.0], vec![vec![1.0, 1.0]], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, SolveError::DimensionMismatch { what: "right-hand side", .. }));
    }

    #[test]
    fn test_more_rows_than_columns() {
        let err = StandardForm::from_rows(vec![1.0], vec![vec![1.0], vec![2.0]], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, SolveError::TooManyConstraints { rows: 2, columns: 1 });
    }

    #[test]
    fn test_non_finite() {
        let err = StandardForm::from_rows(vec![f64::NAN], vec![vec![1.0]], vec![1.0]).unwrap_err();
        assert_eq!(err, SolveError::NonFinite("cost vector"));
        assert_eq!(
            StandardForm::from_rows(vec![], vec![], vec![]).unwrap_err(),
            SolveError::EmptyProblem
        );
    }

    #[test]
    fn test_one_based_conversion() {
        let basis = Basis::from_one_based(&[3, 4]).unwrap();
        assert_eq!(basis.indices(), &[2, 3]);
        assert_eq!(basis.to_one_based(), vec![3, 4]);
        assert_eq!(Basis::from_one_based(&[0, 1]).unwrap_err(), SolveError::ZeroBasisIndex);
    }

    #[test]
    fn test_nonbasic_is_ascending_complement() {
        let basis = Basis::new(vec![3, 1]);
        assert_eq!(basis.nonbasic(5), vec![0, 2, 4]);
        assert_eq!(basis.position(1), Some(1));
        assert_eq!(basis.position(0), None);
    }

    #[test]
    fn test_validate() {
        let p = reference();
        assert!(Basis::new(vec![2, 3]).validate(&p).is_ok());
        assert_eq!(
            Basis::new(vec![2]).validate(&p).unwrap_err(),
            SolveError::BasisLength { expected: 2, found: 1 }
        );
        assert_eq!(
            Basis::new(vec![2, 4]).validate(&p).unwrap_err(),
            SolveError::BasisIndexOutOfRange { index: 4, variables: 4 }
        );
        assert_eq!(
            Basis::new(vec![1, 1]).validate(&p).unwrap_err(),
            SolveError::DuplicateBasisIndex(1)
        );
    }

    #[test]
    fn test_replace() {
        let mut basis = Basis::new(vec![2, 3]);
        assert_eq!(basis.replace(0, 1), 2);
        assert_eq!(basis.indices(), &[1, 3]);
    }
}
