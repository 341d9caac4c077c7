use std::fmt;

use crate::error::SolveError;

/// Dense row-major matrix
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: Vec<Vec<f64>>,
    ncols: usize,
}

impl Matrix {
    /// Build a matrix from its rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SolveError> {
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(SolveError::RaggedMatrix {
                    row: i,
                    expected: ncols,
                    found: row.len(),
                });
            }
        }
        Ok(Self { rows, ncols })
    }

    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            rows: vec![vec![0.0; ncols]; nrows],
            ncols,
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.rows[i][i] = 1.0;
        }
        m
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[j]).collect()
    }

    /// Dot product of column `j` with `v`
    pub fn column_dot(&self, j: usize, v: &[f64]) -> f64 {
        self.rows.iter().zip(v).map(|(r, &vi)| r[j] * vi).sum()
    }

    /// Square submatrix whose i-th column is column `columns[i]` of `self`
    pub fn select_columns(&self, columns: &[usize]) -> Matrix {
        let rows = self
            .rows
            .iter()
            .map(|r| columns.iter().map(|&j| r[j]).collect())
            .collect();
        Matrix {
            rows,
            ncols: columns.len(),
        }
    }

    /// `self * v`
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        self.rows.iter().map(|r| dot(r, v)).collect()
    }

    /// Row vector times matrix, `v * self`
    pub fn vec_mul(&self, v: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.ncols];
        for (r, &vi) in self.rows.iter().zip(v) {
            for (o, &a) in out.iter_mut().zip(r) {
                *o += vi * a;
            }
        }
        out
    }

    pub fn max_abs(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|r| r.iter())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    pub fn is_finite(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(|v| v.is_finite()))
    }

    /// Invert a square matrix by Gauss-Jordan elimination with partial
    /// pivoting. Returns `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Matrix> {
        let n = self.nrows();
        if n != self.ncols {
            return None;
        }
        let threshold = f64::EPSILON * n as f64 * self.max_abs();
        if threshold == 0.0 {
            return None;
        }

        let mut work = self.rows.clone();
        let mut inv = Matrix::identity(n).rows;

        for col in 0..n {
            // Largest remaining entry in this column becomes the pivot
            let mut pivot_row = col;
            for i in (col + 1)..n {
                if work[i][col].abs() > work[pivot_row][col].abs() {
                    pivot_row = i;
                }
            }
            if work[pivot_row][col].abs() <= threshold {
                return None;
            }
            work.swap(col, pivot_row);
            inv.swap(col, pivot_row);

            let pivot_val = work[col][col];
            for j in 0..n {
                work[col][j] /= pivot_val;
                inv[col][j] /= pivot_val;
            }

            for i in 0..n {
                if i != col {
                    let factor = work[i][col];
                    if factor != 0.0 {
                        for j in 0..n {
                            work[i][j] -= factor * work[col][j];
                            inv[i][j] -= factor * inv[col][j];
                        }
                    }
                }
            }
        }

        Some(Matrix { rows: inv, ncols: n })
    }
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|v| format!("{:>10.4}", v)).collect();
            writeln!(f, "[{}]", cells.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &Matrix, b: &Matrix) {
        assert_eq!(a.nrows(), b.nrows());
        assert_eq!(a.ncols(), b.ncols());
        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                assert!(
                    (a.get(i, j) - b.get(i, j)).abs() < 1e-9,
                    "entry ({}, {}): {} vs {}",
                    i,
                    j,
                    a.get(i, j),
                    b.get(i, j)
                );
            }
        }
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            SolveError::RaggedMatrix {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_inverse_needs_row_swap() {
        // Zero in the top-left corner forces a pivot swap
        let m = Matrix::from_rows(vec![vec![-6.0, 1.0], vec![-5.0, 0.0]]).unwrap();
        let inv = m.inverse().unwrap();
        let expected = Matrix::from_rows(vec![vec![0.0, -0.2], vec![1.0, -1.2]]).unwrap();
        assert_close(&inv, &expected);

        let m = Matrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        assert_close(&m.inverse().unwrap(), &m);
    }

    #[test]
    fn test_inverse_times_matrix_is_identity() {
        let m = Matrix::from_rows(vec![
            vec![2.0, -1.0, 0.0],
            vec![-1.0, 2.0, -1.0],
            vec![0.0, -1.0, 2.0],
        ])
        .unwrap();
        let inv = m.inverse().unwrap();
        let mut product = Matrix::zeros(3, 3);
        for i in 0..3 {
            for j in 0..3 {
                product.rows[i][j] = dot(m.row(i), &inv.column(j));
            }
        }
        assert_close(&product, &Matrix::identity(3));
    }

    #[test]
    fn test_singular() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert!(m.inverse().is_none());
        assert!(Matrix::zeros(2, 2).inverse().is_none());
    }

    #[test]
    fn test_products() {
        let m = Matrix::from_rows(vec![vec![1.0, -6.0, 1.0, 0.0], vec![0.0, -5.0, 1.0, 1.0]]).unwrap();
        assert_eq!(m.mul_vec(&[6.0, 2.0, 0.0, 0.0]), vec![-6.0, -10.0]);
        assert_eq!(m.vec_mul(&[1.0, 0.0]), vec![1.0, -6.0, 1.0, 0.0]);
        assert!((m.column_dot(1, &[-2.0, 3.8]) + 7.0).abs() < 1e-12);
        let b = m.select_columns(&[2, 3]);
        assert_eq!(b.row(0), &[1.0, 0.0]);
        assert_eq!(b.row(1), &[1.0, 1.0]);
    }
}
