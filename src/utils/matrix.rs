//! Integer and rational matrices for the Hermite decomposition.
//!
//! [`IntMatrix`] is the coefficient matrix type the factorizer works with,
//! stored in a `nalgebra` dense matrix. It carries the column-oriented
//! Hermite normal form primitive. [`RationalMatrix`] provides exact rank
//! and determinant computations used to check those results.

use crate::utils::errors::{FactorError, FactorErrorKind, FactorResult};
use nalgebra::DMatrix;
use num_integer::Integer;
use num_rational::Rational64;
use num_traits::{Signed, Zero};
use std::fmt;

/// A dense matrix with `i64` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntMatrix {
    data: DMatrix<i64>,
}

/// Result of the column Hermite primitive: `h = m * u` and `m = h * q`.
///
/// `h` is in column echelon form (lower triangular with positive pivots,
/// trailing columns zero), `u` is unimodular and `q` is its inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHnf {
    /// The Hermite matrix
    pub h: IntMatrix,
    /// The unimodular transform
    pub u: IntMatrix,
    /// Inverse of `u`
    pub q: IntMatrix,
}

impl IntMatrix {
    /// Create a zero matrix with the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { data: DMatrix::zeros(rows, cols) }
    }

    /// Create an identity matrix.
    pub fn identity(n: usize) -> Self {
        Self { data: DMatrix::identity(n, n) }
    }

    /// Create a matrix from a list of rows.
    ///
    /// All rows must have the same length.
    pub fn from_vec(rows: Vec<Vec<i64>>) -> Self {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.len());
        debug_assert!(rows.iter().all(|r| r.len() == ncols), "ragged matrix rows");
        let flat: Vec<i64> = rows.into_iter().flatten().collect();
        Self { data: DMatrix::from_row_slice(nrows, ncols, &flat) }
    }

    /// Get the number of rows.
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Get the number of columns.
    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// Get an element.
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[(row, col)]
    }

    /// Set an element.
    pub fn set(&mut self, row: usize, col: usize, value: i64) {
        self.data[(row, col)] = value;
    }

    /// Copy out a row.
    pub fn row(&self, row: usize) -> Vec<i64> {
        self.data.row(row).iter().copied().collect()
    }

    /// All rows as nested vectors.
    pub fn to_vec(&self) -> Vec<Vec<i64>> {
        (0..self.nrows()).map(|r| self.row(r)).collect()
    }

    /// Check whether a row is entirely zero.
    pub fn is_zero_row(&self, row: usize) -> bool {
        self.data.row(row).iter().all(|&v| v == 0)
    }

    /// Check whether a column is entirely zero.
    pub fn is_zero_col(&self, col: usize) -> bool {
        self.data.column(col).iter().all(|&v| v == 0)
    }

    /// Transpose the matrix.
    pub fn transpose(&self) -> Self {
        Self { data: self.data.transpose() }
    }

    /// Remove `n` rows starting at `first`.
    pub fn drop_rows(&self, first: usize, n: usize) -> Self {
        Self { data: self.data.clone().remove_rows(first, n) }
    }

    /// Remove `n` columns starting at `first`.
    pub fn drop_cols(&self, first: usize, n: usize) -> Self {
        Self { data: self.data.clone().remove_columns(first, n) }
    }

    /// Matrix multiplication.
    pub fn mul(&self, other: &Self) -> Option<Self> {
        if self.ncols() != other.nrows() {
            return None;
        }
        Some(Self { data: &self.data * &other.data })
    }

    /// Convert to a rational matrix.
    pub fn to_rational(&self) -> RationalMatrix {
        RationalMatrix::from_vec(self.to_vec())
    }

    /// Rank over the rationals.
    pub fn rank(&self) -> usize {
        self.to_rational().rank()
    }

    /// Check if the matrix is unimodular (square with determinant ±1).
    pub fn is_unimodular(&self) -> bool {
        self.to_rational().is_unimodular()
    }

    fn swap_cols(&mut self, a: usize, b: usize) {
        self.data.swap_columns(a, b);
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        self.data.swap_rows(a, b);
    }

    fn negate_col(&mut self, col: usize) -> Option<()> {
        for r in 0..self.nrows() {
            self.data[(r, col)] = self.data[(r, col)].checked_neg()?;
        }
        Some(())
    }

    fn negate_row(&mut self, row: usize) -> Option<()> {
        for c in 0..self.ncols() {
            self.data[(row, c)] = self.data[(row, c)].checked_neg()?;
        }
        Some(())
    }

    /// `col[dst] += factor * col[src]`, `None` on overflow.
    fn add_col_multiple(&mut self, dst: usize, src: usize, factor: i64) -> Option<()> {
        for r in 0..self.nrows() {
            let v = self.data[(r, src)].checked_mul(factor)?;
            self.data[(r, dst)] = self.data[(r, dst)].checked_add(v)?;
        }
        Some(())
    }

    /// `row[dst] += factor * row[src]`, `None` on overflow.
    fn add_row_multiple(&mut self, dst: usize, src: usize, factor: i64) -> Option<()> {
        for c in 0..self.ncols() {
            let v = self.data[(src, c)].checked_mul(factor)?;
            self.data[(dst, c)] = self.data[(dst, c)].checked_add(v)?;
        }
        Some(())
    }

    /// Compute the column-style Hermite normal form.
    ///
    /// Uses Euclidean column reduction. Every column operation applied to
    /// `h` is applied to `u`, and its inverse row operation to `q`, so that
    /// `h = self * u` and `self = h * q` hold throughout. Pivots are made
    /// positive and entries left of a pivot are reduced into `[0, pivot)`.
    ///
    /// Fails with `Overflow` if an entry of `h`, `u` or `q` leaves the
    /// `i64` range during the reduction.
    pub fn left_hermite(&self) -> FactorResult<ColumnHnf> {
        self.reduce_hermite().ok_or_else(|| {
            FactorError::new(
                FactorErrorKind::Overflow,
                format!("Hermite reduction of a {}x{} matrix exceeds i64", self.nrows(), self.ncols()),
            )
        })
    }

    fn reduce_hermite(&self) -> Option<ColumnHnf> {
        let m = self.nrows();
        let n = self.ncols();
        let mut h = self.clone();
        let mut u = Self::identity(n);
        let mut q = Self::identity(n);

        let swap = |h: &mut Self, u: &mut Self, q: &mut Self, a: usize, b: usize| {
            if a != b {
                h.swap_cols(a, b);
                u.swap_cols(a, b);
                q.swap_rows(a, b);
            }
        };
        let negate = |h: &mut Self, u: &mut Self, q: &mut Self, c: usize| -> Option<()> {
            h.negate_col(c)?;
            u.negate_col(c)?;
            q.negate_row(c)
        };
        // col[dst] -= f * col[src]
        let eliminate = |h: &mut Self, u: &mut Self, q: &mut Self, dst: usize, src: usize, f: i64| -> Option<()> {
            let neg = f.checked_neg()?;
            h.add_col_multiple(dst, src, neg)?;
            u.add_col_multiple(dst, src, neg)?;
            q.add_row_multiple(src, dst, f)
        };

        let mut col = 0;
        for row in 0..m {
            if col >= n {
                break;
            }
            loop {
                let pivot = (col..n)
                    .filter(|&j| h.get(row, j) != 0)
                    .min_by_key(|&j| h.get(row, j).unsigned_abs());
                let Some(p) = pivot else { break };

                swap(&mut h, &mut u, &mut q, col, p);
                if h.get(row, col) < 0 {
                    negate(&mut h, &mut u, &mut q, col)?;
                }

                let pivot_value = h.get(row, col);
                let mut reduced = true;
                for j in (col + 1)..n {
                    let v = h.get(row, j);
                    if v == 0 {
                        continue;
                    }
                    eliminate(&mut h, &mut u, &mut q, j, col, v.div_floor(&pivot_value))?;
                    if h.get(row, j) != 0 {
                        reduced = false;
                    }
                }

                if reduced {
                    for j in 0..col {
                        let f = h.get(row, j).div_floor(&pivot_value);
                        if f != 0 {
                            eliminate(&mut h, &mut u, &mut q, j, col, f)?;
                        }
                    }
                    col += 1;
                    break;
                }
            }
        }

        Some(ColumnHnf { h, u, q })
    }
}

impl fmt::Display for IntMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for r in 0..self.nrows() {
            let row: Vec<String> = self.row(r).iter().map(|v| v.to_string()).collect();
            writeln!(f, "  [{}]", row.join(", "))?;
        }
        write!(f, "]")
    }
}

/// A matrix with rational entries, used for exact rank and determinant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalMatrix {
    data: Vec<Vec<Rational64>>,
    rows: usize,
    cols: usize,
}

impl RationalMatrix {
    /// Create a new matrix from integer rows.
    pub fn from_vec(data: Vec<Vec<i64>>) -> Self {
        let rows = data.len();
        let cols = if rows > 0 { data[0].len() } else { 0 };
        let rational_data: Vec<Vec<Rational64>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Rational64::from_integer).collect())
            .collect();
        Self {
            data: rational_data,
            rows,
            cols,
        }
    }

    /// Get the number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Reduce to row echelon form, returning the number of pivots and
    /// the sign/scale factor accumulated by the elimination.
    fn eliminate(&self) -> (usize, Rational64) {
        let mut m = self.data.clone();
        let mut det = Rational64::from_integer(1);
        let mut pivot_row = 0;

        for col in 0..self.cols {
            if pivot_row >= self.rows {
                break;
            }
            let mut max_row = pivot_row;
            for i in (pivot_row + 1)..self.rows {
                if m[i][col].abs() > m[max_row][col].abs() {
                    max_row = i;
                }
            }
            if m[max_row][col].is_zero() {
                continue;
            }
            if max_row != pivot_row {
                m.swap(pivot_row, max_row);
                det = -det;
            }
            det *= m[pivot_row][col];

            for i in (pivot_row + 1)..self.rows {
                let factor = m[i][col] / m[pivot_row][col];
                if factor.is_zero() {
                    continue;
                }
                let pivot: Vec<_> = m[pivot_row].clone();
                for j in col..self.cols {
                    m[i][j] -= factor * pivot[j];
                }
            }
            pivot_row += 1;
        }
        (pivot_row, det)
    }

    /// Rank of the matrix.
    pub fn rank(&self) -> usize {
        self.eliminate().0
    }

    /// Compute the determinant (for square matrices).
    pub fn determinant(&self) -> Option<Rational64> {
        if self.rows != self.cols {
            return None;
        }
        let (rank, det) = self.eliminate();
        if rank < self.rows {
            Some(Rational64::zero())
        } else {
            Some(det)
        }
    }

    /// Check if the matrix is unimodular (determinant is ±1).
    pub fn is_unimodular(&self) -> bool {
        self.determinant()
            .map(|det| det.abs() == Rational64::from_integer(1))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_creation() {
        let m = IntMatrix::from_vec(vec![
            vec![1, 2, 3],
            vec![4, 5, 6],
        ]);
        assert_eq!(m.nrows(), 2);
        assert_eq!(m.ncols(), 3);
        assert_eq!(m.get(1, 2), 6);
        assert_eq!(m.transpose().get(2, 1), 6);
    }

    #[test]
    fn test_drop_rows_and_cols() {
        let m = IntMatrix::from_vec(vec![
            vec![1, 2, 3],
            vec![4, 5, 6],
            vec![7, 8, 9],
        ]);
        let r = m.drop_rows(1, 2);
        assert_eq!(r.to_vec(), vec![vec![1, 2, 3]]);
        let c = m.drop_cols(0, 1);
        assert_eq!(c.to_vec(), vec![vec![2, 3], vec![5, 6], vec![8, 9]]);
    }

    #[test]
    fn test_matrix_multiply() {
        let a = IntMatrix::from_vec(vec![vec![1, 2], vec![3, 4]]);
        let b = IntMatrix::from_vec(vec![vec![5, 6], vec![7, 8]]);
        let c = a.mul(&b).unwrap();
        assert_eq!(c.to_vec(), vec![vec![19, 22], vec![43, 50]]);
        assert!(a.mul(&IntMatrix::zeros(3, 1)).is_none());
    }

    #[test]
    fn test_determinant() {
        let m = RationalMatrix::from_vec(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(*m.determinant().unwrap().numer(), -2);
    }

    #[test]
    fn test_unimodular() {
        let m = IntMatrix::from_vec(vec![vec![1, 1], vec![0, 1]]);
        assert!(m.is_unimodular());
        let m = IntMatrix::from_vec(vec![vec![2, 0], vec![0, 1]]);
        assert!(!m.is_unimodular());
    }

    #[test]
    fn test_rank() {
        let m = IntMatrix::from_vec(vec![
            vec![1, 2, 3],
            vec![2, 4, 6],
            vec![0, 1, 1],
        ]);
        assert_eq!(m.rank(), 2);
        assert_eq!(IntMatrix::zeros(3, 3).rank(), 0);
    }

    fn check_hermite(m: &IntMatrix) -> ColumnHnf {
        let hnf = m.left_hermite().unwrap();
        assert_eq!(m.mul(&hnf.u).unwrap(), hnf.h);
        assert_eq!(hnf.h.mul(&hnf.q).unwrap(), *m);
        assert_eq!(hnf.u.mul(&hnf.q).unwrap(), IntMatrix::identity(m.ncols()));
        assert!(hnf.u.is_unimodular());
        hnf
    }

    #[test]
    fn test_left_hermite_identities() {
        let m = IntMatrix::from_vec(vec![
            vec![0, 0, 1, 0, 0],
            vec![1, 0, 0, 0, 0],
            vec![0, 1, -1, 1, 0],
            vec![0, 1, -1, -1, 0],
            vec![0, 0, 0, 1, 0],
            vec![0, 0, 1, 0, 0],
        ]);
        let hnf = check_hermite(&m);
        let nonzero = (0..hnf.h.ncols()).filter(|&c| !hnf.h.is_zero_col(c)).count();
        assert_eq!(nonzero, m.rank());
    }

    #[test]
    fn test_left_hermite_echelon_shape() {
        let m = IntMatrix::from_vec(vec![
            vec![4, 6, 2],
            vec![2, 3, 1],
        ]);
        let hnf = check_hermite(&m);
        // row 0 pivot is gcd(4, 6, 2)
        assert_eq!(hnf.h.get(0, 0), 2);
        assert_eq!(hnf.h.get(0, 1), 0);
        assert_eq!(hnf.h.get(0, 2), 0);
        assert!(hnf.h.is_zero_col(1));
        assert!(hnf.h.is_zero_col(2));
    }

    #[test]
    fn test_left_hermite_overflow_is_an_error() {
        let m = IntMatrix::from_vec(vec![
            vec![1000000007, 999999937, 123456789],
            vec![998244353, 1000000009, 987654321],
            vec![3, 7, 1000003],
        ]);
        let err = m.left_hermite().unwrap_err();
        assert_eq!(err.kind, FactorErrorKind::Overflow);

        let m = IntMatrix::from_vec(vec![vec![i64::MIN]]);
        assert_eq!(m.left_hermite().unwrap_err().kind, FactorErrorKind::Overflow);
    }

    #[test]
    fn test_left_hermite_negative_pivot() {
        let m = IntMatrix::from_vec(vec![vec![-3], vec![5]]);
        let hnf = check_hermite(&m);
        assert_eq!(hnf.h.get(0, 0), 3);
    }
}
