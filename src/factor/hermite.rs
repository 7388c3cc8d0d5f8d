//! Row-oriented Hermite decomposition with rank trimming.
//!
//! The exact-arithmetic Hermite primitive works on columns
//! (`H = M * U`, `M = H * Q`). The factorizer needs the row-oriented
//! form `A = Q * H` where the rows of `H` span the rows of `A`.
//! [`RowHermite`] bridges the two by transposing around a
//! [`ColumnHermite`] implementation.

use crate::utils::errors::{FactorError, FactorErrorKind, FactorResult};
use crate::utils::matrix::{ColumnHnf, IntMatrix};
use log::{debug, trace};

/// A column-oriented Hermite normal form primitive.
pub trait ColumnHermite {
    /// Decompose `m` so that `h = m * u` and `m = h * q`, with the
    /// non-zero columns of `h` leading. Entries that do not fit in `i64`
    /// are an `Overflow` error.
    fn column_hermite(&self, m: &IntMatrix) -> FactorResult<ColumnHnf>;
}

/// Euclidean column reduction, see [`IntMatrix::left_hermite`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanHermite;

impl ColumnHermite for EuclideanHermite {
    fn column_hermite(&self, m: &IntMatrix) -> FactorResult<ColumnHnf> {
        m.left_hermite()
    }
}

/// The trimmed factors of `A = Q * H`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HermiteFactorization {
    /// `k x C` matrix whose rows span the rows of `A`; keeps the constant column
    pub h: IntMatrix,
    /// `R x k` matrix expressing each row of `A` in the rows of `h`
    pub q: IntMatrix,
}

impl HermiteFactorization {
    /// Number of independent rows kept.
    pub fn rank(&self) -> usize {
        self.h.nrows()
    }
}

/// Row-oriented adapter over a column Hermite primitive.
#[derive(Debug, Clone, Default)]
pub struct RowHermite<P = EuclideanHermite> {
    primitive: P,
}

impl<P: ColumnHermite> RowHermite<P> {
    /// Wrap a column primitive.
    pub fn new(primitive: P) -> Self {
        Self { primitive }
    }

    /// Factor an `R x C` matrix into `Q` (`R x k`) and `H` (`k x C`).
    pub fn decompose(&self, a: &IntMatrix) -> FactorResult<HermiteFactorization> {
        let ColumnHnf { h, q, .. } = self.primitive.column_hermite(&a.transpose())?;
        let h = h.transpose();
        let q = q.transpose();
        trace!("untrimmed H = {}, Q = {}", h, q);

        if h.nrows() != q.ncols() || h.ncols() != a.ncols() || q.nrows() != a.nrows() {
            return Err(FactorError::new(
                FactorErrorKind::DecompositionInconsistency,
                format!(
                    "Hermite factors of a {}x{} matrix have shapes H {}x{} and Q {}x{}",
                    a.nrows(), a.ncols(), h.nrows(), h.ncols(), q.nrows(), q.ncols()
                ),
            ));
        }

        let zero_rows = (0..h.nrows()).rev().take_while(|&r| h.is_zero_row(r)).count();
        let k = h.nrows() - zero_rows;
        let h = h.drop_rows(k, zero_rows);
        let q = q.drop_cols(q.ncols() - zero_rows, zero_rows);

        if h.nrows() != q.ncols() {
            return Err(FactorError::new(
                FactorErrorKind::DecompositionInconsistency,
                format!("dropped {} rows of H but Q kept {} columns for {} rows", zero_rows, q.ncols(), h.nrows()),
            ));
        }

        debug!("row Hermite: {}x{} matrix has rank {}", a.nrows(), a.ncols(), k);
        Ok(HermiteFactorization { h, q })
    }
}

/// Row-oriented Hermite decomposition using the built-in primitive.
pub fn row_hermite(a: &IntMatrix) -> FactorResult<HermiteFactorization> {
    RowHermite::new(EuclideanHermite).decompose(a)
}
