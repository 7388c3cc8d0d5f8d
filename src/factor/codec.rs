//! Conversion between affine maps and integer coefficient matrices.
//!
//! One row per output dimension; columns are the parameters, then the
//! input dimensions, then the constant term.

use crate::polyhedral::{AffineExpr, AffineMap, Space};
use crate::utils::errors::{FactorError, FactorErrorKind, FactorResult};
use crate::utils::matrix::IntMatrix;

/// Encode a map as its coefficient matrix.
///
/// Fails with `UnsupportedDimensionKind` if any output contains a
/// floor-division term.
pub fn encode(map: &AffineMap) -> FactorResult<IntMatrix> {
    if let Some(pos) = map.outputs.iter().position(|e| e.has_divs()) {
        return Err(FactorError::new(
            FactorErrorKind::UnsupportedDimensionKind,
            format!("output {} of {} uses an existentially quantified dimension", pos, map),
        ));
    }

    let n_param = map.n_param();
    let n_in = map.n_in();
    let mut matrix = IntMatrix::zeros(map.n_out(), n_param + n_in + 1);
    for (row, expr) in map.outputs.iter().enumerate() {
        for j in 0..n_param {
            matrix.set(row, j, expr.param_coeff(j));
        }
        for i in 0..n_in {
            matrix.set(row, n_param + i, expr.coeff(i));
        }
        matrix.set(row, n_param + n_in, expr.constant);
    }
    Ok(matrix)
}

/// Decode a coefficient matrix into a map over `target`.
///
/// `target` supplies the domain and the range names; it must have one
/// output per matrix row. With `include_constant` unset the constant
/// column is ignored, and may be absent altogether.
pub fn decode(matrix: &IntMatrix, target: &Space, include_constant: bool) -> FactorResult<AffineMap> {
    let n_param = target.n_param();
    let n_in = target.n_in();
    let linear_cols = n_param + n_in;

    let has_constant_col = matrix.ncols() == linear_cols + 1;
    let shape_ok = has_constant_col || (!include_constant && matrix.ncols() == linear_cols);
    if !shape_ok || matrix.nrows() != target.n_out() {
        return Err(FactorError::new(
            FactorErrorKind::ShapeMismatch,
            format!(
                "{}x{} matrix does not fit space {} (constant column {})",
                matrix.nrows(),
                matrix.ncols(),
                target,
                if include_constant { "required" } else { "optional" }
            ),
        ));
    }

    let outputs = (0..matrix.nrows())
        .map(|row| {
            let mut expr = AffineExpr::zero(n_in, n_param);
            for j in 0..n_param {
                expr.set_param_coeff(j, matrix.get(row, j));
            }
            for i in 0..n_in {
                expr.set_coeff(i, matrix.get(row, n_param + i));
            }
            if include_constant {
                expr.constant = matrix.get(row, linear_cols);
            }
            expr
        })
        .collect();
    Ok(AffineMap::new(target.clone(), outputs))
}
