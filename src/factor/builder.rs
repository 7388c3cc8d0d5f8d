//! Reconstruction of the common factor `H` and the recombination map `Q`.

use crate::factor::codec::decode;
use crate::factor::hermite::HermiteFactorization;
use crate::polyhedral::{AffineMap, Space};
use crate::utils::errors::{FactorError, FactorErrorKind, FactorResult};
use log::debug;

/// Default prefix of the intermediate dimensions.
pub const DEFAULT_MID_PREFIX: &str = "mid_";

/// The two maps of a decomposition: `merged = q ∘ h`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    /// Merged domain to the `k` intermediate dimensions
    pub h: AffineMap,
    /// Intermediate dimensions to the merged outputs
    pub q: AffineMap,
}

/// Builds `H` and `Q` maps from a Hermite factorization.
#[derive(Debug, Clone)]
pub struct ExpressionBuilder {
    mid_prefix: String,
}

impl Default for ExpressionBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MID_PREFIX)
    }
}

impl ExpressionBuilder {
    /// Create a builder naming intermediate dimensions `<prefix>1..<prefix>k`.
    pub fn new(mid_prefix: impl Into<String>) -> Self {
        Self { mid_prefix: mid_prefix.into() }
    }

    fn mid_names(&self, k: usize) -> Vec<String> {
        (1..=k).map(|i| format!("{}{}", self.mid_prefix, i)).collect()
    }

    /// Space of `H`: the merged domain to `k` fresh dimensions.
    pub fn h_space(&self, merged: &AffineMap, k: usize) -> Space {
        let mut space = merged.space.clone().with_output_names(self.mid_names(k));
        space.out_tuple = None;
        space
    }

    /// Space of `Q`: the `k` fresh dimensions, without parameters, to the
    /// merged outputs.
    pub fn q_space(&self, merged: &AffineMap, k: usize) -> Space {
        Space {
            params: Vec::new(),
            in_tuple: None,
            inputs: self.mid_names(k).into_iter().map(Some).collect(),
            out_tuple: merged.space.out_tuple.clone(),
            outputs: merged.space.outputs.clone(),
        }
    }

    /// Decode both factors over freshly built spaces.
    pub fn build(&self, merged: &AffineMap, factors: &HermiteFactorization) -> FactorResult<Decomposition> {
        let k = factors.rank();
        let h = decode(&factors.h, &self.h_space(merged, k), true)?;
        let q = decode(&factors.q, &self.q_space(merged, k), false)?;
        debug!("common factor: {}", h);
        Ok(Decomposition { h, q })
    }
}

impl Decomposition {
    /// Number of intermediate dimensions.
    pub fn rank(&self) -> usize {
        self.h.n_out()
    }

    /// Check that `q ∘ h` reproduces `merged`.
    pub fn check(&self, merged: &AffineMap) -> FactorResult<()> {
        let recombined = self.q.pullback(&self.h);
        if recombined.plain_is_equal(merged) {
            Ok(())
        } else {
            Err(FactorError::new(
                FactorErrorKind::VerificationFailed,
                format!("Q o H = {} differs from merged map {}", recombined, merged),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::codec::encode;
    use crate::factor::hermite::row_hermite;
    use crate::polyhedral::{AffineExpr, DimKind};

    fn merged() -> AffineMap {
        // [N] -> { [i, j] -> [a = i + j + 1, b = 2i + 2j + 2, c = N] }
        let space = Space::map(0, 0)
            .with_params(["N"])
            .with_input_names(["i", "j"])
            .with_output_names(["a", "b", "c"]);
        let sum = AffineExpr::var(0, 2, 1) + AffineExpr::var(1, 2, 1) + AffineExpr::constant(1, 2, 1);
        AffineMap::new(space, vec![sum.clone(), sum.scale(2), AffineExpr::param(0, 2, 1)])
    }

    #[test]
    fn test_spaces() {
        let builder = ExpressionBuilder::default();
        let m = merged();
        let h = builder.h_space(&m, 2);
        assert_eq!(h.params, vec!["N".to_string()]);
        assert_eq!(h.dim_name(DimKind::Out, 1), Some("mid_2"));
        let q = builder.q_space(&m, 2);
        assert!(q.params.is_empty());
        assert_eq!(q.dim_name(DimKind::In, 0), Some("mid_1"));
        assert_eq!(q.dim_name(DimKind::Out, 2), Some("c"));
    }

    #[test]
    fn test_build_round_trips() {
        let m = merged();
        let factors = row_hermite(&encode(&m).unwrap()).unwrap();
        let d = ExpressionBuilder::default().build(&m, &factors).unwrap();
        assert_eq!(d.rank(), 2);
        assert!(d.q.outputs.iter().all(|e| e.constant == 0));
        d.check(&m).unwrap();
    }

    #[test]
    fn test_check_detects_mismatch() {
        let m = merged();
        let factors = row_hermite(&encode(&m).unwrap()).unwrap();
        let mut d = ExpressionBuilder::default().build(&m, &factors).unwrap();
        d.h.outputs[0].constant += 1;
        let err = d.check(&m).unwrap_err();
        assert_eq!(err.kind, FactorErrorKind::VerificationFailed);
    }
}
