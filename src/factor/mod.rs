//! Common-factor decomposition of affine maps.
//!
//! Given maps `f_1 .. f_n` over one domain, [`factor`] finds a map `H`
//! from that domain to a `k`-dimensional intermediate space and, for each
//! `f_i`, a linear projection `P_i` with `P_i ∘ H == f_i`. `k` is the rank
//! of the merged coefficient matrix, so `H` is the smallest coordinate
//! system through which every `f_i` can be computed.
//!
//! ## Pipeline
//!
//! ```text
//! name outputs → merge → encode → row Hermite → build H, Q → project → verify
//! ```
//!
//! ## Example
//!
//! ```rust
//! use polyfactor::frontend::parse_map;
//! use polyfactor::factor::factor;
//!
//! let dom = "[N] -> { [i, j, k, l] -> ";
//! let maps = vec![
//!     parse_map(&format!("{}[j, k] }}", dom)).unwrap(),
//!     parse_map(&format!("{}[k - j] }}", dom)).unwrap(),
//!     parse_map(&format!("{}[j - k, i - j - k + l] }}", dom)).unwrap(),
//! ];
//! let result = factor(&maps).unwrap();
//! assert_eq!(result.rank(), 3);
//! ```

pub mod naming;
pub mod merge;
pub mod codec;
pub mod hermite;
pub mod builder;
pub mod projection;
pub mod verify;

pub use naming::{name_outputs, NameGenerator, DEFAULT_OUTPUT_PREFIX};
pub use merge::merge;
pub use codec::{decode, encode};
pub use hermite::{row_hermite, ColumnHermite, EuclideanHermite, HermiteFactorization, RowHermite};
pub use builder::{Decomposition, ExpressionBuilder, DEFAULT_MID_PREFIX};
pub use projection::{get_projection, ProjectionExtractor};
pub use verify::verify;

use crate::polyhedral::AffineMap;
use crate::utils::errors::{FactorError, FactorErrorKind, FactorResult};
use log::{debug, info};

/// Configuration for a factorization run.
#[derive(Debug, Clone)]
pub struct FactorConfig {
    /// Check `Q ∘ H` and every projection round trip before returning
    pub verify: bool,
    /// Prefix of the provenance names given to input outputs
    pub output_prefix: String,
    /// Prefix of the intermediate dimension names
    pub mid_prefix: String,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            verify: cfg!(debug_assertions),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            mid_prefix: DEFAULT_MID_PREFIX.to_string(),
        }
    }
}

impl FactorConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable round-trip verification.
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Set the provenance name prefix.
    pub fn output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// Set the intermediate dimension prefix.
    pub fn mid_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mid_prefix = prefix.into();
        self
    }
}

/// The result of a factorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factorization {
    /// Shared map from the common domain to the intermediate space
    pub common_factor: AffineMap,
    /// One projection per input map, by position
    pub projections: Vec<AffineMap>,
    /// The trimmed Hermite factors
    pub factors: HermiteFactorization,
}

impl Factorization {
    /// Dimensionality of the intermediate space.
    pub fn rank(&self) -> usize {
        self.common_factor.n_out()
    }

    /// Pair each original map with its projection.
    pub fn entries<'a>(&'a self, originals: &'a [AffineMap]) -> impl Iterator<Item = (&'a AffineMap, &'a AffineMap)> + 'a {
        originals.iter().zip(self.projections.iter())
    }

    /// Check every round trip against the maps that were factored.
    pub fn verify(&self, originals: &[AffineMap]) -> bool {
        originals.len() == self.projections.len() && verify(&self.common_factor, self.entries(originals))
    }
}

/// Factor `maps` with the default configuration.
pub fn factor(maps: &[AffineMap]) -> FactorResult<Factorization> {
    factor_with_config(maps, &FactorConfig::default())
}

/// Factor `maps` into a common factor and per-map projections.
///
/// Fails with `InvalidDomainMismatch` for an empty list or maps over
/// different domains, and with `UnsupportedDimensionKind` if any map uses
/// floor-division terms. The input maps are never modified.
pub fn factor_with_config(maps: &[AffineMap], config: &FactorConfig) -> FactorResult<Factorization> {
    info!("factoring {} maps", maps.len());

    let mut names = NameGenerator::new(config.output_prefix.clone());
    let tagged = name_outputs(maps, &mut names);
    let merged = merge(&tagged)?;
    let matrix = encode(&merged)?;
    debug!("merged coefficient matrix: {}", matrix);

    let factors = row_hermite(&matrix)?;
    let decomposition = ExpressionBuilder::new(config.mid_prefix.clone()).build(&merged, &factors)?;
    if config.verify {
        decomposition.check(&merged)?;
    }

    let extractor = ProjectionExtractor::new(&decomposition.q);
    let projections = tagged
        .iter()
        .zip(maps)
        .map(|(tagged, original)| {
            extractor
                .get_projection(tagged)
                .map(|p| p.with_range_space(&original.space.range()))
        })
        .collect::<FactorResult<Vec<_>>>()?;

    let result = Factorization {
        common_factor: decomposition.h.clone(),
        projections,
        factors,
    };

    if config.verify && !result.verify(maps) {
        return Err(FactorError::new(
            FactorErrorKind::VerificationFailed,
            "a projection does not reproduce its original map",
        ));
    }

    info!("{} outputs factor through {} dimensions", merged.n_out(), result.rank());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polyhedral::{AffineExpr, Space};

    fn ijkl(outputs: Vec<AffineExpr>) -> AffineMap {
        let space = Space::map(0, outputs.len())
            .with_params(["N"])
            .with_input_names(["i", "j", "k", "l"]);
        AffineMap::new(space, outputs)
    }

    fn v(i: usize) -> AffineExpr {
        AffineExpr::var(i, 4, 1)
    }

    fn scenario() -> Vec<AffineMap> {
        vec![
            ijkl(vec![v(1), v(2)]),
            ijkl(vec![v(2) - v(1)]),
            ijkl(vec![v(1) - v(2), v(0) - v(1) - v(2) + v(3)]),
        ]
    }

    #[test]
    fn test_scenario() {
        let maps = scenario();
        let result = factor_with_config(&maps, &FactorConfig::new().verify(true)).unwrap();
        assert_eq!(result.factors.q.nrows(), 5);
        assert_eq!(result.rank(), 3);
        assert_eq!(result.projections.len(), 3);
        assert!(result.verify(&maps));
    }

    #[test]
    fn test_projections_keep_original_range() {
        let mut maps = scenario();
        maps[0].space.outputs = vec![Some("a".to_string()), None];
        let result = factor(&maps).unwrap();
        assert_eq!(result.projections[0].space.outputs, maps[0].space.outputs);
        assert_eq!(result.projections[0].pullback(&result.common_factor), maps[0]);
    }

    #[test]
    fn test_custom_prefixes() {
        let config = FactorConfig::new().mid_prefix("t").output_prefix("src_");
        let result = factor_with_config(&scenario(), &config).unwrap();
        assert_eq!(result.common_factor.space.dim_name(crate::polyhedral::DimKind::Out, 0), Some("t1"));
        assert_eq!(result.factors.rank(), 3);
    }

    #[test]
    fn test_verification_failure_is_reported() {
        let maps = scenario();
        let mut result = factor(&maps).unwrap();
        result.projections[1].outputs[0].constant = 4;
        assert!(!result.verify(&maps));
        assert!(!result.verify(&maps[..2]));
    }
}
