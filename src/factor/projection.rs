//! Recovery of per-map projections from the recombination map.

use crate::polyhedral::{AffineMap, DimKind};
use crate::utils::errors::{FactorError, FactorErrorKind, FactorResult};
use std::collections::HashMap;

/// Resolves provenance names to positions in the range of `Q`.
#[derive(Debug, Clone)]
pub struct ProjectionExtractor<'a> {
    q: &'a AffineMap,
    positions: HashMap<&'a str, usize>,
}

impl<'a> ProjectionExtractor<'a> {
    /// Index the range names of `q`.
    pub fn new(q: &'a AffineMap) -> Self {
        let positions = q
            .space
            .outputs
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_deref().map(|n| (n, i)))
            .collect();
        Self { q, positions }
    }

    /// The projection of `q` onto `original`'s outputs.
    ///
    /// The result maps the intermediate space to `original`'s range, in
    /// `original`'s output order. Every output of `original` must carry a
    /// name present in the range of `q`.
    pub fn get_projection(&self, original: &AffineMap) -> FactorResult<AffineMap> {
        let indices = (0..original.n_out())
            .map(|pos| {
                let name = original.space.dim_name(DimKind::Out, pos).ok_or_else(|| {
                    FactorError::new(
                        FactorErrorKind::UnknownOutputName,
                        format!("output {} of {} has no provenance name", pos, original),
                    )
                })?;
                self.positions.get(name).copied().ok_or_else(|| {
                    FactorError::new(
                        FactorErrorKind::UnknownOutputName,
                        format!("'{}' is not an output of {}", name, self.q),
                    )
                })
            })
            .collect::<FactorResult<Vec<usize>>>()?;

        let selection = AffineMap::selection(&self.q.space.range(), &indices);
        Ok(selection.pullback(self.q).with_range_space(&original.space.range()))
    }
}

/// Convenience wrapper for a single lookup.
pub fn get_projection(original: &AffineMap, q: &AffineMap) -> FactorResult<AffineMap> {
    ProjectionExtractor::new(q).get_projection(original)
}
