//! Merging maps over a shared domain into one map.

use crate::polyhedral::AffineMap;
use crate::utils::errors::{FactorError, FactorErrorKind, FactorResult};
use log::debug;

/// Concatenate the outputs of `maps` into a single map.
///
/// All maps must share a domain signature (same parameter set, same input
/// tuple). The result follows the first map's parameter order; output
/// names are preserved.
pub fn merge(maps: &[AffineMap]) -> FactorResult<AffineMap> {
    let (first, rest) = maps.split_first().ok_or_else(|| {
        FactorError::new(FactorErrorKind::InvalidDomainMismatch, "cannot merge an empty list of maps")
    })?;

    let mut merged = first.clone();
    for (idx, map) in rest.iter().enumerate() {
        merged = merged.flat_range_product(map).ok_or_else(|| {
            FactorError::new(
                FactorErrorKind::InvalidDomainMismatch,
                format!(
                    "map {} has domain {} but map 0 has domain {}",
                    idx + 1,
                    map.space.domain(),
                    first.space.domain()
                ),
            )
        })?;
    }

    debug!("merged {} maps into {} outputs", maps.len(), merged.n_out());
    Ok(merged)
}
