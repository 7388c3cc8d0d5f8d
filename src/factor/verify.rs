//! Round-trip check of a factorization.

use crate::polyhedral::AffineMap;
use log::warn;

/// Check that every projection composed after `common_factor` reproduces
/// its original map.
pub fn verify<'a, I>(common_factor: &AffineMap, entries: I) -> bool
where
    I: IntoIterator<Item = (&'a AffineMap, &'a AffineMap)>,
{
    entries.into_iter().enumerate().all(|(idx, (original, projection))| {
        if projection.n_in() != common_factor.n_out() {
            warn!("projection {} expects {} inputs, common factor has {}", idx, projection.n_in(), common_factor.n_out());
            return false;
        }
        let recombined = projection.pullback(common_factor);
        let ok = recombined.plain_is_equal(original);
        if !ok {
            warn!("entry {}: {} does not reproduce {}", idx, recombined, original);
        }
        ok
    })
}
