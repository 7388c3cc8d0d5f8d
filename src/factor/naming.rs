//! Provenance naming of output dimensions.
//!
//! Every output of every input map gets a synthetic name that is unique
//! across one factorization run, so that each output can be traced back
//! to its map after the merged outputs have been decomposed.

use crate::polyhedral::{AffineMap, DimKind};
use log::trace;

/// Default prefix of provenance names.
pub const DEFAULT_OUTPUT_PREFIX: &str = "orig_out_";

/// A sequence of unique names `<prefix><n>`.
///
/// The counter is explicit state: pass the same generator to every
/// naming call that must not produce colliding names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameGenerator {
    prefix: String,
    next: usize,
}

impl NameGenerator {
    /// Create a generator starting at zero.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: 0 }
    }

    /// Number of names handed out so far.
    pub fn count(&self) -> usize {
        self.next
    }

    /// Produce the next name.
    pub fn next_name(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PREFIX)
    }
}

/// Return copies of `maps` whose output dimensions carry fresh names.
///
/// Names are assigned in input order, map by map and output by output,
/// from a single counter.
pub fn name_outputs(maps: &[AffineMap], names: &mut NameGenerator) -> Vec<AffineMap> {
    maps.iter()
        .map(|map| {
            let mut space = map.space.clone();
            for pos in 0..space.n_out() {
                space = space.set_dim_name(DimKind::Out, pos, names.next_name());
            }
            trace!("tagged outputs: {:?}", space.outputs);
            AffineMap { space, outputs: map.outputs.clone() }
        })
        .collect()
}
