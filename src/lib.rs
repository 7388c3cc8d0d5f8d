//! # PolyFactor - Common-Factor Decomposition of Affine Maps
//!
//! Given several affine maps over one domain, PolyFactor finds the smallest
//! shared intermediate computation they can all be expressed through:
//! - a common factor `H` from the domain to `k` intermediate dimensions
//! - one linear projection `P_i` per input with `P_i ∘ H == f_i`
//!
//! `k` is the rank of the merged integer coefficient matrix, obtained from
//! a row-style Hermite normal form.
//!
//! ## Architecture
//!
//! ```text
//! Input → Frontend → AffineMap → name → merge → encode → Hermite → H, Q → projections
//! ```
//!
//! ## Example
//!
//! ```rust
//! use polyfactor::prelude::*;
//!
//! let maps = polyfactor::parse_maps(
//!     "[N] -> { [i, j] -> [i + j, N] }
//!      [N] -> { [i, j] -> [2i + 2j - 1] }",
//! ).unwrap();
//!
//! let result = polyfactor::factor(&maps).unwrap();
//! assert_eq!(result.rank(), 3);
//! for (original, projection) in result.entries(&maps) {
//!     assert_eq!(&projection.pullback(&result.common_factor), original);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod frontend;
pub mod polyhedral;
pub mod factor;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::frontend::{parse_map, parse_maps, ParseError};
    pub use crate::polyhedral::{AffineExpr, AffineMap, DimKind, FloorDiv, Space};
    pub use crate::factor::{
        factor, factor_with_config, FactorConfig, Factorization, HermiteFactorization,
    };
    pub use crate::utils::errors::*;
    pub use crate::utils::matrix::IntMatrix;
    pub use crate::utils::poly_print::PolyPrinter;
}

pub use factor::{factor, factor_with_config, FactorConfig, Factorization};
pub use frontend::{parse_map, parse_maps};

use utils::errors::PolyResult;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse every map in `source` and factor them.
///
/// Returns the parsed maps alongside the result so callers can pair each
/// projection with its original.
pub fn parse_and_factor(source: &str, config: &FactorConfig) -> PolyResult<(Vec<polyhedral::AffineMap>, Factorization)> {
    let maps = parse_maps(source)?;
    let result = factor_with_config(&maps, config)?;
    Ok((maps, result))
}
