//! Utility modules for the factorizer.
//!
//! This module contains common utilities used throughout the codebase:
//! - Error types
//! - Integer matrices and Hermite normal form
//! - Source location tracking
//! - Report printing

pub mod errors;
pub mod matrix;
pub mod location;
pub mod poly_print;

// Re-exports
pub use errors::*;
pub use location::{SourceLocation, Span};
pub use matrix::{ColumnHnf, IntMatrix, RationalMatrix};
pub use poly_print::{print_factorization, print_map, PolyPrinter};
