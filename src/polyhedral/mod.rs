//! Affine space library.
//!
//! This module provides the value types the factorizer operates on:
//! - Spaces (named parameters, input and output tuples)
//! - Affine expressions
//! - Affine maps with composition and range products

pub mod space;
pub mod expr;
pub mod map;

pub use space::{DimKind, Space};
pub use expr::{AffineExpr, FloorDiv};
pub use map::AffineMap;
