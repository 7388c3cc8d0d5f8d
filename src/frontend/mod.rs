//! Frontend: Lexer and Parser for the map notation.
//!
//! Maps are written in the isl-like notation that [`AffineMap`] prints:
//!
//! ```text
//! [N] -> { S[i, j] -> A[j, x = 2i - N + 1, floor((i + j)/2)] }
//! ```
//!
//! The parameter list and both tuple names are optional. Output entries may
//! be named with `name = expr`. A file may hold several maps, optionally
//! separated by `;`.

pub mod token;
pub mod lexer;
pub mod parser;

// Re-exports
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenKind};
pub use crate::utils::errors::ParseError;

use crate::polyhedral::AffineMap;

/// Parse exactly one map.
pub fn parse_map(source: &str) -> Result<AffineMap, ParseError> {
    let mut parser = Parser::new(source)?;
    let map = parser.parse_map()?;
    parser.expect_end()?;
    Ok(map)
}

/// Parse every map in `source`.
pub fn parse_maps(source: &str) -> Result<Vec<AffineMap>, ParseError> {
    Parser::new(source)?.parse_maps()
}
