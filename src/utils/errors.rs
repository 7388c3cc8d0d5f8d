//! Error types for the factorizer.
//!
//! This module defines all error types used throughout the crate,
//! organized by the phase that produces them.

use thiserror::Error;
use crate::utils::location::Span;
use std::fmt;

/// Top-level error type for the crate.
#[derive(Error, Debug)]
pub enum PolyFactorError {
    /// Error during lexing/tokenization
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    /// Error during parsing
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error during factorization
    #[error("Factorization error: {0}")]
    Factor(#[from] FactorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during lexical analysis.
#[derive(Error, Debug, Clone)]
pub struct LexerError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of lexer error
    pub kind: LexerErrorKind,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// The kind of lexer error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    /// Unexpected character
    UnexpectedChar,
    /// Invalid number literal
    InvalidNumber,
}

/// Error during parsing.
#[derive(Error, Debug, Clone)]
pub struct ParseError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of parse error
    pub kind: ParseErrorKind,
    /// What was found
    pub found: Option<String>,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, span: Span, kind: ParseErrorKind) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
            found: None,
        }
    }

    /// Record the offending lexeme.
    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)?;
        if let Some(ref found) = self.found {
            write!(f, " (found: {})", found)?;
        }
        Ok(())
    }
}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        ParseError::new(err.message, err.span, ParseErrorKind::Lexical)
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Bad token in the input
    Lexical,
    /// Expected a specific token
    ExpectedToken,
    /// Expected an expression
    ExpectedExpression,
    /// Identifier is neither a parameter nor an input dimension
    UnknownIdentifier,
    /// Same name declared twice in one tuple
    DuplicateName,
    /// Product of two non-constant terms
    NonAffine,
    /// Division by zero or a non-positive divisor
    InvalidDivisor,
    /// Integer literal does not fit
    Overflow,
}

/// Error during factorization.
#[derive(Error, Debug, Clone)]
pub struct FactorError {
    /// The error message
    pub message: String,
    /// The kind of factorization error
    pub kind: FactorErrorKind,
}

impl FactorError {
    /// Create a new factorization error.
    pub fn new(kind: FactorErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Whether the error signals a bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self.kind,
            FactorErrorKind::DecompositionInconsistency
                | FactorErrorKind::UnknownOutputName
                | FactorErrorKind::VerificationFailed
        )
    }
}

impl fmt::Display for FactorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// The kind of factorization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorErrorKind {
    /// Input list is empty or the domains differ
    InvalidDomainMismatch,
    /// An expression uses existentially quantified (floor division) terms
    UnsupportedDimensionKind,
    /// Hermite factors have inconsistent shapes after trimming
    DecompositionInconsistency,
    /// Provenance name missing from the decomposed range
    UnknownOutputName,
    /// Matrix shape does not fit the target space
    ShapeMismatch,
    /// A round-trip check did not reproduce its input
    VerificationFailed,
    /// An intermediate coefficient does not fit in `i64`
    Overflow,
}

impl fmt::Display for FactorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FactorErrorKind::InvalidDomainMismatch => "invalid domain mismatch",
            FactorErrorKind::UnsupportedDimensionKind => "unsupported dimension kind",
            FactorErrorKind::DecompositionInconsistency => "decomposition inconsistency",
            FactorErrorKind::UnknownOutputName => "unknown output name",
            FactorErrorKind::ShapeMismatch => "shape mismatch",
            FactorErrorKind::VerificationFailed => "verification failed",
            FactorErrorKind::Overflow => "overflow",
        };
        write!(f, "{}", name)
    }
}

/// Result type using FactorError.
pub type FactorResult<T> = Result<T, FactorError>;

/// Result type using PolyFactorError.
pub type PolyResult<T> = Result<T, PolyFactorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::location::SourceLocation;

    #[test]
    fn test_error_display() {
        let err = ParseError::new("Unknown identifier", Span::new(SourceLocation::new(1, 5, 4), SourceLocation::new(1, 10, 9)), ParseErrorKind::UnknownIdentifier)
            .with_found("x");
        let s = format!("{}", err);
        assert!(s.contains("Unknown identifier"));
        assert!(s.contains("found: x"));
    }

    #[test]
    fn test_factor_error_display() {
        let err = FactorError::new(FactorErrorKind::InvalidDomainMismatch, "empty input");
        assert_eq!(format!("{}", err), "invalid domain mismatch: empty input");
        assert!(!err.is_internal());
        assert!(FactorError::new(FactorErrorKind::UnknownOutputName, "x").is_internal());
    }

    #[test]
    fn test_wraps_into_top_level() {
        let err: PolyFactorError = FactorError::new(FactorErrorKind::ShapeMismatch, "3 != 4").into();
        assert!(format!("{}", err).starts_with("Factorization error"));
    }
}
