//! Parser for the map notation.
//!
//! This module implements a recursive descent parser over the token
//! stream. Grammar:
//!
//! ```text
//! maps    := (map ';'*)*
//! map     := ('[' names ']' '->')? '{' tuple '->' out '}'
//! tuple   := IDENT? '[' names ']'
//! out     := IDENT? '[' (entry (',' entry)*)? ']'
//! entry   := (IDENT '=')? expr
//! expr    := term (('+' | '-') term)*
//! term    := factor ('*' factor)*
//! factor  := '-' factor | INT factor? | IDENT | '(' expr ')'
//!          | 'floor' '(' expr '/' INT ')'
//! ```

use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::polyhedral::{AffineExpr, AffineMap, Space};
use crate::utils::errors::{ParseError, ParseErrorKind};
use crate::utils::location::Span;

type ParseResult<T> = Result<T, ParseError>;

/// Names visible inside one map's output tuple.
struct Scope {
    params: Vec<String>,
    inputs: Vec<String>,
}

impl Scope {
    fn n_in(&self) -> usize {
        self.inputs.len()
    }

    fn n_param(&self) -> usize {
        self.params.len()
    }
}

/// A parser for maps in isl-like notation.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Tokenize `source` and create a parser over it.
    pub fn new(source: &str) -> ParseResult<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self, ahead: usize) -> TokenKind {
        self.tokens
            .get(self.pos + ahead)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>, kind: ParseErrorKind) -> ParseError {
        let token = self.current();
        ParseError::new(message, token.span, kind).with_found(token.to_string())
    }

    fn consume(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {}", kind.describe()), ParseErrorKind::ExpectedToken))
        }
    }

    /// Check whether all input has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.current().is_eof()
    }

    /// Skip trailing `;` and fail unless nothing else follows.
    pub fn expect_end(&mut self) -> ParseResult<()> {
        while self.match_token(TokenKind::Semicolon) {}
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error("Unexpected input after map", ParseErrorKind::ExpectedToken))
        }
    }

    /// Parse every map in the input.
    pub fn parse_maps(&mut self) -> ParseResult<Vec<AffineMap>> {
        let mut maps = Vec::new();
        while self.match_token(TokenKind::Semicolon) {}
        while !self.is_at_end() {
            maps.push(self.parse_map()?);
            while self.match_token(TokenKind::Semicolon) {}
        }
        Ok(maps)
    }

    /// Parse a single map.
    pub fn parse_map(&mut self) -> ParseResult<AffineMap> {
        let params = if self.check(TokenKind::LeftBracket) {
            let params = self.parse_name_list(&[])?;
            self.consume(TokenKind::Arrow)?;
            params
        } else {
            Vec::new()
        };

        self.consume(TokenKind::LeftBrace)?;
        let in_tuple = self.parse_tuple_name();
        let inputs = self.parse_name_list(&params)?;
        self.consume(TokenKind::Arrow)?;
        let out_tuple = self.parse_tuple_name();

        let scope = Scope { params, inputs };
        let (names, outputs) = self.parse_outputs(&scope)?;
        self.consume(TokenKind::RightBrace)?;

        let space = Space {
            params: scope.params,
            in_tuple,
            inputs: scope.inputs.into_iter().map(Some).collect(),
            out_tuple,
            outputs: names,
        };
        Ok(AffineMap::new(space, outputs))
    }

    fn parse_tuple_name(&mut self) -> Option<String> {
        if self.check(TokenKind::Identifier) && self.peek_kind(1) == TokenKind::LeftBracket {
            Some(self.advance().lexeme)
        } else {
            None
        }
    }

    /// `[a, b, c]`, rejecting names already in `taken` or repeated.
    fn parse_name_list(&mut self, taken: &[String]) -> ParseResult<Vec<String>> {
        self.consume(TokenKind::LeftBracket)?;
        let mut names: Vec<String> = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                if !self.check(TokenKind::Identifier) {
                    return Err(self.error("Expected dimension name", ParseErrorKind::ExpectedToken));
                }
                let name = self.current().lexeme.clone();
                if names.contains(&name) || taken.contains(&name) {
                    return Err(self.error(format!("Duplicate name '{}'", name), ParseErrorKind::DuplicateName));
                }
                self.advance();
                names.push(name);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBracket)?;
        Ok(names)
    }

    fn parse_outputs(&mut self, scope: &Scope) -> ParseResult<(Vec<Option<String>>, Vec<AffineExpr>)> {
        self.consume(TokenKind::LeftBracket)?;
        let mut names = Vec::new();
        let mut outputs = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                let name = if self.check(TokenKind::Identifier) && self.peek_kind(1) == TokenKind::Equal {
                    let name = self.advance().lexeme;
                    self.advance();
                    Some(name)
                } else {
                    None
                };
                names.push(name);
                outputs.push(self.parse_expr(scope)?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBracket)?;
        Ok((names, outputs))
    }

    fn parse_expr(&mut self, scope: &Scope) -> ParseResult<AffineExpr> {
        let mut expr = self.parse_term(scope)?;
        loop {
            if self.match_token(TokenKind::Plus) {
                expr = expr + self.parse_term(scope)?;
            } else if self.match_token(TokenKind::Minus) {
                expr = expr - self.parse_term(scope)?;
            } else {
                return Ok(expr);
            }
        }
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn parse_term(&mut self, scope: &Scope) -> ParseResult<AffineExpr> {
        let start = self.current().span;
        let mut expr = self.parse_factor(scope)?;
        while self.match_token(TokenKind::Star) {
            let rhs = self.parse_factor(scope)?;
            expr = if expr.is_constant() {
                rhs.scale(expr.constant)
            } else if rhs.is_constant() {
                expr.scale(rhs.constant)
            } else {
                return Err(ParseError::new(
                    "Product of two non-constant expressions is not affine",
                    start.merge(&self.previous_span()),
                    ParseErrorKind::NonAffine,
                ));
            };
        }
        Ok(expr)
    }

    fn parse_integer(&mut self) -> ParseResult<i64> {
        if !self.check(TokenKind::Integer) {
            return Err(self.error("Expected integer", ParseErrorKind::ExpectedToken));
        }
        let value = self
            .current()
            .lexeme
            .parse::<i64>()
            .map_err(|_| self.error("Integer literal out of range", ParseErrorKind::Overflow))?;
        self.advance();
        Ok(value)
    }

    fn parse_factor(&mut self, scope: &Scope) -> ParseResult<AffineExpr> {
        match self.current().kind {
            TokenKind::Minus => {
                self.advance();
                Ok(-self.parse_factor(scope)?)
            }
            TokenKind::Integer => {
                let value = self.parse_integer()?;
                // juxtaposition: 2i, 3(i + j), 2floor(...)
                if matches!(
                    self.current().kind,
                    TokenKind::Identifier | TokenKind::LeftParen | TokenKind::Floor
                ) {
                    Ok(self.parse_factor(scope)?.scale(value))
                } else {
                    Ok(AffineExpr::constant(value, scope.n_in(), scope.n_param()))
                }
            }
            TokenKind::Identifier => {
                let name = self.current().lexeme.clone();
                let expr = if let Some(i) = scope.inputs.iter().position(|n| *n == name) {
                    AffineExpr::var(i, scope.n_in(), scope.n_param())
                } else if let Some(j) = scope.params.iter().position(|n| *n == name) {
                    AffineExpr::param(j, scope.n_in(), scope.n_param())
                } else {
                    return Err(self.error(
                        format!("Unknown identifier '{}'", name),
                        ParseErrorKind::UnknownIdentifier,
                    ));
                };
                self.advance();
                Ok(expr)
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expr(scope)?;
                self.consume(TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::Floor => {
                self.advance();
                self.consume(TokenKind::LeftParen)?;
                let numerator = self.parse_expr(scope)?;
                self.consume(TokenKind::Slash)?;
                let divisor_token = self.current().clone();
                let divisor = self.parse_integer()?;
                if divisor <= 0 {
                    return Err(ParseError::new(
                        "Divisor must be positive",
                        divisor_token.span,
                        ParseErrorKind::InvalidDivisor,
                    )
                    .with_found(divisor_token.lexeme));
                }
                self.consume(TokenKind::RightParen)?;
                Ok(AffineExpr::zero(scope.n_in(), scope.n_param()).add_floor_div(1, numerator, divisor))
            }
            _ => Err(self.error("Expected expression", ParseErrorKind::ExpectedExpression)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polyhedral::DimKind;

    fn parse(source: &str) -> AffineMap {
        Parser::new(source).unwrap().parse_map().unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        match Parser::new(source) {
            Ok(mut p) => p.parse_map().unwrap_err(),
            Err(e) => e,
        }
    }

    #[test]
    fn test_simple_map() {
        let map = parse("{ [i, j] -> [j, i + 1] }");
        assert_eq!(map.n_in(), 2);
        assert_eq!(map.n_out(), 2);
        assert_eq!(map.apply(&[3, 5], &[]), vec![5, 4]);
    }

    #[test]
    fn test_params_and_tuples() {
        let map = parse("[N, M] -> { S[i] -> A[2*i - N + M] }");
        assert_eq!(map.space.params, vec!["N".to_string(), "M".to_string()]);
        assert_eq!(map.space.in_tuple.as_deref(), Some("S"));
        assert_eq!(map.space.out_tuple.as_deref(), Some("A"));
        assert_eq!(map.apply(&[4], &[1, 10]), vec![17]);
    }

    #[test]
    fn test_named_outputs() {
        let map = parse("{ [i, j] -> [x = i + j, j] }");
        assert_eq!(map.space.dim_name(DimKind::Out, 0), Some("x"));
        assert_eq!(map.space.dim_name(DimKind::Out, 1), None);
    }

    #[test]
    fn test_coefficients() {
        let map = parse("{ [i, j] -> [2i - 3(j - 1), -(i), 4 * j * 2] }");
        assert_eq!(map.apply(&[1, 2], &[]), vec![-1, -1, 16]);
    }

    #[test]
    fn test_floor() {
        let map = parse("{ [i] -> [floor((i + 1)/2)] }");
        assert!(map.has_divs());
        assert_eq!(map.apply(&[4], &[]), vec![2]);
    }

    #[test]
    fn test_vanishing_floor_terms() {
        let map = parse("{ [i, j] -> [i + 0*floor((i)/2), floor((j)/2) - floor((j)/2), 0 floor((j)/3)] }");
        assert!(!map.has_divs());
        assert!(map.outputs.iter().all(|e| e.divs.is_empty()));
        assert_eq!(map.apply(&[5, 7], &[]), vec![5, 0, 0]);
    }

    #[test]
    fn test_non_affine_span_covers_product() {
        let source = "{ [i, j] -> [1 + 2*i * j] }";
        let err = parse_err(source);
        assert_eq!(err.kind, ParseErrorKind::NonAffine);
        assert_eq!(err.span.text(source), "2*i * j");
    }

    #[test]
    fn test_empty_tuples() {
        let map = parse("{ [] -> [] }");
        assert_eq!(map.n_in(), 0);
        assert_eq!(map.n_out(), 0);
    }

    #[test]
    fn test_display_round_trip() {
        let source = "[N] -> { S[i, j] -> [a = i - 2*j + N - 1, floor((i)/3), 7] }";
        let map = parse(source);
        let printed = format!("{}", map);
        assert_eq!(parse(&printed), map);
    }

    #[test]
    fn test_multiple_maps() {
        let maps = Parser::new("{ [i] -> [i] };\n{ [i] -> [2i] }\n{ [j] -> [] };")
            .unwrap()
            .parse_maps()
            .unwrap();
        assert_eq!(maps.len(), 3);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_err("{ [i] -> [k] }").kind, ParseErrorKind::UnknownIdentifier);
        assert_eq!(parse_err("{ [i, i] -> [i] }").kind, ParseErrorKind::DuplicateName);
        assert_eq!(parse_err("[i] -> { [i] -> [i] }").kind, ParseErrorKind::DuplicateName);
        assert_eq!(parse_err("{ [i, j] -> [i * j] }").kind, ParseErrorKind::NonAffine);
        assert_eq!(parse_err("{ [i] -> [floor(i/0)] }").kind, ParseErrorKind::InvalidDivisor);
        assert_eq!(parse_err("{ [i] -> [i / 2] }").kind, ParseErrorKind::ExpectedToken);
        assert_eq!(parse_err("{ [i] -> [] ").kind, ParseErrorKind::ExpectedToken);
        assert_eq!(parse_err("{ [i] -> [,] }").kind, ParseErrorKind::ExpectedExpression);
        assert_eq!(parse_err("{ [i] -> [99999999999999999999] }").kind, ParseErrorKind::Overflow);
        assert_eq!(parse_err("{ [i] -> [i % 2] }").kind, ParseErrorKind::Lexical);
    }
}
