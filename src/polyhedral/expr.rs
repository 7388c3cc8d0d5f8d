//! Affine expressions over a map's domain.
//!
//! An affine expression is a linear combination of input dimensions and
//! parameters plus a constant:
//! `aff(x, p) = c0 + c1*x1 + ... + cn*xn + d1*p1 + ... + dm*pm`
//!
//! Expressions may additionally carry floor-division terms
//! `k * floor(e / d)`, which introduce existentially quantified dimensions.
//! They can be built, evaluated and printed but are not linear, so the
//! factorizer rejects them.

use num_integer::Integer;
use serde::{Serialize, Deserialize};
use std::fmt;
use std::ops::{Add, Sub, Neg};

/// An affine expression: constant + sum(coeff[i] * in[i]) + sum(param_coeff[j] * param[j]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffineExpr {
    /// Constant term
    pub constant: i64,
    /// Coefficients for each input dimension
    pub coeffs: Vec<i64>,
    /// Coefficients for parameters
    pub param_coeffs: Vec<i64>,
    /// Floor-division terms
    pub divs: Vec<FloorDiv>,
}

/// A term `coeff * floor(numerator / divisor)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloorDiv {
    /// Multiplier of the division
    pub coeff: i64,
    /// Expression being divided
    pub numerator: AffineExpr,
    /// Positive divisor
    pub divisor: i64,
}

impl AffineExpr {
    /// Create a zero expression.
    pub fn zero(n_in: usize, n_param: usize) -> Self {
        Self {
            constant: 0,
            coeffs: vec![0; n_in],
            param_coeffs: vec![0; n_param],
            divs: Vec::new(),
        }
    }

    /// Create a constant expression.
    pub fn constant(value: i64, n_in: usize, n_param: usize) -> Self {
        Self {
            constant: value,
            ..Self::zero(n_in, n_param)
        }
    }

    /// Create an expression for a single input dimension.
    pub fn var(dim: usize, n_in: usize, n_param: usize) -> Self {
        let mut expr = Self::zero(n_in, n_param);
        expr.set_coeff(dim, 1);
        expr
    }

    /// Create an expression for a parameter.
    pub fn param(idx: usize, n_in: usize, n_param: usize) -> Self {
        let mut expr = Self::zero(n_in, n_param);
        expr.set_param_coeff(idx, 1);
        expr
    }

    /// Number of input dimensions.
    pub fn n_in(&self) -> usize {
        self.coeffs.len()
    }

    /// Number of parameters.
    pub fn n_param(&self) -> usize {
        self.param_coeffs.len()
    }

    /// Check if this is a constant expression.
    pub fn is_constant(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
            && self.param_coeffs.iter().all(|&c| c == 0)
            && !self.has_divs()
    }

    /// Check whether any floor-division term is present.
    pub fn has_divs(&self) -> bool {
        self.divs.iter().any(|d| d.coeff != 0)
    }

    /// Get coefficient for an input dimension.
    pub fn coeff(&self, dim: usize) -> i64 {
        self.coeffs.get(dim).copied().unwrap_or(0)
    }

    /// Get coefficient for a parameter.
    pub fn param_coeff(&self, idx: usize) -> i64 {
        self.param_coeffs.get(idx).copied().unwrap_or(0)
    }

    /// Set coefficient for an input dimension.
    pub fn set_coeff(&mut self, dim: usize, value: i64) {
        if dim < self.coeffs.len() {
            self.coeffs[dim] = value;
        }
    }

    /// Set coefficient for a parameter.
    pub fn set_param_coeff(&mut self, idx: usize, value: i64) {
        if idx < self.param_coeffs.len() {
            self.param_coeffs[idx] = value;
        }
    }

    /// Add `coeff * floor(numerator / divisor)` to this expression.
    ///
    /// A term with the same numerator and divisor is merged into the
    /// existing one. Terms whose coefficient becomes zero are dropped.
    pub fn add_floor_div(mut self, coeff: i64, numerator: AffineExpr, divisor: i64) -> Self {
        debug_assert!(divisor > 0, "floor division by non-positive divisor");
        self.push_div(FloorDiv { coeff, numerator, divisor });
        self
    }

    fn push_div(&mut self, div: FloorDiv) {
        match self
            .divs
            .iter_mut()
            .find(|d| d.divisor == div.divisor && d.numerator == div.numerator)
        {
            Some(existing) => existing.coeff += div.coeff,
            None => self.divs.push(div),
        }
        self.divs.retain(|d| d.coeff != 0);
    }

    /// Evaluate the expression at a point.
    pub fn evaluate(&self, inputs: &[i64], params: &[i64]) -> i64 {
        let linear: i64 = self.coeffs.iter().zip(inputs).map(|(c, v)| c * v).sum::<i64>()
            + self.param_coeffs.iter().zip(params).map(|(c, v)| c * v).sum::<i64>();
        let divs: i64 = self
            .divs
            .iter()
            .map(|d| d.coeff * d.numerator.evaluate(inputs, params).div_floor(&d.divisor))
            .sum();
        self.constant + linear + divs
    }

    /// Scale the expression by a constant.
    pub fn scale(&self, factor: i64) -> Self {
        Self {
            constant: self.constant * factor,
            coeffs: self.coeffs.iter().map(|&c| c * factor).collect(),
            param_coeffs: self.param_coeffs.iter().map(|&c| c * factor).collect(),
            divs: self
                .divs
                .iter()
                .filter(|_| factor != 0)
                .map(|d| FloorDiv { coeff: d.coeff * factor, ..d.clone() })
                .collect(),
        }
    }

    /// Substitute the input dimensions by `inputs` and reindex parameters.
    ///
    /// `param_map[j]` is the position of this expression's parameter `j`
    /// among the `n_param` parameters of the result. The result is an
    /// expression over `n_in` input dimensions.
    pub fn substitute(&self, inputs: &[AffineExpr], param_map: &[usize], n_in: usize, n_param: usize) -> Self {
        let mut result = AffineExpr::constant(self.constant, n_in, n_param);
        for (j, &c) in self.param_coeffs.iter().enumerate() {
            if c != 0 {
                result.param_coeffs[param_map[j]] += c;
            }
        }
        for (i, &c) in self.coeffs.iter().enumerate() {
            if c != 0 {
                result = result + inputs[i].scale(c);
            }
        }
        for d in &self.divs {
            let numerator = d.numerator.substitute(inputs, param_map, n_in, n_param);
            result.push_div(FloorDiv { coeff: d.coeff, numerator, divisor: d.divisor });
        }
        result
    }

    /// Convert to string with given input and parameter names.
    pub fn to_string_with_names(&self, in_names: &[String], param_names: &[String]) -> String {
        let mut terms: Vec<(i64, String)> = Vec::new();

        for (i, &c) in self.coeffs.iter().enumerate() {
            if c != 0 {
                let name = in_names.get(i).cloned().unwrap_or_else(|| format!("i{}", i));
                terms.push((c, name));
            }
        }
        for (i, &c) in self.param_coeffs.iter().enumerate() {
            if c != 0 {
                let name = param_names.get(i).cloned().unwrap_or_else(|| format!("p{}", i));
                terms.push((c, name));
            }
        }
        for d in &self.divs {
            if d.coeff != 0 {
                let inner = d.numerator.to_string_with_names(in_names, param_names);
                terms.push((d.coeff, format!("floor(({})/{})", inner, d.divisor)));
            }
        }

        let mut out = String::new();
        for (idx, (c, name)) in terms.iter().enumerate() {
            let magnitude = c.abs();
            if idx == 0 {
                if *c < 0 {
                    out.push('-');
                }
            } else if *c < 0 {
                out.push_str(" - ");
            } else {
                out.push_str(" + ");
            }
            if magnitude != 1 {
                out.push_str(&format!("{}*", magnitude));
            }
            out.push_str(name);
        }

        if terms.is_empty() {
            out.push_str(&self.constant.to_string());
        } else if self.constant > 0 {
            out.push_str(&format!(" + {}", self.constant));
        } else if self.constant < 0 {
            out.push_str(&format!(" - {}", -self.constant));
        }
        out
    }
}

impl Add for AffineExpr {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        assert_eq!(self.coeffs.len(), other.coeffs.len());
        assert_eq!(self.param_coeffs.len(), other.param_coeffs.len());
        let mut sum = Self {
            constant: self.constant + other.constant,
            coeffs: self.coeffs.iter().zip(&other.coeffs)
                .map(|(&a, &b)| a + b).collect(),
            param_coeffs: self.param_coeffs.iter().zip(&other.param_coeffs)
                .map(|(&a, &b)| a + b).collect(),
            divs: self.divs,
        };
        for d in other.divs {
            sum.push_div(d);
        }
        sum
    }
}

impl Sub for AffineExpr {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self + other.scale(-1)
    }
}

impl Neg for AffineExpr {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-1)
    }
}

impl fmt::Display for AffineExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let in_names: Vec<String> = (0..self.n_in()).map(|i| format!("i{}", i)).collect();
        let param_names: Vec<String> = (0..self.n_param()).map(|i| format!("p{}", i)).collect();
        write!(f, "{}", self.to_string_with_names(&in_names, &param_names))
    }
}
