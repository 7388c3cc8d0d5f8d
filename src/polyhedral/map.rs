//! Affine maps: one affine expression per output dimension.

use crate::polyhedral::space::Space;
use crate::polyhedral::expr::AffineExpr;
use serde::{Serialize, Deserialize};
use std::fmt;

/// An affine map from a domain space to a range space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffineMap {
    /// The map space
    pub space: Space,
    /// Output expressions (one per output dimension)
    pub outputs: Vec<AffineExpr>,
}

impl AffineMap {
    /// Create a map from a space and its output expressions.
    pub fn new(space: Space, outputs: Vec<AffineExpr>) -> Self {
        debug_assert_eq!(space.n_out(), outputs.len());
        debug_assert!(outputs
            .iter()
            .all(|e| e.n_in() == space.n_in() && e.n_param() == space.n_param()));
        Self { space, outputs }
    }

    /// Create the identity map on a set space.
    pub fn identity(set: &Space) -> Self {
        let space = Space::map_from_domain_and_range(set, set);
        let n_in = space.n_in();
        let n_param = space.n_param();
        let outputs = (0..n_in)
            .map(|i| AffineExpr::var(i, n_in, n_param))
            .collect();
        Self { space, outputs }
    }

    /// Create a map that selects the given dimensions of a set space, in order.
    pub fn selection(set: &Space, indices: &[usize]) -> Self {
        let space = Space::map_from_domain_and_range(set, &Space::set(indices.len()));
        let n_in = space.n_in();
        let n_param = space.n_param();
        let outputs = indices
            .iter()
            .map(|&i| AffineExpr::var(i, n_in, n_param))
            .collect();
        Self { space, outputs }
    }

    /// Get input dimensions.
    pub fn n_in(&self) -> usize { self.space.n_in() }

    /// Get output dimensions.
    pub fn n_out(&self) -> usize { self.space.n_out() }

    /// Get number of parameters.
    pub fn n_param(&self) -> usize { self.space.n_param() }

    /// Check whether any output uses a floor-division term.
    pub fn has_divs(&self) -> bool {
        self.outputs.iter().any(|e| e.has_divs())
    }

    /// Apply the map to a point.
    pub fn apply(&self, input: &[i64], params: &[i64]) -> Vec<i64> {
        self.outputs.iter()
            .map(|expr| expr.evaluate(input, params))
            .collect()
    }

    /// Reorder this map's parameters to follow `params`.
    ///
    /// Parameters in `params` that the map does not use get zero
    /// coefficients. Returns `None` if the map has a parameter missing
    /// from `params`.
    pub fn align_params(&self, params: &[String]) -> Option<AffineMap> {
        let param_map: Vec<usize> = self
            .space
            .params
            .iter()
            .map(|p| params.iter().position(|q| q == p))
            .collect::<Option<_>>()?;
        let n_in = self.n_in();
        let inputs: Vec<AffineExpr> = (0..n_in)
            .map(|i| AffineExpr::var(i, n_in, params.len()))
            .collect();
        let outputs = self
            .outputs
            .iter()
            .map(|e| e.substitute(&inputs, &param_map, n_in, params.len()))
            .collect();
        let mut space = self.space.clone();
        space.params = params.to_vec();
        Some(Self { space, outputs })
    }

    /// Compose two maps: `self` after `inner`.
    ///
    /// The result maps `inner`'s domain to `self`'s range. Parameters are
    /// matched by name; the result has `inner`'s parameters followed by
    /// any that only `self` uses.
    ///
    /// # Panics
    ///
    /// Panics if `inner`'s range dimension differs from `self`'s domain.
    pub fn pullback(&self, inner: &AffineMap) -> AffineMap {
        assert_eq!(self.n_in(), inner.n_out(), "pullback dimension mismatch");

        let mut params = inner.space.params.clone();
        for p in &self.space.params {
            if !params.contains(p) {
                params.push(p.clone());
            }
        }
        // every parameter of inner is in params by construction
        let inner = inner
            .align_params(&params)
            .unwrap_or_else(|| inner.clone());
        let param_map: Vec<usize> = self
            .space
            .params
            .iter()
            .filter_map(|p| params.iter().position(|q| q == p))
            .collect();

        let n_in = inner.n_in();
        let outputs = self
            .outputs
            .iter()
            .map(|e| e.substitute(&inner.outputs, &param_map, n_in, params.len()))
            .collect();

        let space = Space {
            params,
            in_tuple: inner.space.in_tuple.clone(),
            inputs: inner.space.inputs.clone(),
            out_tuple: self.space.out_tuple.clone(),
            outputs: self.space.outputs.clone(),
        };
        Self { space, outputs }
    }

    /// Concatenate the outputs of two maps over the same domain.
    ///
    /// Returns `None` if the domains differ. Output names are kept and
    /// `other` is aligned to `self`'s parameter order.
    pub fn flat_range_product(&self, other: &AffineMap) -> Option<AffineMap> {
        if !self.space.has_equal_domain(&other.space) {
            return None;
        }
        let other = other.align_params(&self.space.params)?;
        let mut space = self.space.clone();
        space.out_tuple = None;
        space.outputs.extend(other.space.outputs);
        let mut outputs = self.outputs.clone();
        outputs.extend(other.outputs);
        Some(Self { space, outputs })
    }

    /// Replace the range tuple (names and tuple name) with that of `range`.
    ///
    /// # Panics
    ///
    /// Panics if the dimension counts differ.
    pub fn with_range_space(mut self, range: &Space) -> Self {
        assert_eq!(self.n_out(), range.n_out(), "range dimension mismatch");
        self.space.out_tuple = range.out_tuple.clone();
        self.space.outputs = range.outputs.clone();
        self
    }

    /// Structural equality, with parameters compared by name.
    pub fn plain_is_equal(&self, other: &AffineMap) -> bool {
        if !self.space.has_equal_params(&other.space) {
            return false;
        }
        match other.align_params(&self.space.params) {
            Some(aligned) => *self == aligned,
            None => false,
        }
    }

    /// Check if this is an identity map.
    pub fn is_identity(&self) -> bool {
        if self.n_in() != self.n_out() {
            return false;
        }
        self.outputs
            .iter()
            .enumerate()
            .all(|(i, e)| *e == AffineExpr::var(i, self.n_in(), self.n_param()))
    }
}

impl fmt::Display for AffineMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let space = &self.space;
        if !space.params.is_empty() {
            write!(f, "[{}] -> ", space.params.join(", "))?;
        }
        let in_names = space.input_names();
        write!(f, "{{ ")?;
        if let Some(ref t) = space.in_tuple {
            write!(f, "{}", t)?;
        }
        write!(f, "[{}] -> ", in_names.join(", "))?;
        if let Some(ref t) = space.out_tuple {
            write!(f, "{}", t)?;
        }
        write!(f, "[")?;
        for (i, expr) in self.outputs.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            if let Some(name) = space.outputs.get(i).and_then(|n| n.as_deref()) {
                write!(f, "{} = ", name)?;
            }
            write!(f, "{}", expr.to_string_with_names(&in_names, &space.params))?;
        }
        write!(f, "] }}")
    }
}
