//! Spaces describe the dimensions an affine map ranges over.
//!
//! A map space has three kinds of dimensions:
//! - Parameters (symbolic constants, always named)
//! - Input dimensions, optionally named, optionally under a tuple name
//! - Output dimensions, optionally named, optionally under a tuple name

use serde::{Serialize, Deserialize};
use std::fmt;

/// The kind of a dimension within a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimKind {
    /// Symbolic parameter
    Param,
    /// Input (domain) dimension
    In,
    /// Output (range) dimension
    Out,
}

/// A map space: parameters, an input tuple and an output tuple.
///
/// Set spaces (domains and ranges) are represented as map spaces with no
/// input dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Space {
    /// Parameter names
    pub params: Vec<String>,
    /// Name of the input tuple
    pub in_tuple: Option<String>,
    /// Input dimension names
    pub inputs: Vec<Option<String>>,
    /// Name of the output tuple
    pub out_tuple: Option<String>,
    /// Output dimension names
    pub outputs: Vec<Option<String>>,
}

impl Space {
    /// Create a new unnamed map space.
    pub fn map(n_in: usize, n_out: usize) -> Self {
        Self {
            params: Vec::new(),
            in_tuple: None,
            inputs: vec![None; n_in],
            out_tuple: None,
            outputs: vec![None; n_out],
        }
    }

    /// Create a new set space with the given number of dimensions.
    pub fn set(n_dim: usize) -> Self {
        Self::map(0, n_dim)
    }

    /// Set parameter names.
    pub fn with_params<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.params = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the input dimensions with the given names.
    pub fn with_input_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.inputs = names.into_iter().map(|n| Some(n.into())).collect();
        self
    }

    /// Replace the output dimensions with the given names.
    pub fn with_output_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.outputs = names.into_iter().map(|n| Some(n.into())).collect();
        self
    }

    /// Set the input tuple name.
    pub fn with_in_tuple(mut self, name: Option<String>) -> Self {
        self.in_tuple = name;
        self
    }

    /// Set the output tuple name.
    pub fn with_out_tuple(mut self, name: Option<String>) -> Self {
        self.out_tuple = name;
        self
    }

    /// Number of parameters.
    pub fn n_param(&self) -> usize {
        self.params.len()
    }

    /// Number of input dimensions.
    pub fn n_in(&self) -> usize {
        self.inputs.len()
    }

    /// Number of output dimensions.
    pub fn n_out(&self) -> usize {
        self.outputs.len()
    }

    /// Number of dimensions of the given kind.
    pub fn dim(&self, kind: DimKind) -> usize {
        match kind {
            DimKind::Param => self.n_param(),
            DimKind::In => self.n_in(),
            DimKind::Out => self.n_out(),
        }
    }

    /// Name of a dimension, if it has one.
    pub fn dim_name(&self, kind: DimKind, pos: usize) -> Option<&str> {
        match kind {
            DimKind::Param => self.params.get(pos).map(|s| s.as_str()),
            DimKind::In => self.inputs.get(pos).and_then(|s| s.as_deref()),
            DimKind::Out => self.outputs.get(pos).and_then(|s| s.as_deref()),
        }
    }

    /// Position of the first dimension of `kind` with the given name.
    pub fn find_dim_by_name(&self, kind: DimKind, name: &str) -> Option<usize> {
        (0..self.dim(kind)).find(|&i| self.dim_name(kind, i) == Some(name))
    }

    /// Rename a dimension.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn set_dim_name(mut self, kind: DimKind, pos: usize, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            DimKind::Param => self.params[pos] = name,
            DimKind::In => self.inputs[pos] = Some(name),
            DimKind::Out => self.outputs[pos] = Some(name),
        }
        self
    }

    /// Append `n` unnamed dimensions of the given kind.
    ///
    /// Parameters get placeholder names `p<i>` since they must be named.
    pub fn add_dims(mut self, kind: DimKind, n: usize) -> Self {
        match kind {
            DimKind::Param => {
                let start = self.params.len();
                self.params.extend((start..start + n).map(|i| format!("p{}", i)));
            }
            DimKind::In => self.inputs.extend(std::iter::repeat(None).take(n)),
            DimKind::Out => self.outputs.extend(std::iter::repeat(None).take(n)),
        }
        self
    }

    /// Remove `n` dimensions of the given kind starting at `first`.
    pub fn drop_dims(mut self, kind: DimKind, first: usize, n: usize) -> Self {
        match kind {
            DimKind::Param => { self.params.drain(first..first + n); }
            DimKind::In => { self.inputs.drain(first..first + n); }
            DimKind::Out => { self.outputs.drain(first..first + n); }
        }
        self
    }

    /// Swap the input and output tuples.
    pub fn reverse(mut self) -> Self {
        std::mem::swap(&mut self.inputs, &mut self.outputs);
        std::mem::swap(&mut self.in_tuple, &mut self.out_tuple);
        self
    }

    /// The domain of this map space, as a set space.
    pub fn domain(&self) -> Space {
        Space {
            params: self.params.clone(),
            in_tuple: None,
            inputs: Vec::new(),
            out_tuple: self.in_tuple.clone(),
            outputs: self.inputs.clone(),
        }
    }

    /// The range of this map space, as a set space.
    pub fn range(&self) -> Space {
        Space {
            params: self.params.clone(),
            in_tuple: None,
            inputs: Vec::new(),
            out_tuple: self.out_tuple.clone(),
            outputs: self.outputs.clone(),
        }
    }

    /// Build a map space from two set spaces.
    ///
    /// Parameters are taken from `domain`; parameters of `range` that
    /// `domain` lacks are appended.
    pub fn map_from_domain_and_range(domain: &Space, range: &Space) -> Space {
        let mut params = domain.params.clone();
        for p in &range.params {
            if !params.contains(p) {
                params.push(p.clone());
            }
        }
        Space {
            params,
            in_tuple: domain.out_tuple.clone(),
            inputs: domain.outputs.clone(),
            out_tuple: range.out_tuple.clone(),
            outputs: range.outputs.clone(),
        }
    }

    /// The identity map space over the range of this space.
    pub fn range_identity(&self) -> Space {
        let range = self.range();
        Space::map_from_domain_and_range(&range, &range)
    }

    /// Check whether two spaces have the same parameter set.
    pub fn has_equal_params(&self, other: &Space) -> bool {
        self.params.len() == other.params.len()
            && self.params.iter().all(|p| other.params.contains(p))
    }

    /// Check whether two map spaces share a domain signature: the same
    /// parameter set and identical input tuples.
    pub fn has_equal_domain(&self, other: &Space) -> bool {
        self.has_equal_params(other)
            && self.in_tuple == other.in_tuple
            && self.inputs == other.inputs
    }

    /// Input dimension names, with `i<n>` defaults for unnamed dimensions.
    pub fn input_names(&self) -> Vec<String> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(i, n)| n.clone().unwrap_or_else(|| format!("i{}", i)))
            .collect()
    }
}

fn write_tuple(f: &mut fmt::Formatter<'_>, tuple: &Option<String>, dims: &[String]) -> fmt::Result {
    if let Some(name) = tuple {
        write!(f, "{}", name)?;
    }
    write!(f, "[{}]", dims.join(", "))
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.params.is_empty() {
            write!(f, "[{}] -> ", self.params.join(", "))?;
        }
        write!(f, "{{ ")?;
        if !self.inputs.is_empty() || self.in_tuple.is_some() {
            write_tuple(f, &self.in_tuple, &self.input_names())?;
            write!(f, " -> ")?;
        }
        let outputs: Vec<String> = self
            .outputs
            .iter()
            .enumerate()
            .map(|(i, n)| n.clone().unwrap_or_else(|| format!("o{}", i)))
            .collect();
        write_tuple(f, &self.out_tuple, &outputs)?;
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_space() {
        let space = Space::set(3);
        assert_eq!(space.n_in(), 0);
        assert_eq!(space.n_out(), 3);
    }

    #[test]
    fn test_map_space() {
        let space = Space::map(2, 3).with_params(["N"]);
        assert_eq!(space.dim(DimKind::Param), 1);
        assert_eq!(space.dim(DimKind::In), 2);
        assert_eq!(space.dim(DimKind::Out), 3);
    }

    #[test]
    fn test_with_names() {
        let space = Space::map(0, 0).with_input_names(["i", "j"]);
        assert_eq!(space.dim_name(DimKind::In, 0), Some("i"));
        assert_eq!(space.find_dim_by_name(DimKind::In, "j"), Some(1));
        assert_eq!(space.find_dim_by_name(DimKind::In, "k"), None);
    }

    #[test]
    fn test_add_drop_rename() {
        let space = Space::map(2, 1)
            .add_dims(DimKind::Out, 2)
            .set_dim_name(DimKind::Out, 2, "x")
            .drop_dims(DimKind::Out, 0, 1);
        assert_eq!(space.n_out(), 2);
        assert_eq!(space.dim_name(DimKind::Out, 1), Some("x"));
        let space = space.add_dims(DimKind::Param, 1);
        assert_eq!(space.params, vec!["p0".to_string()]);
    }

    #[test]
    fn test_reverse_and_domain() {
        let space = Space::map(0, 0)
            .with_input_names(["i"])
            .with_output_names(["a", "b"])
            .with_in_tuple(Some("S".to_string()));
        let rev = space.clone().reverse();
        assert_eq!(rev.n_in(), 2);
        assert_eq!(rev.out_tuple.as_deref(), Some("S"));
        let rebuilt = Space::map_from_domain_and_range(&space.domain(), &space.range());
        assert_eq!(rebuilt, space);
    }

    #[test]
    fn test_domain_signature() {
        let a = Space::map(0, 1).with_params(["N", "M"]).with_input_names(["i", "j"]);
        let b = Space::map(0, 4).with_params(["M", "N"]).with_input_names(["i", "j"]);
        let c = Space::map(0, 1).with_params(["N", "M"]).with_input_names(["j", "i"]);
        assert!(a.has_equal_domain(&b));
        assert!(!a.has_equal_domain(&c));
    }

    #[test]
    fn test_display() {
        let space = Space::map(0, 1).with_params(["N"]).with_input_names(["i", "j"]);
        assert_eq!(format!("{}", space), "[N] -> { [i, j] -> [o0] }");
    }
}
