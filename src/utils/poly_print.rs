//! Report printing for factorizations.
//!
//! This module renders maps, coefficient matrices and whole factorization
//! results in a human-readable, isl-like layout.

use crate::factor::Factorization;
use crate::polyhedral::AffineMap;
use crate::utils::matrix::IntMatrix;

/// Pretty printer for factorization reports.
pub struct PolyPrinter {
    /// Indentation level
    indent: usize,
    /// Output buffer
    buffer: String,
    /// Also print the trimmed Hermite factors
    show_matrices: bool,
}

impl Default for PolyPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl PolyPrinter {
    /// Create a new printer.
    pub fn new() -> Self {
        Self {
            indent: 0,
            buffer: String::new(),
            show_matrices: false,
        }
    }

    /// Include the `H` and `Q` matrices in reports.
    pub fn with_matrices(mut self, show: bool) -> Self {
        self.show_matrices = show;
        self
    }

    /// Get the output.
    pub fn output(&self) -> &str {
        &self.buffer
    }

    /// Take the output.
    pub fn take_output(self) -> String {
        self.buffer
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.buffer.push_str("  ");
        }
    }

    fn line(&mut self, text: &str) {
        self.write_indent();
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Print an affine map on its own line.
    pub fn print_map(&mut self, map: &AffineMap) {
        self.line(&map.to_string());
    }

    /// Print a matrix, one row per line.
    pub fn print_matrix(&mut self, matrix: &IntMatrix) {
        if matrix.nrows() == 0 {
            self.line("[]");
            return;
        }
        let rows: Vec<Vec<String>> = matrix
            .to_vec()
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();
        let width = rows.iter().flatten().map(|s| s.len()).max().unwrap_or(1);
        for row in rows {
            let cells: Vec<String> = row.iter().map(|s| format!("{:>width$}", s, width = width)).collect();
            self.line(&format!("[{}]", cells.join(" ")));
        }
    }

    /// Print a full report: the common factor, its rank, and one
    /// projection per original map.
    pub fn print_factorization(&mut self, originals: &[AffineMap], result: &Factorization) {
        self.line(&format!("Common factor (rank {}):", result.rank()));
        self.indent += 1;
        self.print_map(&result.common_factor);
        self.indent -= 1;

        if self.show_matrices {
            self.line("H:");
            self.indent += 1;
            self.print_matrix(&result.factors.h);
            self.indent -= 1;
            self.line("Q:");
            self.indent += 1;
            self.print_matrix(&result.factors.q);
            self.indent -= 1;
        }

        for (idx, (original, projection)) in result.entries(originals).enumerate() {
            self.line(&format!("Map {}:", idx));
            self.indent += 1;
            self.line(&format!("original:   {}", original));
            self.line(&format!("projection: {}", projection));
            self.indent -= 1;
        }
    }
}

/// Render a single map.
pub fn print_map(map: &AffineMap) -> String {
    let mut printer = PolyPrinter::new();
    printer.print_map(map);
    printer.take_output()
}

/// Render a factorization report.
pub fn print_factorization(originals: &[AffineMap], result: &Factorization) -> String {
    let mut printer = PolyPrinter::new();
    printer.print_factorization(originals, result);
    printer.take_output()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::factor;
    use crate::frontend::parse_maps;

    #[test]
    fn test_print_matrix_alignment() {
        let mut printer = PolyPrinter::new();
        printer.print_matrix(&IntMatrix::from_vec(vec![vec![1, -10], vec![0, 3]]));
        assert_eq!(printer.output(), "[  1 -10]\n[  0   3]\n");
    }

    #[test]
    fn test_print_empty_matrix() {
        let mut printer = PolyPrinter::new();
        printer.print_matrix(&IntMatrix::zeros(0, 3));
        assert_eq!(printer.output(), "[]\n");
    }

    #[test]
    fn test_print_factorization() {
        let maps = parse_maps("{ [i, j] -> [i + j] }\n{ [i, j] -> [2i + 2j + 1] }").unwrap();
        let result = factor(&maps).unwrap();
        let report = print_factorization(&maps, &result);
        assert!(report.starts_with("Common factor (rank 2):\n"));
        assert!(report.contains("Map 0:"));
        assert!(report.contains("Map 1:"));
        assert!(!report.contains("H:"));

        let mut printer = PolyPrinter::new().with_matrices(true);
        printer.print_factorization(&maps, &result);
        assert!(printer.output().contains("Q:\n"));
    }
}
