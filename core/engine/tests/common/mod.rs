//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for formula engine integration tests.

#![allow(dead_code)]

use formula_engine::{EvalResult, Formula};
use formula_parser::{parse, Expression, ParserOptions};

/// Formulas that must parse, with a point and the value expected there.
pub const VALUED_FORMULAS: &[(&str, f64, f64)] = &[
    ("2+3*4", 0.0, 14.0),
    ("2^3^2", 0.0, 64.0),
    ("-x^2", 3.0, -9.0),
    ("WURZEL(x)", 4.0, 2.0),
    ("SQRT(x)*2", 9.0, 6.0),
    ("ABS(x-10)", 4.0, 6.0),
    ("SIGN(-x)", 4.0, -1.0),
    ("1,5*x", 2.0, 3.0),
    ("2.5E1-x", 5.0, 20.0),
    ("(x+1)*(x-1)", 5.0, 24.0),
    ("x--2", 1.0, 3.0),
    ("COS(0)+SIN(0)", 0.0, 1.0),
];

/// Formulas that must be rejected, with the expected code and position.
pub const REJECTED_FORMULAS: &[(&str, u8, usize)] = &[
    ("SIN x", 1, 4),
    ("SIN(x", 2, 5),
    ("3*q", 7, 2),
    ("", 6, 0),
    ("2+", 4, 2),
    ("x$1", 5, 1),
];

/// Test harness for parsing formulas and evaluating them.
pub struct TestHarness {
    pub formula: Formula,
}

impl TestHarness {
    /// Create a harness around a formula in `x`.
    pub fn new(text: &str) -> Self {
        TestHarness {
            formula: Formula::new(text),
        }
    }

    /// Create a harness around a formula in a custom variable.
    pub fn with_variable(text: &str, variable: &str) -> Self {
        let options = ParserOptions::new(variable).expect("valid variable name");
        TestHarness {
            formula: Formula::with_options(text, options),
        }
    }

    pub fn tree(&self) -> &Expression {
        self.formula.tree().expect("formula should parse")
    }

    pub fn eval(&self, x: f64) -> EvalResult {
        self.formula.evaluate(x)
    }

    pub fn value(&self, x: f64) -> f64 {
        self.eval(x).expect("evaluation should succeed")
    }

    pub fn error_code(&self) -> Option<u8> {
        self.formula.syntax_error().map(|e| e.code())
    }

    /// Parses the canonical rendering of the tree again.
    pub fn reparse(&self) -> Expression {
        let text = self.tree().to_string();
        parse(&text).unwrap_or_else(|e| panic!("rendering '{}' does not parse: {}", text, e))
    }
}

/// Evenly spaced sample points from `start`, `count` of them.
pub fn sample_points(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {}, got {}",
        expected,
        actual
    );
}
