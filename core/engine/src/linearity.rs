//! FILENAME: core/engine/src/linearity.rs
//! PURPOSE: Decides structurally whether a formula is affine in its variable.
//! CONTEXT: Used by hosts to pick a linear fit over a general one. Nothing is
//! evaluated: the answer depends only on the shape of the tree.
//!
//! A power is only accepted when neither side contains the variable, so
//! `x^1` is reported as non-linear.

use formula_parser::{BinaryOperator, Expression};

/// Returns true if the variable occurs nowhere in `expr`.
pub fn contains_no_variable(expr: &Expression) -> bool {
    match expr {
        Expression::Variable => false,
        Expression::Number(_) | Expression::Constant { .. } => true,
        Expression::BinaryOp { left, right, .. } => {
            contains_no_variable(left) && contains_no_variable(right)
        }
        Expression::Function { arg, .. } => contains_no_variable(arg),
    }
}

/// Returns true if `expr` has the form `a*x + b` for variable-free `a`, `b`.
pub fn is_linear(expr: &Expression) -> bool {
    match expr {
        Expression::Number(_) | Expression::Constant { .. } | Expression::Variable => true,
        Expression::Function { arg, .. } => contains_no_variable(arg),
        Expression::BinaryOp { left, op, right } => match op {
            BinaryOperator::Add | BinaryOperator::Subtract => is_linear(left) && is_linear(right),
            BinaryOperator::Multiply => {
                (contains_no_variable(left) && is_linear(right))
                    || (contains_no_variable(right) && is_linear(left))
            }
            BinaryOperator::Divide => is_linear(left) && contains_no_variable(right),
            BinaryOperator::Power => contains_no_variable(left) && contains_no_variable(right),
        },
    }
}
