//! FILENAME: core/engine/src/evaluator.rs
//! PURPOSE: Evaluates a parsed formula tree for a value of its free variable.
//! CONTEXT: After a formula is parsed into an AST, this module traverses
//! the tree and computes the final result. Failures are values, never panics:
//! a calculation error (division by zero, logarithm of a non-positive number,
//! ...) is kept distinct from "no value", which is what DELTA yields when there
//! is no previous sample to difference against.
//!
//! EVALUATION ORDER: the right operand is evaluated before the left one and
//! the first failure wins; nothing is computed after it.
//!
//! POWER: integral exponents that fit an i16 use exponentiation by squaring,
//! so negative bases work with whole exponents. Any other exponent goes through
//! exp(e * ln(b)) and therefore needs a positive base (a zero base yields 0 for
//! positive exponents).

use formula_parser::{BinaryOperator, Expression, Function};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stand-in for a calculation error where a plain `f64` is required.
pub const CALCULATION_ERROR_VALUE: f64 = f64::MAX;

/// Stand-in for "no value" where a plain `f64` is required.
pub const NO_VALUE: f64 = f64::MIN;

/// Why a calculation failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalcErrorKind {
    #[error("division by zero")]
    DivisionByZero,

    #[error("zero raised to a negative power")]
    ZeroToNegativePower,

    #[error("negative base with a non-integer exponent")]
    NegativeBaseNonIntegerExponent,

    #[error("tangent undefined where the cosine is zero")]
    TanUndefined,

    #[error("cotangent undefined where the sine is zero")]
    CotanUndefined,

    #[error("logarithm of a non-positive number")]
    LogOfNonPositive,

    #[error("square root of a negative number")]
    SqrtOfNegative,

    #[error("result out of floating-point range")]
    Overflow,

    #[error("variable value is not a finite number")]
    NonFiniteInput,
}

/// The two failure categories of an evaluation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalError {
    #[error("Calculation error: {0}")]
    Calculation(CalcErrorKind),

    #[error("No value")]
    NoValue,
}

impl EvalError {
    pub fn to_sentinel(self) -> f64 {
        match self {
            EvalError::Calculation(_) => CALCULATION_ERROR_VALUE,
            EvalError::NoValue => NO_VALUE,
        }
    }
}

impl From<CalcErrorKind> for EvalError {
    fn from(kind: CalcErrorKind) -> Self {
        EvalError::Calculation(kind)
    }
}

/// The result of evaluating an expression. A successful value is always finite.
pub type EvalResult = Result<f64, EvalError>;

/// Collapses a result to a plain `f64`, using the sentinel values for failures.
pub fn eval_to_sentinel(result: EvalResult) -> f64 {
    match result {
        Ok(value) => value,
        Err(e) => e.to_sentinel(),
    }
}

fn finite(value: f64) -> EvalResult {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcErrorKind::Overflow.into())
    }
}

/// The formula evaluator.
/// Holds the variable value and, when evaluating along a data series, the
/// sample index of that value and the series itself (needed by DELTA).
/// The value is `None` for an index past the end of the series.
/// It owns no mutable state, so one tree can be evaluated from many
/// evaluators at once.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    x: Option<f64>,
    sample_index: Option<usize>,
    samples: &'a [f64],
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator for a single value, outside any data series.
    pub fn new(x: f64) -> Self {
        Evaluator {
            x: Some(x),
            sample_index: None,
            samples: &[],
        }
    }

    /// Creates an evaluator for `samples[index]`.
    pub fn at_sample(samples: &'a [f64], index: usize) -> Self {
        Evaluator {
            x: samples.get(index).copied(),
            sample_index: Some(index),
            samples,
        }
    }

    /// Creates an evaluator from the raw calling convention: a variable value,
    /// a sample index that is negative outside a series, and the series.
    pub fn with_sample_index(x: f64, sample_index: i32, samples: &'a [f64]) -> Self {
        Evaluator {
            x: Some(x),
            sample_index: usize::try_from(sample_index).ok(),
            samples,
        }
    }

    pub fn x(&self) -> Option<f64> {
        self.x
    }

    pub fn sample_index(&self) -> Option<usize> {
        self.sample_index
    }

    /// Evaluates an AST expression and returns the result.
    pub fn evaluate(&self, expr: &Expression) -> EvalResult {
        match expr {
            Expression::Number(n) => Ok(*n),
            Expression::Constant { value, .. } => Ok(*value),
            Expression::Variable => match self.x {
                Some(x) if x.is_finite() => Ok(x),
                Some(_) => Err(CalcErrorKind::NonFiniteInput.into()),
                None => Err(EvalError::NoValue),
            },
            Expression::BinaryOp { left, op, right } => self.eval_binary_op(left, *op, right),
            Expression::Function { func, arg } => self.eval_function(*func, arg),
        }
    }

    /// Evaluates a binary operation, right operand first.
    fn eval_binary_op(
        &self,
        left: &Expression,
        op: BinaryOperator,
        right: &Expression,
    ) -> EvalResult {
        let r = self.evaluate(right)?;
        let l = self.evaluate(left)?;

        match op {
            BinaryOperator::Add => finite(l + r),
            BinaryOperator::Subtract => finite(l - r),
            BinaryOperator::Multiply => finite(l * r),
            BinaryOperator::Divide => {
                if r == 0.0 {
                    Err(CalcErrorKind::DivisionByZero.into())
                } else {
                    finite(l / r)
                }
            }
            BinaryOperator::Power => eval_power(l, r),
        }
    }

    fn eval_function(&self, func: Function, arg: &Expression) -> EvalResult {
        let argument = || self.evaluate(arg);

        match func {
            Function::Delta => self.eval_delta(arg),
            Function::Sin => Ok(argument()?.sin()),
            Function::Cos => Ok(argument()?.cos()),
            Function::Tan => {
                let a = argument()?;
                let c = a.cos();
                if c == 0.0 {
                    return Err(CalcErrorKind::TanUndefined.into());
                }
                finite(a.sin() / c)
            }
            Function::Cotan => {
                let a = argument()?;
                let s = a.sin();
                if s == 0.0 {
                    return Err(CalcErrorKind::CotanUndefined.into());
                }
                finite(a.cos() / s)
            }
            Function::Exp => finite(argument()?.exp()),
            Function::Ln => {
                let a = argument()?;
                if a <= 0.0 {
                    return Err(CalcErrorKind::LogOfNonPositive.into());
                }
                Ok(a.ln())
            }
            Function::Sqrt => {
                let a = argument()?;
                if a < 0.0 {
                    return Err(CalcErrorKind::SqrtOfNegative.into());
                }
                Ok(a.sqrt())
            }
            Function::Sign => {
                let a = argument()?;
                Ok(if a > 0.0 {
                    1.0
                } else if a < 0.0 {
                    -1.0
                } else {
                    0.0
                })
            }
            Function::Abs => Ok(argument()?.abs()),
        }
    }

    /// DELTA(f) = f(samples[n]) - f(samples[n-1]) for the current sample n.
    /// Without a previous sample there is nothing to difference: no value.
    fn eval_delta(&self, arg: &Expression) -> EvalResult {
        let index = match self.sample_index {
            Some(index) if index > 0 => index,
            _ => return Err(EvalError::NoValue),
        };
        let previous_x = match self.samples.get(index - 1) {
            Some(value) => *value,
            None => return Err(EvalError::NoValue),
        };

        let current = self.evaluate(arg)?;
        let previous = Evaluator {
            x: Some(previous_x),
            sample_index: Some(index - 1),
            samples: self.samples,
        }
        .evaluate(arg)?;

        finite(current - previous)
    }
}

fn eval_power(base: f64, exponent: f64) -> EvalResult {
    let rounded = exponent.round();
    if rounded == exponent && rounded >= f64::from(i16::MIN) && rounded <= f64::from(i16::MAX) {
        return integer_power(base, rounded as i16);
    }

    if base > 0.0 {
        finite((exponent * base.ln()).exp())
    } else if base == 0.0 {
        if exponent > 0.0 {
            Ok(0.0)
        } else {
            Err(CalcErrorKind::ZeroToNegativePower.into())
        }
    } else {
        Err(CalcErrorKind::NegativeBaseNonIntegerExponent.into())
    }
}

/// Exponentiation by squaring. 0^0 is 1.
fn integer_power(base: f64, exponent: i16) -> EvalResult {
    if exponent < 0 && base == 0.0 {
        return Err(CalcErrorKind::ZeroToNegativePower.into());
    }

    let mut result = 1.0;
    let mut factor = base;
    let mut remaining = exponent.unsigned_abs();
    while remaining > 0 {
        if remaining & 1 == 1 {
            result *= factor;
        }
        factor *= factor;
        remaining >>= 1;
    }

    if exponent < 0 {
        result = 1.0 / result;
    }
    finite(result)
}

/// Evaluates `expr` for a single value of the free variable.
pub fn evaluate(expr: &Expression, x: f64) -> EvalResult {
    Evaluator::new(x).evaluate(expr)
}

/// Evaluates `expr` at `x`, which is sample number `sample_index` of
/// `samples`. A negative index means the value is not part of a series.
/// Only DELTA looks at the index and the series.
pub fn evaluate_at(expr: &Expression, x: f64, sample_index: i32, samples: &[f64]) -> EvalResult {
    Evaluator::with_sample_index(x, sample_index, samples).evaluate(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula_parser::parse;

    fn eval(formula: &str, x: f64) -> EvalResult {
        evaluate(&parse(formula).unwrap(), x)
    }

    fn calc_error(kind: CalcErrorKind) -> EvalResult {
        Err(EvalError::Calculation(kind))
    }

    #[test]
    fn test_literal_and_variable() {
        assert_eq!(eval("42", 0.0), Ok(42.0));
        assert_eq!(eval("x", 3.5), Ok(3.5));
        assert_eq!(eval("#c", 0.0), Ok(299_792_458.0));
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4", 0.0), Ok(14.0));
        assert_eq!(eval("(2+3)*4", 0.0), Ok(20.0));
        assert_eq!(eval("8-4-2", 0.0), Ok(2.0));
        assert_eq!(eval("8/4/2", 0.0), Ok(1.0));
    }

    #[test]
    fn test_power_chain_is_left_associative() {
        assert_eq!(eval("2^3^2", 0.0), Ok(64.0));
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        assert_eq!(eval("-x^2", 3.0), Ok(-9.0));
        assert_eq!(eval("(-x)^2", 3.0), Ok(9.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("1/x", 0.0), calc_error(CalcErrorKind::DivisionByZero));
        assert_eq!(eval("1/x", 4.0), Ok(0.25));
    }

    #[test]
    fn test_integer_powers() {
        assert_eq!(eval("x^3", -2.0), Ok(-8.0));
        assert_eq!(eval("x^(-2)", 2.0), Ok(0.25));
        assert_eq!(eval("x^0", 0.0), Ok(1.0));
        assert_eq!(eval("x^(0-1)", 0.0), calc_error(CalcErrorKind::ZeroToNegativePower));
        assert_eq!(eval("x^2,0", -3.0), Ok(9.0));
    }

    #[test]
    fn test_fractional_powers() {
        let root = eval("x^0,5", 4.0).unwrap();
        assert!((root - 2.0).abs() < 1e-12);
        assert_eq!(eval("x^0,5", 0.0), Ok(0.0));
        assert_eq!(
            eval("x^(0-0,5)", 0.0),
            calc_error(CalcErrorKind::ZeroToNegativePower)
        );
        assert_eq!(
            eval("x^0,5", -4.0),
            calc_error(CalcErrorKind::NegativeBaseNonIntegerExponent)
        );
    }

    #[test]
    fn test_huge_exponent_leaves_integer_branch() {
        // 40000 does not fit an i16, so the logarithmic branch applies
        assert_eq!(eval("x^40000", 1.0), Ok(1.0));
        assert_eq!(
            eval("x^40000", -1.0),
            calc_error(CalcErrorKind::NegativeBaseNonIntegerExponent)
        );
    }

    #[test]
    fn test_overflow_is_a_calculation_error() {
        assert_eq!(eval("10^400", 0.0), calc_error(CalcErrorKind::Overflow));
        assert_eq!(eval("EXP(x)", 1000.0), calc_error(CalcErrorKind::Overflow));
        assert_eq!(eval("10^(0-400)", 0.0), Ok(0.0));
    }

    #[test]
    fn test_trigonometry() {
        assert_eq!(eval("SIN(x)", 0.0), Ok(0.0));
        assert_eq!(eval("COS(x)", 0.0), Ok(1.0));
        assert_eq!(eval("TAN(x)", 0.0), Ok(0.0));
        assert_eq!(eval("COTAN(x)", 0.0), calc_error(CalcErrorKind::CotanUndefined));

        let cotan = eval("COTAN(x)", std::f64::consts::FRAC_PI_4).unwrap();
        assert!((cotan - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_logarithm_and_root_domains() {
        assert_eq!(eval("LN(x)", 1.0), Ok(0.0));
        assert_eq!(eval("LN(x)", 0.0), calc_error(CalcErrorKind::LogOfNonPositive));
        assert_eq!(eval("LN(x)", -1.0), calc_error(CalcErrorKind::LogOfNonPositive));

        assert_eq!(eval("WURZEL(x)", 4.0), Ok(2.0));
        assert_eq!(eval("WURZEL(x)", 0.0), Ok(0.0));
        assert_eq!(eval("WURZEL(x)", -1.0), calc_error(CalcErrorKind::SqrtOfNegative));
    }

    #[test]
    fn test_sign_abs_exp() {
        assert_eq!(eval("SIGN(x)", -3.0), Ok(-1.0));
        assert_eq!(eval("SIGN(x)", 0.0), Ok(0.0));
        assert_eq!(eval("SIGN(x)", 0.1), Ok(1.0));
        assert_eq!(eval("ABS(x)", -2.5), Ok(2.5));
        assert_eq!(eval("EXP(x)", 0.0), Ok(1.0));
        let e = eval("E^x", 1.0).unwrap();
        assert!((e - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_first_error_wins_right_operand_first() {
        // Both operands fail; the right one is evaluated first
        assert_eq!(
            eval("LN(x)+WURZEL(x)", -1.0),
            calc_error(CalcErrorKind::SqrtOfNegative)
        );
        assert_eq!(
            eval("1/(x-1)*LN(x-1)", 1.0),
            calc_error(CalcErrorKind::LogOfNonPositive)
        );
    }

    #[test]
    fn test_non_finite_input() {
        assert_eq!(eval("x", f64::NAN), calc_error(CalcErrorKind::NonFiniteInput));
        assert_eq!(eval("2", f64::INFINITY), Ok(2.0));
    }

    #[test]
    fn test_delta_without_series_has_no_value() {
        assert_eq!(eval("DELTA(x)", 1.0), Err(EvalError::NoValue));

        let tree = parse("DELTA(x^2)").unwrap();
        let samples = [1.0, 2.0, 4.0];
        assert_eq!(evaluate_at(&tree, 1.0, 0, &samples), Err(EvalError::NoValue));
        assert_eq!(evaluate_at(&tree, 1.0, -1, &samples), Err(EvalError::NoValue));
    }

    #[test]
    fn test_delta_differences_consecutive_samples() {
        let tree = parse("DELTA(x^2)").unwrap();
        let samples = [1.0, 2.0, 4.0];

        assert_eq!(Evaluator::at_sample(&samples, 1).evaluate(&tree), Ok(3.0));
        assert_eq!(Evaluator::at_sample(&samples, 2).evaluate(&tree), Ok(12.0));
        assert_eq!(evaluate_at(&tree, 4.0, 2, &samples), Ok(12.0));
        // Index past the series: no previous sample to look up
        assert_eq!(evaluate_at(&tree, 4.0, 9, &samples), Err(EvalError::NoValue));
    }

    #[test]
    fn test_delta_inside_other_functions() {
        let tree = parse("ABS(DELTA(x^2))+SIN(DELTA(x)+2)").unwrap();
        let samples = [3.0, 1.0];
        assert_eq!(Evaluator::at_sample(&samples, 1).evaluate(&tree), Ok(8.0));
        assert_eq!(
            Evaluator::at_sample(&samples, 0).evaluate(&tree),
            Err(EvalError::NoValue)
        );
    }

    #[test]
    fn test_sample_index_out_of_range_has_no_value() {
        let tree = parse("x").unwrap();
        assert_eq!(Evaluator::at_sample(&[], 0).evaluate(&tree), Err(EvalError::NoValue));
        assert_eq!(Evaluator::at_sample(&[1.0, 2.0], 2).evaluate(&tree), Err(EvalError::NoValue));
        assert_eq!(Evaluator::new(1.5).x(), Some(1.5));
    }

    #[test]
    fn test_no_value_propagates_like_an_error() {
        let tree = parse("x + DELTA(x)").unwrap();
        assert_eq!(evaluate_at(&tree, 1.0, 0, &[1.0]), Err(EvalError::NoValue));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let tree = parse("3*x^2-#G*x+SIN(x)").unwrap();
        for x in [-2.0, 0.0, 0.5, 7.0] {
            assert_eq!(evaluate(&tree, x), evaluate(&tree, x));
        }
    }

    #[test]
    fn test_sentinels_keep_categories_apart() {
        assert_eq!(eval_to_sentinel(Ok(1.5)), 1.5);
        assert_eq!(
            eval_to_sentinel(Err(EvalError::Calculation(CalcErrorKind::DivisionByZero))),
            CALCULATION_ERROR_VALUE
        );
        assert_eq!(eval_to_sentinel(Err(EvalError::NoValue)), NO_VALUE);
        assert_ne!(CALCULATION_ERROR_VALUE, NO_VALUE);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            EvalError::Calculation(CalcErrorKind::DivisionByZero).to_string(),
            "Calculation error: division by zero"
        );
        assert_eq!(EvalError::NoValue.to_string(), "No value");
    }

    #[test]
    fn test_eval_error_serialization() {
        let error = EvalError::Calculation(CalcErrorKind::LogOfNonPositive);
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"Calculation":"LogOfNonPositive"}"#);
        assert_eq!(serde_json::from_str::<EvalError>(&json).unwrap(), error);
        assert_eq!(serde_json::to_string(&EvalError::NoValue).unwrap(), r#""NoValue""#);
    }
}
