//! FILENAME: core/engine/src/formula.rs
//! PURPOSE: A formula as a host sees it: source text plus its compiled tree.
//! CONTEXT: The tree is rebuilt whenever the text changes. A formula whose
//! text does not parse keeps its syntax error and evaluates to "no value"
//! until it is given valid text.

use formula_parser::{parse_with, Expression, ParserOptions, SyntaxError};

use crate::evaluator::{eval_to_sentinel, EvalError, EvalResult, Evaluator};
use crate::linearity;

#[derive(Debug, Clone)]
pub struct Formula {
    text: String,
    options: ParserOptions,
    compiled: Result<Expression, SyntaxError>,
}

impl Formula {
    /// Compiles `text` with the default variable `x`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_options(text, ParserOptions::default())
    }

    pub fn with_options(text: impl Into<String>, options: ParserOptions) -> Self {
        let text = text.into();
        let compiled = compile(&text, &options);
        Formula {
            text,
            options,
            compiled,
        }
    }

    /// Replaces the source text and rebuilds the tree. The previous tree is
    /// dropped even if the new text fails to parse.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.compiled = compile(&self.text, &self.options);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn tree(&self) -> Option<&Expression> {
        self.compiled.as_ref().ok()
    }

    pub fn syntax_error(&self) -> Option<SyntaxError> {
        self.compiled.as_ref().err().copied()
    }

    pub fn is_valid(&self) -> bool {
        self.compiled.is_ok()
    }

    /// Evaluates for a single value of the variable.
    pub fn evaluate(&self, x: f64) -> EvalResult {
        match self.tree() {
            Some(tree) => Evaluator::new(x).evaluate(tree),
            None => Err(EvalError::NoValue),
        }
    }

    /// Evaluates the formula at every sample of a data series, in order.
    /// Each point knows its index, so DELTA differences against the
    /// preceding sample.
    pub fn evaluate_series(&self, samples: &[f64]) -> Vec<EvalResult> {
        let tree = match self.tree() {
            Some(tree) => tree,
            None => return vec![Err(EvalError::NoValue); samples.len()],
        };

        crate::log_enter!("EVAL", "evaluate_series", "formula={} samples={}", self.text, samples.len());

        let results: Vec<EvalResult> = (0..samples.len())
            .map(|index| Evaluator::at_sample(samples, index).evaluate(tree))
            .collect();

        let failed = results
            .iter()
            .filter(|r| matches!(r, Err(EvalError::Calculation(_))))
            .count();
        let missing = results
            .iter()
            .filter(|r| matches!(r, Err(EvalError::NoValue)))
            .count();
        if failed > 0 {
            crate::log_warn!("EVAL", "{} of {} points failed to calculate for {}", failed, samples.len(), self.text);
        }

        crate::log_exit!("EVAL", "evaluate_series", "failed={} missing={}", failed, missing);
        results
    }

    /// False for a formula without a valid tree.
    pub fn is_linear(&self) -> bool {
        self.tree().map(linearity::is_linear).unwrap_or(false)
    }

    /// Adapter for consumers that only accept `f64 -> f64`: failures come back
    /// as `CALCULATION_ERROR_VALUE` or `NO_VALUE`.
    pub fn as_function(&self) -> impl Fn(f64) -> f64 + '_ {
        move |x| eval_to_sentinel(self.evaluate(x))
    }
}

fn compile(text: &str, options: &ParserOptions) -> Result<Expression, SyntaxError> {
    let compiled = parse_with(text, options);
    match &compiled {
        Ok(tree) => {
            crate::log_debug!("PARSE", "compiled '{}' ({} nodes, depth {})", text, tree.node_count(), tree.depth());
        }
        Err(e) => {
            crate::log_info!("PARSE", "'{}' rejected: code {} at {}", text, e.code(), e.position);
        }
    }
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{CalcErrorKind, CALCULATION_ERROR_VALUE, NO_VALUE};
    use formula_parser::SyntaxErrorKind;

    #[test]
    fn test_valid_formula() {
        let f = Formula::new("2*x+1");
        assert!(f.is_valid());
        assert_eq!(f.text(), "2*x+1");
        assert!(f.syntax_error().is_none());
        assert_eq!(f.evaluate(3.0), Ok(7.0));
        assert!(f.is_linear());
    }

    #[test]
    fn test_invalid_formula_keeps_error() {
        let f = Formula::new("3*q");
        assert!(!f.is_valid());
        assert!(f.tree().is_none());
        let err = f.syntax_error().unwrap();
        assert_eq!(err.kind, SyntaxErrorKind::UnknownIdentifier);
        assert_eq!(err.position, 2);
        assert_eq!(f.evaluate(1.0), Err(EvalError::NoValue));
        assert!(!f.is_linear());
    }

    #[test]
    fn test_set_text_rebuilds_tree() {
        let mut f = Formula::new("x^2");
        assert_eq!(f.evaluate(3.0), Ok(9.0));

        f.set_text("SIN(x");
        assert_eq!(f.syntax_error().map(|e| e.code()), Some(2));
        assert_eq!(f.evaluate(3.0), Err(EvalError::NoValue));

        f.set_text("x-1");
        assert!(f.is_valid());
        assert_eq!(f.evaluate(3.0), Ok(2.0));
    }

    #[test]
    fn test_custom_variable() {
        let options = ParserOptions::new("t").unwrap();
        let f = Formula::with_options("2*T", options);
        assert_eq!(f.evaluate(4.0), Ok(8.0));
        assert_eq!(f.options().variable_name, "t");

        let g = Formula::with_options("2*x", ParserOptions::new("t").unwrap());
        assert_eq!(g.syntax_error().map(|e| e.code()), Some(7));
    }

    #[test]
    fn test_series_with_delta() {
        let f = Formula::new("DELTA(x^2)");
        let results = f.evaluate_series(&[1.0, 2.0, 4.0]);
        assert_eq!(results, vec![Err(EvalError::NoValue), Ok(3.0), Ok(12.0)]);
    }

    #[test]
    fn test_series_keeps_per_point_failures() {
        let f = Formula::new("1/x");
        let results = f.evaluate_series(&[2.0, 0.0, 4.0]);
        assert_eq!(results[0], Ok(0.5));
        assert_eq!(results[1], Err(EvalError::Calculation(CalcErrorKind::DivisionByZero)));
        assert_eq!(results[2], Ok(0.25));
    }

    #[test]
    fn test_series_of_invalid_formula() {
        let f = Formula::new("");
        assert_eq!(f.evaluate_series(&[1.0, 2.0]), vec![Err(EvalError::NoValue); 2]);
        assert!(f.evaluate_series(&[]).is_empty());
    }

    #[test]
    fn test_as_function_uses_sentinels() {
        let f = Formula::new("LN(x)");
        let func = f.as_function();
        assert_eq!(func(1.0), 0.0);
        assert_eq!(func(-1.0), CALCULATION_ERROR_VALUE);

        let invalid = Formula::new("LN(");
        assert_eq!(invalid.as_function()(1.0), NO_VALUE);
    }
}
