//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the formula engine.
//! CONTEXT: Evaluates and classifies the trees built by `formula-parser`.
//! Re-exports public types and modules for use by other crates.

pub mod evaluator;
pub mod formula;
pub mod linearity;
pub mod logging;

// Re-export commonly used types at the crate root
pub use evaluator::{
    eval_to_sentinel, evaluate, evaluate_at, CalcErrorKind, EvalError, EvalResult, Evaluator,
    CALCULATION_ERROR_VALUE, NO_VALUE,
};
pub use formula::Formula;
pub use linearity::{contains_no_variable, is_linear};
pub use logging::LogError;
