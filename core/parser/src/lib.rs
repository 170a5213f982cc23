//! FILENAME: core/parser/src/lib.rs
//! PURPOSE: Library root for the physics formula parser.
//! CONTEXT: This module exposes the lexer, parser, and AST components
//! needed to convert formula strings in one free variable into expression trees.
//!
//! PIPELINE: Formula String --> Lexer --> Tokens --> Parser --> AST --> Evaluator
//!
//! SUPPORTED FEATURES:
//! - Arithmetic: +, -, *, /, ^ (power, left-associative)
//! - Leading signs: -x, --x, x - -2
//! - Numbers with `.` or `,` as decimal separator and E exponents: 1,5E-3
//! - PI and E literals, and `E^` as the exponential function
//! - Physical constants: #c, #h, #eps_0, ...
//! - Functions: SIN, COS, TAN, COTAN, EXP, LN, WURZEL/SQRT, SIGN, ABS, DELTA
//! - One free variable, `x` unless configured otherwise

pub mod ast;
pub mod constants;
pub mod error;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod token;


// Re-export commonly used types for convenience
pub use ast::{BinaryOperator, Expression, FormulaText, Function};
pub use constants::{lookup_constant, PhysicalConstant, CONSTANTS, CONSTANT_MARKER};
pub use error::{OptionsError, ParseResult, SyntaxError, SyntaxErrorKind};
pub use lexer::Lexer;
pub use options::ParserOptions;
pub use parser::{parse, parse_with, Parser};
pub use token::{Precedence, Token};
