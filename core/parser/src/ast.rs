//! FILENAME: core/parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for formula expressions.
//! CONTEXT: After the Lexer tokenizes a formula string, the Parser converts
//! those tokens into this tree structure. The Evaluator then traverses
//! this tree to compute the final result, and the linearity classifier
//! inspects its shape.
//!
//! SUPPORTED EXPRESSIONS:
//! - Literals: numbers (including PI and E)
//! - Physical constants: #c, #eps_0, ...
//! - The single free variable (default `x`)
//! - Binary operations: +, -, *, /, ^
//! - Functions: SIN, COS, TAN, COTAN, EXP, LN, WURZEL, SIGN, ABS, DELTA
//!
//! Unary negation has no node of its own: the parser folds it into a
//! multiplication by -1 or into the literal.

use serde::{Deserialize, Serialize};

use crate::token::Precedence;

/// Represents a parsed formula expression.
/// The tree is built once by the parser and only read afterwards.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    /// A numeric literal.
    Number(f64),

    /// A physical constant, resolved to its value at parse time.
    /// The symbol is kept so the tree can be rendered back to text.
    Constant { symbol: &'static str, value: f64 },

    /// The free variable.
    Variable,

    /// A binary operation: left op right.
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    /// A prefix function applied to one argument.
    Function { func: Function, arg: Box<Expression> },
}

impl Expression {
    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn function(func: Function, arg: Expression) -> Self {
        Expression::Function {
            func,
            arg: Box::new(arg),
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Expression::Number(_) | Expression::Constant { .. } | Expression::Variable => 1,
            Expression::BinaryOp { left, right, .. } => 1 + left.node_count() + right.node_count(),
            Expression::Function { arg, .. } => 1 + arg.node_count(),
        }
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Expression::Number(_) | Expression::Constant { .. } | Expression::Variable => 1,
            Expression::BinaryOp { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expression::Function { arg, .. } => 1 + arg.depth(),
        }
    }
}

/// Binary operators for expressions.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /
    Power,    // ^
}

impl BinaryOperator {
    pub fn precedence(self) -> Precedence {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => Precedence::Additive,
            BinaryOperator::Multiply | BinaryOperator::Divide => Precedence::Multiplicative,
            BinaryOperator::Power => Precedence::Power,
        }
    }
}

/// Prefix functions. Each takes exactly one argument.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Cotan,
    Exp,
    Ln,
    Sqrt,
    Sign,
    Abs,
    Delta,
}

impl Function {
    /// Resolves a keyword (case-insensitive). `WURZEL` and `SQRT` both name the square root.
    pub fn from_keyword(word: &str) -> Option<Function> {
        match word.to_uppercase().as_str() {
            "SIN" => Some(Function::Sin),
            "COS" => Some(Function::Cos),
            "TAN" => Some(Function::Tan),
            "COTAN" => Some(Function::Cotan),
            "EXP" => Some(Function::Exp),
            "LN" => Some(Function::Ln),
            "WURZEL" | "SQRT" => Some(Function::Sqrt),
            "SIGN" => Some(Function::Sign),
            "ABS" => Some(Function::Abs),
            "DELTA" => Some(Function::Delta),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Function::Sin => "SIN",
            Function::Cos => "COS",
            Function::Tan => "TAN",
            Function::Cotan => "COTAN",
            Function::Exp => "EXP",
            Function::Ln => "LN",
            Function::Sqrt => "WURZEL",
            Function::Sign => "SIGN",
            Function::Abs => "ABS",
            Function::Delta => "DELTA",
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Subtract => write!(f, "-"),
            BinaryOperator::Multiply => write!(f, "*"),
            BinaryOperator::Divide => write!(f, "/"),
            BinaryOperator::Power => write!(f, "^"),
        }
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Formula text for a tree, using a given name for the free variable.
pub struct FormulaText<'a> {
    expr: &'a Expression,
    variable_name: &'a str,
}

impl Expression {
    /// Renders the tree as formula text that parses back to an equivalent tree.
    /// Every binary operation is bracketed, so the output does not depend on
    /// precedence or associativity rules.
    pub fn to_formula<'a>(&'a self, variable_name: &'a str) -> FormulaText<'a> {
        FormulaText {
            expr: self,
            variable_name,
        }
    }
}

impl std::fmt::Display for FormulaText<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.expr {
            Expression::Number(n) if n.is_sign_negative() => write!(f, "(-{})", -n),
            Expression::Number(n) => write!(f, "{}", n),
            Expression::Constant { symbol, .. } => write!(f, "#{}", symbol),
            Expression::Variable => f.write_str(self.variable_name),
            Expression::BinaryOp { left, op, right } => write!(
                f,
                "({}{}{})",
                left.to_formula(self.variable_name),
                op,
                right.to_formula(self.variable_name)
            ),
            Expression::Function { func, arg } => {
                write!(f, "{}({})", func, arg.to_formula(self.variable_name))
            }
        }
    }
}

/// Renders with the default variable name `x`.
impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_formula("x").fmt(f)
    }
}
