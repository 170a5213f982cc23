//! FILENAME: core/parser/src/token.rs
//! PURPOSE: Token definitions for the formula lexer.
//! CONTEXT: Tokens are the atomic units produced by the lexer and consumed by the parser.
//! The token kinds fall into three bands: atomic operands (numbers, constants,
//! the variable), binary infix operators, and prefix functions. The bands and the
//! operator precedence are answered by explicit predicates below, never by the
//! declaration order of the variants.

use crate::ast::{BinaryOperator, Function};
use crate::constants::PhysicalConstant;

/// Binding strength of the binary operators, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Additive,
    Multiplicative,
    Power,
}

/// Tokens recognized by the formula lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Operands
    Number(f64),
    Constant(&'static PhysicalConstant),
    Variable,

    // Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Caret,

    // Delimiters
    LParen,
    RParen,

    // Prefix functions
    Function(Function),
    /// The `E^` digraph: exponential function whose argument is the next primary.
    ExpPower,

    // Special
    EOF,
    /// Character outside the formula alphabet.
    Illegal(char),
    /// Letters or a constant symbol that match nothing known.
    Unknown(String),
    /// Digits that do not form a valid number literal.
    Malformed(String),
}

impl Token {
    /// Numbers, constants and the variable.
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Constant(_) | Token::Variable)
    }

    /// Function keywords that take a bracketed argument (or the `E^` digraph).
    pub fn is_prefix_function(&self) -> bool {
        matches!(self, Token::Function(_) | Token::ExpPower)
    }

    /// True if a term may begin with this token.
    pub fn starts_term(&self) -> bool {
        self.is_operand() || self.is_prefix_function() || *self == Token::LParen
    }

    /// True for the lexer's error tokens.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Token::Illegal(_) | Token::Unknown(_) | Token::Malformed(_)
        )
    }

    /// The binary operator this token denotes, if any.
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            Token::Plus => Some(BinaryOperator::Add),
            Token::Minus => Some(BinaryOperator::Subtract),
            Token::Asterisk => Some(BinaryOperator::Multiply),
            Token::Slash => Some(BinaryOperator::Divide),
            Token::Caret => Some(BinaryOperator::Power),
            _ => None,
        }
    }

    /// Precedence of the token when used as an infix operator.
    pub fn precedence(&self) -> Option<Precedence> {
        self.binary_operator().map(BinaryOperator::precedence)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Constant(c) => write!(f, "#{}", c.symbol),
            Token::Variable => write!(f, "VARIABLE"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Asterisk => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Function(func) => write!(f, "{}", func),
            Token::ExpPower => write!(f, "E^"),
            Token::EOF => write!(f, "EOF"),
            Token::Illegal(c) => write!(f, "ILLEGAL({})", c),
            Token::Unknown(s) => write!(f, "UNKNOWN({})", s),
            Token::Malformed(s) => write!(f, "MALFORMED({})", s),
        }
    }
}
