//! FILENAME: core/parser/src/error.rs
//! PURPOSE: Syntax errors reported by the parser.
//! CONTEXT: Every error carries a stable numeric code and the zero-based
//! character offset it was detected at. Hosts map the code (or the message key)
//! to localized text and place a marker under the offending character.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyntaxErrorKind {
    MissingOpeningBracket,
    MissingClosingBracket,
    MissingOperator,
    MissingTerm,
    IllegalCharacter,
    EmptyFormula,
    UnknownIdentifier,
    TooDeeplyNested,
}

impl SyntaxErrorKind {
    /// Stable error code. 0 is reserved for "no error" and never produced.
    pub fn code(self) -> u8 {
        match self {
            SyntaxErrorKind::MissingOpeningBracket => 1,
            SyntaxErrorKind::MissingClosingBracket => 2,
            SyntaxErrorKind::MissingOperator => 3,
            SyntaxErrorKind::MissingTerm => 4,
            SyntaxErrorKind::IllegalCharacter => 5,
            SyntaxErrorKind::EmptyFormula => 6,
            SyntaxErrorKind::UnknownIdentifier => 7,
            SyntaxErrorKind::TooDeeplyNested => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(SyntaxErrorKind::MissingOpeningBracket),
            2 => Some(SyntaxErrorKind::MissingClosingBracket),
            3 => Some(SyntaxErrorKind::MissingOperator),
            4 => Some(SyntaxErrorKind::MissingTerm),
            5 => Some(SyntaxErrorKind::IllegalCharacter),
            6 => Some(SyntaxErrorKind::EmptyFormula),
            7 => Some(SyntaxErrorKind::UnknownIdentifier),
            8 => Some(SyntaxErrorKind::TooDeeplyNested),
            _ => None,
        }
    }

    /// Localization key for the host's error-to-text table.
    pub fn message_key(self) -> &'static str {
        match self {
            SyntaxErrorKind::MissingOpeningBracket => "formula.error.missing_opening_bracket",
            SyntaxErrorKind::MissingClosingBracket => "formula.error.missing_closing_bracket",
            SyntaxErrorKind::MissingOperator => "formula.error.missing_operator",
            SyntaxErrorKind::MissingTerm => "formula.error.missing_term",
            SyntaxErrorKind::IllegalCharacter => "formula.error.illegal_character",
            SyntaxErrorKind::EmptyFormula => "formula.error.empty_formula",
            SyntaxErrorKind::UnknownIdentifier => "formula.error.unknown_identifier",
            SyntaxErrorKind::TooDeeplyNested => "formula.error.too_deeply_nested",
        }
    }
}

impl std::fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SyntaxErrorKind::MissingOpeningBracket => "missing opening bracket",
            SyntaxErrorKind::MissingClosingBracket => "missing closing bracket",
            SyntaxErrorKind::MissingOperator => "missing operator",
            SyntaxErrorKind::MissingTerm => "missing term",
            SyntaxErrorKind::IllegalCharacter => "illegal character",
            SyntaxErrorKind::EmptyFormula => "no formula defined",
            SyntaxErrorKind::UnknownIdentifier => "unknown identifier",
            SyntaxErrorKind::TooDeeplyNested => "formula nested too deeply",
        };
        f.write_str(text)
    }
}

/// A failed parse: what went wrong and where.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("Syntax error {code} at position {position}: {kind}", code = .kind.code())]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Zero-based character offset into the formula text.
    pub position: usize,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, position: usize) -> Self {
        SyntaxError { kind, position }
    }

    pub fn code(&self) -> u8 {
        self.kind.code()
    }
}

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Invalid parser options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("Variable name must be non-empty and consist of ASCII letters: {0:?}")]
    InvalidVariableName(String),

    #[error("Variable name collides with a reserved word: {0}")]
    ReservedVariableName(String),

    #[error("Depth limits must be at least 1")]
    ZeroDepth,
}
