//! FILENAME: core/parser/src/options.rs
//! PURPOSE: Parser configuration: the free variable's name and the nesting bounds.
//! CONTEXT: Hosts may persist these settings (serde) and hand them to
//! `parse_with`. Options are validated on construction, and deserialization
//! goes through the same `validate` so a stored file cannot bypass it.

use serde::{Deserialize, Serialize};

use crate::ast::Function;
use crate::error::OptionsError;

pub const DEFAULT_VARIABLE_NAME: &str = "x";

/// Bound on bracket, function and `E^` nesting.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Bound on the depth of the built tree. Long operator chains nest the tree
/// without nesting the text, so this is far larger than `DEFAULT_MAX_DEPTH`.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 1000;

/// Bound on DELTA inside DELTA. Each level evaluates its argument at two
/// samples, so the cost doubles per level.
pub const MAX_DELTA_NESTING: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredParserOptions")]
pub struct ParserOptions {
    /// Name of the free variable, matched case-insensitively.
    pub variable_name: String,
    pub max_depth: usize,
    pub max_tree_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            variable_name: DEFAULT_VARIABLE_NAME.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }
}

impl ParserOptions {
    pub fn new(variable_name: impl Into<String>) -> Result<Self, OptionsError> {
        let options = ParserOptions {
            variable_name: variable_name.into(),
            ..ParserOptions::default()
        };
        options.validate()?;
        Ok(options)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Result<Self, OptionsError> {
        self.max_depth = max_depth;
        self.validate()?;
        Ok(self)
    }

    pub fn with_max_tree_depth(mut self, max_tree_depth: usize) -> Result<Self, OptionsError> {
        self.max_tree_depth = max_tree_depth;
        self.validate()?;
        Ok(self)
    }

    /// Checks that the variable name can actually be lexed as the variable:
    /// letters only, and not shadowed by PI, E or a function keyword.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let name = &self.variable_name;
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(OptionsError::InvalidVariableName(name.clone()));
        }

        let upper = name.to_uppercase();
        if upper == "PI" || upper == "E" || Function::from_keyword(&upper).is_some() {
            return Err(OptionsError::ReservedVariableName(name.clone()));
        }

        if self.max_depth == 0 || self.max_tree_depth == 0 {
            return Err(OptionsError::ZeroDepth);
        }

        Ok(())
    }
}

/// Unvalidated shape of `ParserOptions` as it appears in a settings file.
#[derive(Deserialize)]
#[serde(default)]
struct StoredParserOptions {
    variable_name: String,
    max_depth: usize,
    max_tree_depth: usize,
}

impl Default for StoredParserOptions {
    fn default() -> Self {
        let defaults = ParserOptions::default();
        StoredParserOptions {
            variable_name: defaults.variable_name,
            max_depth: defaults.max_depth,
            max_tree_depth: defaults.max_tree_depth,
        }
    }
}

impl TryFrom<StoredParserOptions> for ParserOptions {
    type Error = OptionsError;

    fn try_from(stored: StoredParserOptions) -> Result<Self, Self::Error> {
        let options = ParserOptions {
            variable_name: stored.variable_name,
            max_depth: stored.max_depth,
            max_tree_depth: stored.max_tree_depth,
        };
        options.validate()?;
        Ok(options)
    }
}
