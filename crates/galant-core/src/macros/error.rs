use std::fmt;

use thiserror::Error;

/// The single failure kind surfaced by macro expansion.
///
/// Every variant renders as `malformed macro: ...` so callers can show the
/// message to the user as-is. Expansion stops at the first error; there is
/// never partial output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacroError {
    #[error("malformed macro: {rule}: missing {delimiter}")]
    MissingDelimiter { rule: String, delimiter: String },

    #[error("malformed macro: illegal number of parameters for macro {rule}. Expected: {expected}; actual: {actual}")]
    Arity {
        rule: String,
        expected: Arity,
        actual: usize,
    },

    #[error("malformed macro: {rule}: curly braces required")]
    MissingBlock { rule: String },

    #[error("malformed macro: {rule}: {message}")]
    MalformedSyntax { rule: String, message: String },

    #[error("malformed macro: expansion exceeded {limit} rewrites (last rule applied: {rule})")]
    RewriteLimit { limit: usize, rule: String },
}

impl MacroError {
    pub fn missing_delimiter(rule: &str, unbalanced: Unbalanced) -> Self {
        Self::MissingDelimiter {
            rule: rule.to_string(),
            delimiter: unbalanced.expected,
        }
    }

    pub fn malformed(rule: &str, message: impl Into<String>) -> Self {
        Self::MalformedSyntax {
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    /// Name of the rule that raised this error
    pub fn rule(&self) -> &str {
        match self {
            Self::MissingDelimiter { rule, .. }
            | Self::Arity { rule, .. }
            | Self::MissingBlock { rule }
            | Self::MalformedSyntax { rule, .. }
            | Self::RewriteLimit { rule, .. } => rule,
        }
    }
}

/// Balance violation reported by the delimiter scanner before it is
/// attributed to a rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing {expected}")]
pub struct Unbalanced {
    pub expected: String,
}

impl Unbalanced {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

/// Accepted parameter counts of a parameterized rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None` accepts any number of parameters from `min` upwards.
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn any() -> Self {
        Self { min: 0, max: None }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Result type for macro expansion
pub type MacroResult<T> = std::result::Result<T, MacroError>;
