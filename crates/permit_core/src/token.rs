//! Tokens and literal conversion.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// constant pattern, compiled by the conversion tests
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid digits pattern"));

/// A single token of rule text.
///
/// Tokens are plain scalars. Keywords (`and`, `or`) and brackets stay
/// [`Token::Str`]; the parser recognises them by text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    /// `True` or `False`
    Bool(bool),
    /// A run of decimal digits
    Int(i64),
    /// Anything else
    Str(String),
}

impl Token {
    /// Convert raw token text into a literal.
    ///
    /// `"True"`/`"False"` become booleans and digit runs become integers.
    /// Digit runs too large for an `i64` stay strings.
    #[must_use]
    pub fn convert(text: &str) -> Self {
        match text {
            "True" => Self::Bool(true),
            "False" => Self::Bool(false),
            _ if DIGITS.is_match(text) => text
                .parse()
                .map(Self::Int)
                .unwrap_or_else(|_| Self::Str(text.to_string())),
            _ => Self::Str(text.to_string()),
        }
    }

    /// Text of a string token, `None` for literals
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is the string token `text`
    #[must_use]
    pub fn is(&self, text: &str) -> bool {
        self.as_str() == Some(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self::convert(text)
    }
}
