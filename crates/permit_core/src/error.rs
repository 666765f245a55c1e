//! Error types for PERMIT.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for parsing and evaluating rules
pub type PermitResult<T> = Result<T, PermitError>;

/// Which way a bracket sequence is unbalanced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BracketKind {
    /// A `)` with no matching `(`
    TooManyClose,
    /// A `(` that is never closed
    MissingClose,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyClose => write!(f, "too many closing brackets"),
            Self::MissingClose => write!(f, "missing closing bracket"),
        }
    }
}

/// Which bound of an operation's arity was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArityKind {
    /// Fewer arguments than the operation requires
    TooFew,
    /// More arguments than the operation accepts
    TooMany,
}

impl fmt::Display for ArityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFew => write!(f, "too few"),
            Self::TooMany => write!(f, "too many"),
        }
    }
}

/// Error raised while parsing or evaluating a rule.
///
/// Every variant aborts the whole evaluation; there are no partial results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermitError {
    /// Brackets in the rule text do not balance
    #[error("Unbalanced brackets: {kind}")]
    UnbalancedBracket {
        /// Direction of the imbalance
        kind: BracketKind,
    },

    /// A receiver name has no entry in the binding
    #[error("Object \"{name}\" not found in the binding")]
    UnknownBinding {
        /// The unbound name
        name: String,
    },

    /// The bound receiver does not expose the named operation
    #[error("Object \"{receiver}\" has no operation \"{operation}\"")]
    UnsupportedOperation {
        /// Receiver name as written in the rule
        receiver: String,
        /// Operation name as written in the rule
        operation: String,
    },

    /// The call passed a number of arguments outside the operation's arity
    #[error("{kind} parameters for operation \"{operation}\" on \"{receiver}\"")]
    Arity {
        /// Receiver name as written in the rule
        receiver: String,
        /// Operation name as written in the rule
        operation: String,
        /// Which bound was violated
        kind: ArityKind,
    },

    /// The operation itself reported a failure
    #[error("Operation \"{operation}\" on \"{receiver}\" failed: {message}")]
    OperationFailed {
        /// Receiver name as written in the rule
        receiver: String,
        /// Operation name as written in the rule
        operation: String,
        /// Failure reported by the receiver
        message: String,
    },

    /// A boolean operator ran with fewer than two values on the stack
    #[error("Missing expression for boolean operator")]
    MissingOperand,
}

impl PermitError {
    /// Whether the error comes from the structure of the rule text rather
    /// than from the binding it was evaluated against
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::UnbalancedBracket { .. } | Self::MissingOperand)
    }
}
