//! Runtime values held by bindings and passed to operations.

use crate::capability::Receiver;
use crate::token::Token;
use std::fmt;
use std::sync::Arc;

/// A value bound to a name for one evaluation
#[derive(Clone)]
pub enum Value {
    /// Placeholder for an object that could not be resolved
    Absent,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// String
    Str(String),
    /// Capability-bearing object
    Object(Arc<dyn Receiver>),
}

impl Value {
    /// Wrap a receiver
    #[must_use]
    pub fn object<R: Receiver + 'static>(receiver: R) -> Self {
        Self::Object(Arc::new(receiver))
    }

    /// Truthiness used to decide whether a receiver is present.
    ///
    /// `Absent`, `false`, `0` and the empty string are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Absent => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Str(s) => !s.is_empty(),
            Self::Object(_) => true,
        }
    }

    /// Whether this is exactly boolean `true`
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// The receiver, if this value carries one
    #[must_use]
    pub fn as_receiver(&self) -> Option<&dyn Receiver> {
        match self {
            Self::Object(r) => Some(r.as_ref()),
            _ => None,
        }
    }

    /// Borrow the concrete receiver type behind an object value
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_receiver()?.as_any().downcast_ref::<T>()
    }

    /// String contents, if this is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Absent => "Absent",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Str(_) => "Str",
            Self::Object(_) => "Object",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "Absent"),
            Self::Bool(b) => write!(f, "Bool({:?})", b),
            Self::Int(n) => write!(f, "Int({:?})", n),
            Self::Str(s) => write!(f, "Str({:?})", s),
            Self::Object(r) => write!(f, "Object({})", r.label()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "{}", s),
            Self::Object(r) => write!(f, "{}", r.label()),
        }
    }
}

/// Objects compare by identity, everything else by value
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Absent, Self::Absent) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Token> for Value {
    fn from(token: Token) -> Self {
        match token {
            Token::Bool(b) => Self::Bool(b),
            Token::Int(n) => Self::Int(n),
            Token::Str(s) => Self::Str(s),
        }
    }
}

impl From<&Token> for Value {
    fn from(token: &Token) -> Self {
        token.clone().into()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Arity, OperationTable};

    #[test]
    fn test_truthiness() {
        assert!(!Value::Absent.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Int(3).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::object(OperationTable::new("obj")).is_truthy());
    }

    #[test]
    fn test_is_true_is_strict() {
        assert!(Value::Bool(true).is_true());
        assert!(!Value::Int(1).is_true());
        assert!(!Value::from("True").is_true());
    }

    #[test]
    fn test_from_token() {
        assert_eq!(Value::from(Token::convert("True")), Value::Bool(true));
        assert_eq!(Value::from(Token::convert("12")), Value::Int(12));
        assert_eq!(Value::from(Token::convert("edit")), Value::from("edit"));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<bool>), Value::Absent);
        assert_eq!(Value::from(Some(5i64)), Value::Int(5));
    }

    #[test]
    fn test_object_identity() {
        let a = Value::object(OperationTable::new("a"));
        let b = Value::object(OperationTable::new("a"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_downcast() {
        let table = OperationTable::new("page").with_operation("open", Arity::exact(0), |_| {
            Ok(Value::Bool(true))
        });
        let value = Value::object(table);
        assert_eq!(value.downcast_ref::<OperationTable>().map(|t| t.label()), Some("page"));
        assert!(value.downcast_ref::<String>().is_none());
        assert!(Value::Int(1).downcast_ref::<OperationTable>().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Absent.to_string(), "None");
        assert_eq!(Value::Bool(false).to_string(), "False");
        assert_eq!(Value::object(OperationTable::new("user")).to_string(), "user");
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(Value::Absent.kind_name(), "Absent");
        assert_eq!(Value::Int(5).kind_name(), "Int");
        assert_eq!(Value::from("x").kind_name(), "Str");
        assert_eq!(Value::object(OperationTable::new("user")).kind_name(), "Object");
    }
}
