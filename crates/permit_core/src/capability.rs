//! Capability interface for objects named in rules.
//!
//! A rule such as `page allow user edit` invokes the operation `allow` on
//! whatever the caller bound to `page`. Receivers declare which operations
//! they expose and how many arguments each accepts, so the evaluator can
//! report arity problems without reflection.

use crate::error::ArityKind;
use crate::token::Token;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Accepted argument count of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arity {
    /// Required arguments
    pub min: usize,
    /// Maximum arguments, required plus optional
    pub max: usize,
}

impl Arity {
    /// Exactly `n` arguments
    #[must_use]
    pub const fn exact(n: usize) -> Self {
        Self { min: n, max: n }
    }

    /// Between `min` and `max` arguments, inclusive
    #[must_use]
    pub const fn range(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Check an argument count against the bounds
    ///
    /// # Errors
    ///
    /// Returns the violated bound
    pub fn check(&self, count: usize) -> Result<(), ArityKind> {
        if count < self.min {
            Err(ArityKind::TooFew)
        } else if count > self.max {
            Err(ArityKind::TooMany)
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..={}", self.min, self.max)
        }
    }
}

/// Failure to invoke an operation on a receiver
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    /// The receiver has no such operation
    #[error("no such operation")]
    NotFound,
    /// Argument count outside the declared arity
    #[error("{0} parameters")]
    Arity(ArityKind),
    /// The operation ran and reported a failure
    #[error("{0}")]
    Failed(String),
}

/// An object that exposes named operations to rules.
///
/// Implementations must be thread-safe; the evaluator holds no locks.
pub trait Receiver: Send + Sync {
    /// Declared arity of `operation`, `None` when it is not exposed
    fn arity(&self, operation: &str) -> Option<Arity>;

    /// Run `operation`. Arguments have already been checked against
    /// [`Receiver::arity`] when called through [`Receiver::try_invoke`].
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::Failed`] when the operation cannot complete
    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvokeError>;

    /// Access to the concrete type, for operations that inspect their arguments
    fn as_any(&self) -> &dyn Any;

    /// Name shown when the object is displayed
    fn label(&self) -> &str {
        "object"
    }

    /// Resolve `operation`, check the argument count, then invoke
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::NotFound`] for unknown operations,
    /// [`InvokeError::Arity`] for a bad argument count, or whatever
    /// [`Receiver::invoke`] returns
    fn try_invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvokeError> {
        let arity = self.arity(operation).ok_or(InvokeError::NotFound)?;
        arity.check(args.len()).map_err(InvokeError::Arity)?;
        self.invoke(operation, args)
    }

    /// Run `operation` knowing the rule token each argument was resolved
    /// from; `sources[i]` is the token written for `args[i]`.
    ///
    /// Defaults to [`Receiver::invoke`]. Receivers that match arguments by
    /// the name they were written as override it.
    ///
    /// # Errors
    ///
    /// See [`Receiver::invoke`]
    fn invoke_with_sources(
        &self,
        operation: &str,
        args: &[Value],
        sources: &[Token],
    ) -> Result<Value, InvokeError> {
        let _ = sources;
        self.invoke(operation, args)
    }

    /// [`Receiver::try_invoke`] through [`Receiver::invoke_with_sources`]
    ///
    /// # Errors
    ///
    /// See [`Receiver::try_invoke`]
    fn try_invoke_with_sources(
        &self,
        operation: &str,
        args: &[Value],
        sources: &[Token],
    ) -> Result<Value, InvokeError> {
        let arity = self.arity(operation).ok_or(InvokeError::NotFound)?;
        arity.check(args.len()).map_err(InvokeError::Arity)?;
        self.invoke_with_sources(operation, args, sources)
    }
}

/// Handler stored in an [`OperationTable`]
pub type OperationFn = Box<dyn Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync>;

struct Operation {
    arity: Arity,
    handler: OperationFn,
}

/// Receiver assembled from closures.
///
/// Operations keep their registration order.
pub struct OperationTable {
    label: String,
    operations: IndexMap<String, Operation>,
}

impl OperationTable {
    /// Create an empty table
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            operations: IndexMap::new(),
        }
    }

    /// Register an operation, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, arity: Arity, handler: F)
    where
        F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.operations.insert(
            name.into(),
            Operation {
                arity,
                handler: Box::new(handler),
            },
        );
    }

    /// Register an operation
    #[must_use]
    pub fn with_operation<F>(mut self, name: impl Into<String>, arity: Arity, handler: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
    {
        self.register(name, arity, handler);
        self
    }

    /// Names of the registered operations
    #[must_use]
    pub fn operations(&self) -> Vec<&str> {
        self.operations.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationTable")
            .field("label", &self.label)
            .field("operations", &self.operations())
            .finish()
    }
}

impl Receiver for OperationTable {
    fn arity(&self, operation: &str) -> Option<Arity> {
        self.operations.get(operation).map(|op| op.arity)
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvokeError> {
        let op = self.operations.get(operation).ok_or(InvokeError::NotFound)?;
        (op.handler)(args)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &'static str) -> OperationTable {
        OperationTable::new("user")
            .with_operation("has_role", Arity::exact(1), move |args| {
                Ok(Value::Bool(args[0].as_str() == Some(role)))
            })
            .with_operation("is_active", Arity::range(0, 1), |_| Ok(Value::Bool(true)))
    }

    #[test]
    fn test_arity_check() {
        let arity = Arity::range(1, 2);
        assert_eq!(arity.check(0), Err(ArityKind::TooFew));
        assert_eq!(arity.check(1), Ok(()));
        assert_eq!(arity.check(2), Ok(()));
        assert_eq!(arity.check(3), Err(ArityKind::TooMany));
    }

    #[test]
    fn test_arity_display() {
        assert_eq!(Arity::exact(2).to_string(), "2");
        assert_eq!(Arity::range(0, 1).to_string(), "0..=1");
    }

    #[test]
    fn test_try_invoke() {
        let user = user("admin");
        assert_eq!(user.try_invoke("has_role", &[Value::from("admin")]), Ok(Value::Bool(true)));
        assert_eq!(user.try_invoke("has_role", &[Value::from("guest")]), Ok(Value::Bool(false)));
        assert_eq!(user.try_invoke("is_active", &[]), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_try_invoke_unknown_operation() {
        let user = user("admin");
        assert_eq!(user.try_invoke("delete", &[]), Err(InvokeError::NotFound));
    }

    #[test]
    fn test_try_invoke_checks_arity_before_running() {
        let user = user("admin");
        assert_eq!(
            user.try_invoke("has_role", &[]),
            Err(InvokeError::Arity(ArityKind::TooFew))
        );
        assert_eq!(
            user.try_invoke("has_role", &[Value::from("a"), Value::from("b")]),
            Err(InvokeError::Arity(ArityKind::TooMany))
        );
    }

    #[test]
    fn test_sourced_invoke_defaults_to_invoke() {
        let user = user("admin");
        let sources = [Token::from("role")];
        assert_eq!(
            user.try_invoke_with_sources("has_role", &[Value::from("admin")], &sources),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            user.try_invoke_with_sources("has_role", &[], &[]),
            Err(InvokeError::Arity(ArityKind::TooFew))
        );
    }

    #[test]
    fn test_failed_operation() {
        let table = OperationTable::new("db").with_operation("lookup", Arity::exact(0), |_| {
            Err(InvokeError::Failed("connection closed".to_string()))
        });
        let err = table.try_invoke("lookup", &[]).unwrap_err();
        assert_eq!(err.to_string(), "connection closed");
    }

    #[test]
    fn test_register_replaces() {
        let mut table = user("admin");
        table.register("has_role", Arity::exact(0), |_| Ok(Value::Bool(false)));
        assert_eq!(table.arity("has_role"), Some(Arity::exact(0)));
        assert_eq!(table.operations(), vec!["has_role", "is_active"]);
    }
}
