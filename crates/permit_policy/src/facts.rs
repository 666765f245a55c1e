//! Bindings described as data.
//!
//! A fact file is a JSON object mapping each name to:
//! - `null`: the absent placeholder
//! - a boolean, integer or string: a literal value
//! - an object: a receiver whose operations are lists of permitted
//!   argument tuples
//!
//! ```json
//! {
//!   "page": { "allow": [["user", "view"], ["user", "edit"]] },
//!   "user": { "has_role": [["admin"]], "active": [[]] },
//!   "guest": null
//! }
//! ```
//!
//! An operation accepts exactly as many arguments as its tuples have. A call
//! returns `true` when its arguments match one of the tuples; object
//! arguments match the name they are bound under, or their label when the
//! receiver is invoked outside a rule.

use crate::binding::Binding;
use indexmap::IndexMap;
use permit_core::{Arity, InvokeError, Receiver, Token, Value};
use serde_json::Value as Json;
use std::any::Any;
use std::path::Path;

/// Error loading a fact file
#[derive(Debug, thiserror::Error)]
pub enum FactsError {
    /// File could not be read
    #[error("Failed to read facts: {0}")]
    Io(#[from] std::io::Error),
    /// File is not valid JSON
    #[error("Invalid facts JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// JSON is valid but does not describe a binding
    #[error("Invalid fact entry \"{name}\": {reason}")]
    InvalidEntry {
        /// Offending name, or operation as `name.operation`
        name: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Receiver backed by tables of permitted argument tuples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactReceiver {
    name: String,
    operations: IndexMap<String, Vec<Vec<Token>>>,
}

impl FactReceiver {
    /// Create a receiver with no operations
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: IndexMap::new(),
        }
    }

    /// Permit `operation` for one argument tuple
    #[must_use]
    pub fn with_fact<I, T>(mut self, operation: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.operations
            .entry(operation.into())
            .or_default()
            .push(args.into_iter().map(Into::into).collect());
        self
    }

    fn from_json(name: &str, table: &serde_json::Map<String, Json>) -> Result<Self, FactsError> {
        let mut receiver = Self::new(name);
        for (operation, tuples) in table {
            let invalid = |reason: &str| FactsError::InvalidEntry {
                name: format!("{}.{}", name, operation),
                reason: reason.to_string(),
            };
            let tuples = tuples
                .as_array()
                .ok_or_else(|| invalid("expected a list of argument lists"))?;

            let mut rows = Vec::with_capacity(tuples.len());
            for tuple in tuples {
                let args = tuple
                    .as_array()
                    .ok_or_else(|| invalid("expected an argument list"))?;
                let row = args
                    .iter()
                    .map(|arg| scalar_token(arg).ok_or_else(|| invalid(EXPECTED_SCALAR)))
                    .collect::<Result<Vec<_>, _>>()?;
                if rows.first().is_some_and(|first: &Vec<Token>| first.len() != row.len()) {
                    return Err(invalid("argument lists differ in length"));
                }
                rows.push(row);
            }
            receiver.operations.insert(operation.clone(), rows);
        }
        Ok(receiver)
    }

    fn lookup(&self, operation: &str, args: &[Value], sources: &[Token]) -> Result<Value, InvokeError> {
        let rows = self.operations.get(operation).ok_or(InvokeError::NotFound)?;
        let found = rows.iter().any(|row| {
            row.len() == args.len()
                && row
                    .iter()
                    .zip(args)
                    .enumerate()
                    .all(|(i, (expected, arg))| arg_matches(arg, sources.get(i), expected))
        });
        Ok(Value::Bool(found))
    }
}

const EXPECTED_SCALAR: &str = "expected a boolean, integer or string";

fn scalar_token(json: &Json) -> Option<Token> {
    match json {
        Json::Bool(b) => Some(Token::Bool(*b)),
        Json::Number(n) => n.as_i64().map(Token::Int),
        Json::String(s) => Some(Token::Str(s.clone())),
        _ => None,
    }
}

fn arg_matches(arg: &Value, source: Option<&Token>, expected: &Token) -> bool {
    match (arg, expected) {
        (Value::Bool(a), Token::Bool(b)) => a == b,
        (Value::Int(a), Token::Int(b)) => a == b,
        (Value::Str(a), Token::Str(b)) => a == b,
        (Value::Object(r), Token::Str(b)) => source.and_then(Token::as_str).unwrap_or(r.label()) == b,
        _ => false,
    }
}

impl Receiver for FactReceiver {
    fn arity(&self, operation: &str) -> Option<Arity> {
        let rows = self.operations.get(operation)?;
        Some(Arity::exact(rows.first().map_or(0, Vec::len)))
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvokeError> {
        self.lookup(operation, args, &[])
    }

    fn invoke_with_sources(
        &self,
        operation: &str,
        args: &[Value],
        sources: &[Token],
    ) -> Result<Value, InvokeError> {
        self.lookup(operation, args, sources)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Build a binding from fact JSON
///
/// # Errors
///
/// Returns [`FactsError`] when the text is not JSON or does not describe a
/// binding
pub fn from_str(text: &str) -> Result<Binding, FactsError> {
    let json: Json = serde_json::from_str(text)?;
    let Json::Object(entries) = json else {
        return Err(FactsError::InvalidEntry {
            name: "<root>".to_string(),
            reason: "expected an object".to_string(),
        });
    };

    let mut binding = Binding::new();
    for (name, entry) in &entries {
        let value = match entry {
            Json::Null => Value::Absent,
            Json::Object(table) => Value::object(FactReceiver::from_json(name, table)?),
            other => scalar_token(other).map(Value::from).ok_or_else(|| FactsError::InvalidEntry {
                name: name.clone(),
                reason: format!("{}, null or an object", EXPECTED_SCALAR),
            })?,
        };
        binding.insert(name.clone(), value);
    }
    tracing::debug!(names = binding.len(), "loaded facts");
    Ok(binding)
}

/// Build a binding from a fact file
///
/// # Errors
///
/// See [`from_str`]; also fails when the file cannot be read
pub fn from_path(path: impl AsRef<Path>) -> Result<Binding, FactsError> {
    let text = std::fs::read_to_string(path)?;
    from_str(&text)
}
