//! PERMIT Policy Language
//!
//! Authorization rules written as infix boolean expressions over calls:
//!
//! ```text
//! page allow user edit
//! page allow user edit or user has_role admin
//! user is_logged_in and (page allow user edit or page owned_by user)
//! ```
//!
//! Each call names a receiver, an operation and its parameters. Rules are
//! tokenized, converted to a postfix [`Program`] and evaluated against a
//! [`Binding`] the caller fills with the objects the rule refers to.
//! `and` and `or` have equal precedence and group left to right.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod cache;
pub mod eval;
pub mod facts;
pub mod lexer;
pub mod parser;
pub mod program;

pub use binding::Binding;
pub use cache::ParseCache;
pub use eval::evaluate;
pub use facts::{FactReceiver, FactsError};
pub use lexer::tokenize;
pub use parser::parse;
pub use program::{Call, Instruction, Operator, Program};

pub use permit_core::{
    Arity, ArityKind, BracketKind, InvokeError, OperationTable, PermitError, PermitResult,
    Receiver, Token, Value,
};

/// Parse `expression` and evaluate it against `binding`
///
/// # Errors
///
/// Returns any parse or evaluation error; see [`parse`] and [`evaluate`]
pub fn permitted(expression: &str, binding: &Binding) -> PermitResult<bool> {
    let program = parse(tokenize(expression))?;
    evaluate(&program, binding)
}
