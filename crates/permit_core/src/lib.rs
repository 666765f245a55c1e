//! PERMIT Core Types
//!
//! Pure types shared by the rule parser and evaluator: the error taxonomy,
//! tokens, runtime values and the capability interface receivers implement.
//! Nothing in this crate performs I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capability;
pub mod error;
pub mod token;
pub mod value;

// Re-exports
pub use capability::{Arity, InvokeError, OperationFn, OperationTable, Receiver};
pub use error::{ArityKind, BracketKind, PermitError, PermitResult};
pub use token::Token;
pub use value::Value;
