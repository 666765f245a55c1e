//! Postfix stack evaluation.
//!
//! Every call in the program runs, in order; operators only combine values
//! that are already on the stack. There is no short-circuiting, so an
//! operation with side effects runs even when its result cannot change the
//! outcome.

use crate::binding::Binding;
use crate::program::{Call, Instruction, Program};
use permit_core::{InvokeError, PermitError, PermitResult, Token, Value};

/// Run `program` against `binding`.
///
/// An empty program evaluates to `false`.
///
/// # Errors
///
/// Returns [`PermitError::UnknownBinding`], [`PermitError::UnsupportedOperation`],
/// [`PermitError::Arity`] or [`PermitError::OperationFailed`] for a failing
/// call, and [`PermitError::MissingOperand`] for an operator without two
/// values to combine
pub fn evaluate(program: &Program, binding: &Binding) -> PermitResult<bool> {
    if program.is_empty() {
        return Ok(false);
    }

    let mut stack: Vec<bool> = Vec::with_capacity(program.operand_count());
    for instruction in program {
        match instruction {
            Instruction::Operator(op) => {
                let right = stack.pop().ok_or(PermitError::MissingOperand)?;
                let left = stack.pop().ok_or(PermitError::MissingOperand)?;
                let result = op.apply(left, right);
                tracing::trace!(%op, left, right, result, "apply operator");
                stack.push(result);
            }
            Instruction::Call(call) => {
                let result = eval_call(call, binding)?;
                tracing::trace!(%call, result, "evaluate call");
                stack.push(result);
            }
        }
    }

    if stack.len() > 1 {
        tracing::debug!(leftover = stack.len() - 1, "operands left without operator");
    }
    let result = stack.pop().ok_or(PermitError::MissingOperand)?;
    tracing::debug!(result, "evaluated rule");
    Ok(result)
}

impl Program {
    /// Run this program against `binding`
    ///
    /// # Errors
    ///
    /// See [`evaluate`]
    pub fn evaluate(&self, binding: &Binding) -> PermitResult<bool> {
        evaluate(self, binding)
    }
}

fn unknown(token: &Token) -> PermitError {
    PermitError::UnknownBinding {
        name: token.to_string(),
    }
}

fn eval_call(call: &Call, binding: &Binding) -> PermitResult<bool> {
    let receiver_token = call.receiver();

    let Some(operation) = call.operation() else {
        // single token: a literal or a presence check
        return match receiver_token {
            Token::Bool(b) => Ok(*b),
            Token::Str(name) => binding
                .get(name)
                .map(Value::is_truthy)
                .ok_or_else(|| unknown(receiver_token)),
            Token::Int(_) => Err(unknown(receiver_token)),
        };
    };

    let receiver_name = receiver_token.as_str().ok_or_else(|| unknown(receiver_token))?;
    let bound = binding.get(receiver_name).ok_or_else(|| unknown(receiver_token))?;

    if !bound.is_truthy() {
        tracing::debug!(receiver = receiver_name, "receiver not present, denying call");
        return Ok(false);
    }

    let operation = operation.to_string();
    let unsupported = || PermitError::UnsupportedOperation {
        receiver: receiver_name.to_string(),
        operation: operation.clone(),
    };
    let Some(receiver) = bound.as_receiver() else {
        tracing::debug!(
            receiver = receiver_name,
            value_kind = bound.kind_name(),
            "value has no operations"
        );
        return Err(unsupported());
    };

    let args: Vec<Value> = call
        .params()
        .iter()
        .map(|param| {
            param
                .as_str()
                .and_then(|name| binding.get(name))
                .cloned()
                .unwrap_or_else(|| Value::from(param))
        })
        .collect();

    match receiver.try_invoke_with_sources(&operation, &args, call.params()) {
        Ok(value) => Ok(value.is_true()),
        Err(InvokeError::NotFound) => Err(unsupported()),
        Err(InvokeError::Arity(kind)) => Err(PermitError::Arity {
            receiver: receiver_name.to_string(),
            operation,
            kind,
        }),
        Err(InvokeError::Failed(message)) => Err(PermitError::OperationFailed {
            receiver: receiver_name.to_string(),
            operation,
            message,
        }),
    }
}
