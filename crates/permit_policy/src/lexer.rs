//! Rule tokenizer.
//!
//! Splits rule text on whitespace and brackets. Brackets are kept as tokens
//! of their own; whitespace is dropped. There is no quoting or escaping.

use permit_core::Token;

/// Split `expression` into tokens, converting literals as they are emitted
#[must_use]
pub fn tokenize(expression: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut buffer = String::new();

    for c in expression.chars() {
        if c.is_whitespace() || c == '(' || c == ')' {
            flush(&mut buffer, &mut tokens);
            if c == '(' || c == ')' {
                tokens.push(Token::Str(c.to_string()));
            }
        } else {
            buffer.push(c);
        }
    }
    flush(&mut buffer, &mut tokens);

    tracing::trace!(count = tokens.len(), "tokenized rule");
    tokens
}

fn flush(buffer: &mut String, tokens: &mut Vec<Token>) {
    if !buffer.is_empty() {
        tokens.push(Token::convert(buffer));
        buffer.clear();
    }
}
