//! Infix to postfix conversion.
//!
//! `and` and `or` share one precedence level and fold strictly left to
//! right: `a and b or c` is `(a and b) or c`, and `a or b and c` is
//! `(a or b) and c`. Use brackets to group otherwise.

use crate::program::{Call, Instruction, Operator, Program};
use permit_core::{BracketKind, PermitError, PermitResult, Token};

/// Entry on the operator stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Operator(Operator),
    Open,
}

/// Shunting-yard state for one parse
#[derive(Debug, Default)]
struct Parser {
    output: Vec<Instruction>,
    stack: Vec<Pending>,
    buffer: Vec<Token>,
}

impl Parser {
    fn flush(&mut self) {
        if let Some(call) = Call::new(std::mem::take(&mut self.buffer)) {
            tracing::trace!(%call, "emit call");
            self.output.push(Instruction::Call(call));
        }
    }

    fn push_operator(&mut self, op: Operator) {
        self.flush();
        if let Some(&Pending::Operator(top)) = self.stack.last() {
            self.stack.pop();
            self.output.push(Instruction::Operator(top));
        }
        self.stack.push(Pending::Operator(op));
    }

    fn open(&mut self) {
        self.flush();
        self.stack.push(Pending::Open);
    }

    fn close(&mut self) -> PermitResult<()> {
        self.flush();
        loop {
            match self.stack.pop() {
                Some(Pending::Open) => return Ok(()),
                Some(Pending::Operator(op)) => self.output.push(Instruction::Operator(op)),
                None => {
                    return Err(PermitError::UnbalancedBracket {
                        kind: BracketKind::TooManyClose,
                    });
                }
            }
        }
    }

    fn finish(mut self) -> PermitResult<Program> {
        self.flush();
        while let Some(pending) = self.stack.pop() {
            match pending {
                Pending::Operator(op) => self.output.push(Instruction::Operator(op)),
                Pending::Open => {
                    return Err(PermitError::UnbalancedBracket {
                        kind: BracketKind::MissingClose,
                    });
                }
            }
        }
        Ok(Program::new(self.output))
    }
}

/// Convert an infix token sequence into a postfix [`Program`].
///
/// A bare operator with nothing around it still parses; it fails later in
/// evaluation for lack of operands.
///
/// # Errors
///
/// Returns [`PermitError::UnbalancedBracket`] when brackets do not pair up
pub fn parse<I>(tokens: I) -> PermitResult<Program>
where
    I: IntoIterator<Item = Token>,
{
    let mut parser = Parser::default();

    for token in tokens {
        if let Some(op) = Operator::from_token(&token) {
            parser.push_operator(op);
        } else if token.is("(") {
            parser.open();
        } else if token.is(")") {
            parser.close()?;
        } else {
            parser.buffer.push(token);
        }
    }

    let program = parser.finish()?;
    tracing::debug!(
        instructions = program.len(),
        operators = program.operator_count(),
        "parsed rule"
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn call(text: &str) -> Instruction {
        let tokens = text.split(' ').map(Token::convert).collect();
        Instruction::Call(Call::new(tokens).unwrap())
    }

    fn parse_text(text: &str) -> PermitResult<Program> {
        parse(tokenize(text))
    }

    #[test]
    fn test_basic_parse() {
        let program = parse_text("obj allow user edit").unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(program.instructions(), &[call("obj allow user edit")]);
    }

    #[test]
    fn test_combined_parse() {
        let program = parse_text("obj allow user edit or user has_role admin").unwrap();
        assert_eq!(
            program.instructions(),
            &[call("obj allow user edit"), call("user has_role admin"), Operator::Or.into()]
        );

        let program = parse_text("obj allow user edit and user has_role admin").unwrap();
        assert_eq!(
            program.instructions(),
            &[call("obj allow user edit"), call("user has_role admin"), Operator::And.into()]
        );
    }

    #[test]
    fn test_bracket_parse() {
        let program =
            parse_text("obj allow user edit and (user has_role admin or user has_role superuser)")
                .unwrap();
        assert_eq!(program.len(), 5);
        assert_eq!(
            program.instructions(),
            &[
                call("obj allow user edit"),
                call("user has_role admin"),
                call("user has_role superuser"),
                Operator::Or.into(),
                Operator::And.into(),
            ]
        );
    }

    #[test]
    fn test_operators_fold_left_to_right() {
        // (a and b) or c
        let program = parse_text("a x and b y or c z").unwrap();
        assert_eq!(
            program.instructions(),
            &[call("a x"), call("b y"), Operator::And.into(), call("c z"), Operator::Or.into()]
        );

        // (a or b) and c, not a or (b and c)
        let program = parse_text("a x or b y and c z").unwrap();
        assert_eq!(
            program.instructions(),
            &[call("a x"), call("b y"), Operator::Or.into(), call("c z"), Operator::And.into()]
        );
    }

    #[test]
    fn test_leading_bracket_group() {
        let program = parse_text("(a x or b y) and c z").unwrap();
        assert_eq!(
            program.instructions(),
            &[call("a x"), call("b y"), Operator::Or.into(), call("c z"), Operator::And.into()]
        );
    }

    #[test]
    fn test_nested_brackets() {
        let program = parse_text("((a x))").unwrap();
        assert_eq!(program.instructions(), &[call("a x")]);
    }

    #[test]
    fn test_too_many_closing_brackets() {
        let err = parse_text("a x)").unwrap_err();
        assert_eq!(
            err,
            PermitError::UnbalancedBracket {
                kind: BracketKind::TooManyClose
            }
        );

        let err = parse_text("(a x or b y))").unwrap_err();
        assert_eq!(
            err,
            PermitError::UnbalancedBracket {
                kind: BracketKind::TooManyClose
            }
        );
    }

    #[test]
    fn test_missing_closing_bracket() {
        let err = parse_text("a x and (b y or c z").unwrap_err();
        assert_eq!(
            err,
            PermitError::UnbalancedBracket {
                kind: BracketKind::MissingClose
            }
        );
    }

    #[test]
    fn test_empty_input() {
        let program = parse_text("").unwrap();
        assert!(program.is_empty());
        assert!(parse_text("()").unwrap().is_empty());
    }

    #[test]
    fn test_bare_operator_parses() {
        let program = parse_text("and").unwrap();
        assert_eq!(program.instructions(), &[Operator::And.into()]);
        assert!(!program.is_well_formed());
    }

    #[test]
    fn test_literal_operand() {
        let program = parse_text("True or user active").unwrap();
        assert_eq!(
            program.instructions(),
            &[
                Instruction::Call(Call::new(vec![Token::Bool(true)]).unwrap()),
                call("user active"),
                Operator::Or.into(),
            ]
        );
    }

    fn expression() -> impl proptest::strategy::Strategy<Value = String> {
        use proptest::prelude::*;

        // prefixes keep generated names clear of the `and`/`or` keywords
        let leaf = "r[a-z]{0,3} x[a-z_]{0,3}( p[a-z0-9]{0,3}){0,2}";
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                (inner.clone(), prop_oneof![Just("and"), Just("or")], inner.clone())
                    .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
                inner.prop_map(|e| format!("({})", e)),
            ]
        })
    }

    proptest::proptest! {
        #[test]
        fn prop_well_formed_expressions_parse_to_valid_postfix(text in expression()) {
            let program = parse_text(&text).unwrap();
            proptest::prop_assert_eq!(program.operand_count(), program.operator_count() + 1);
            proptest::prop_assert_eq!(program.len(), program.operand_count() + program.operator_count());
            proptest::prop_assert!(program.is_well_formed());
        }

        #[test]
        fn prop_unclosed_bracket_is_rejected(text in expression()) {
            let err = parse_text(&format!("({}", text)).unwrap_err();
            proptest::prop_assert_eq!(err, PermitError::UnbalancedBracket { kind: BracketKind::MissingClose });
        }
    }
}
