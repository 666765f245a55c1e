//! Postfix instruction programs produced by the parser.

use indexmap::IndexSet;
use permit_core::Token;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Boolean operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Both operands true
    And,
    /// Either operand true
    Or,
}

impl Operator {
    /// Recognise an operator keyword
    #[must_use]
    pub fn from_token(token: &Token) -> Option<Self> {
        match token.as_str()? {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }

    /// Combine two operands
    #[must_use]
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            Self::And => left && right,
            Self::Or => left || right,
        }
    }

    /// Keyword as written in rules
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One authorization check: receiver, operation, then parameters.
///
/// Always holds at least one token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Token>", into = "Vec<Token>")]
pub struct Call {
    tokens: Vec<Token>,
}

impl Call {
    /// Build a call from its tokens, `None` when there are none
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Option<Self> {
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    /// Receiver token
    #[must_use]
    pub fn receiver(&self) -> &Token {
        &self.tokens[0]
    }

    /// Operation token, absent for receiver-only calls
    #[must_use]
    pub fn operation(&self) -> Option<&Token> {
        self.tokens.get(1)
    }

    /// Parameter tokens
    #[must_use]
    pub fn params(&self) -> &[Token] {
        self.tokens.get(2..).unwrap_or(&[])
    }

    /// All tokens in order
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl TryFrom<Vec<Token>> for Call {
    type Error = &'static str;

    fn try_from(tokens: Vec<Token>) -> Result<Self, Self::Error> {
        Self::new(tokens).ok_or("a call needs at least a receiver")
    }
}

impl From<Call> for Vec<Token> {
    fn from(call: Call) -> Self {
        call.tokens
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token)?;
        }
        write!(f, ")")
    }
}

/// A single postfix instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instruction {
    /// Pops two values and pushes their combination
    Operator(Operator),
    /// Pushes the result of a check
    Call(Call),
}

impl Instruction {
    /// Whether this instruction pushes an operand
    #[must_use]
    pub fn is_operand(&self) -> bool {
        matches!(self, Self::Call(_))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operator(op) => write!(f, "{}", op),
            Self::Call(call) => write!(f, "{}", call),
        }
    }
}

impl From<Operator> for Instruction {
    fn from(op: Operator) -> Self {
        Self::Operator(op)
    }
}

impl From<Call> for Instruction {
    fn from(call: Call) -> Self {
        Self::Call(call)
    }
}

/// Instructions in postfix order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Wrap an instruction list
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Instructions in execution order
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether there are no instructions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Iterate over instructions
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// Number of calls
    #[must_use]
    pub fn operand_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_operand()).count()
    }

    /// Number of operators
    #[must_use]
    pub fn operator_count(&self) -> usize {
        self.len() - self.operand_count()
    }

    /// Whether evaluation leaves exactly one value on the stack and never
    /// runs an operator short of operands
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let mut depth = 0usize;
        for instruction in &self.instructions {
            match instruction {
                Instruction::Call(_) => depth += 1,
                Instruction::Operator(_) => {
                    if depth < 2 {
                        return false;
                    }
                    depth -= 1;
                }
            }
        }
        depth <= 1 && (depth == 1) == !self.is_empty()
    }

    /// Names a binding must provide, in first-appearance order.
    ///
    /// Covers string tokens in receiver and parameter positions; operation
    /// names and literals are skipped.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names = IndexSet::new();
        for instruction in &self.instructions {
            if let Instruction::Call(call) = instruction {
                let receiver = std::iter::once(call.receiver());
                for token in receiver.chain(call.params()) {
                    if let Some(name) = token.as_str() {
                        names.insert(name);
                    }
                }
            }
        }
        names.into_iter().collect()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instruction) in self.instructions.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", instruction)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
