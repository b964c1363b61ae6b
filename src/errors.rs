use thiserror::Error;

use crate::value::Number;

/// Expression calculation result: either value or error
pub type CalcResult = Result<Number, CalcError>;
pub(crate) type CalcErrorResult = Result<(), CalcError>;

/// Coarse error category, for callers that show one message per kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    DivisionByZero,
    UnexpectedOperand,
    InvalidArgument,
}

#[derive(Error, Clone, Debug, PartialEq)]
pub enum CalcError {
    /// Malformed input or an incomplete tree reached during evaluation
    #[error("Syntax error: {0}")]
    Syntax(String),
    /// Raised only by evaluation of `/` (and `^` with a zero base and negative exponent)
    #[error("'{0}' divided by zero")]
    DividedByZero(String),
    /// Operand inserted into a node whose slots are all filled
    #[error("Operation '{0}' has no free operand slot")]
    UnexpectedOperand(String),
    /// Function or operator applied outside of its domain, e.g. `(-1)!`
    #[error("Invalid argument {1} for function '{0}'")]
    InvalidArgument(String, String),
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::Syntax(..) => ErrorKind::Syntax,
            CalcError::DividedByZero(..) => ErrorKind::DivisionByZero,
            CalcError::UnexpectedOperand(..) => ErrorKind::UnexpectedOperand,
            CalcError::InvalidArgument(..) => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn unexpected_char(c: char) -> Self {
        CalcError::Syntax(format!("Unexpected character '{}'", c))
    }

    pub(crate) fn incomplete(symbol: &str) -> Self {
        CalcError::Syntax(format!("Operation '{}' is missing an operand", symbol))
    }
}
