use log::trace;

use crate::errors::*;
use crate::value::Number;

/// Type of the token being typed, inferred from its first character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputKind {
    Integer,
    Float,
    Identifier,
}

/// Completed token taken out of the buffer
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Number(Number),
    Identifier(String),
}

/// Accumulates the characters of the number or name currently being typed
#[derive(Clone, Debug, Default)]
pub(crate) struct InputBuffer {
    data: String,
    kind: Option<InputKind>,
}

fn is_exponent(c: char) -> bool {
    c == 'e' || c == 'E'
}

impl InputBuffer {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn is_numeric(&self) -> bool {
        matches!(self.kind, Some(InputKind::Integer) | Some(InputKind::Float))
    }

    pub(crate) fn is_identifier(&self) -> bool {
        self.kind == Some(InputKind::Identifier)
    }

    fn has_exponent(&self) -> bool {
        self.data.contains(is_exponent)
    }

    /// Checks whether a character continues the token being typed
    pub(crate) fn accepts(&self, c: char) -> bool {
        match self.kind {
            None => c.is_ascii_digit() || c.is_alphabetic() || c == '.',
            Some(InputKind::Integer) => c.is_ascii_digit() || c == '.' || (is_exponent(c) && !self.has_exponent()),
            Some(InputKind::Float) => c.is_ascii_digit() || (is_exponent(c) && !self.has_exponent()),
            Some(InputKind::Identifier) => c.is_alphabetic(),
        }
    }

    pub(crate) fn insert(&mut self, c: char) -> CalcErrorResult {
        if !self.accepts(c) {
            return Err(CalcError::unexpected_char(c));
        }
        self.kind = match self.kind {
            None if c.is_ascii_digit() => Some(InputKind::Integer),
            None if c == '.' => Some(InputKind::Float),
            None => Some(InputKind::Identifier),
            Some(InputKind::Integer) if c == '.' || is_exponent(c) => Some(InputKind::Float),
            kind => kind,
        };
        self.data.push(c);
        trace!("input buffer: {:?} {:?}", self.data, self.kind);
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.data.clear();
        self.kind = None;
    }

    /// Converts the accumulated characters and clears the buffer
    pub(crate) fn take(&mut self) -> Result<Option<Token>, CalcError> {
        let kind = match self.kind {
            None => return Ok(None),
            Some(kind) => kind,
        };
        let res = match kind {
            InputKind::Integer => Number::from_str_integer(&self.data).map(Token::Number),
            InputKind::Float => Number::from_str_float(&self.data).map(Token::Number),
            InputKind::Identifier => Ok(Token::Identifier(self.data.clone())),
        };
        self.reset();
        res.map(Some)
    }
}
