use log::{debug, trace};

use crate::buffer::{InputBuffer, Token};
use crate::errors::*;
use crate::operand::{Constant, Operand};
use crate::operator::Operator;
use crate::stack::{attach, Stack};
use crate::trig::TrigConfig;

/// Builds an operation tree from characters fed one at a time.
///
/// A failed `append_char` leaves the parser in an undefined state: call
/// `reset` (or `parse`, which resets) before reusing it
#[derive(Clone, Debug)]
pub struct Parser {
    trig: TrigConfig,
    current: Option<Operand>,
    stack: Stack,
    buffer: InputBuffer,
    strict_identifiers: bool,
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::with_degrees(false)
    }
}

impl Parser {
    /// Parser evaluating trigonometric functions in radians
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_degrees(use_degrees: bool) -> Self {
        Parser {
            trig: TrigConfig::new(use_degrees),
            current: None,
            stack: Stack::new(),
            buffer: InputBuffer::new(),
            strict_identifiers: false,
        }
    }

    /// Switches the angle unit. Trees already built by this parser follow
    /// the switch too: the unit is read when a value is requested
    pub fn set_use_degrees(&self, use_degrees: bool) {
        self.trig.set_mode(use_degrees);
    }

    pub fn trig_config(&self) -> &TrigConfig {
        &self.trig
    }

    /// With strict identifiers an unknown name (e.g. `foo`) is a syntax
    /// error. By default it is dropped without a trace
    pub fn set_strict_identifiers(&mut self, strict: bool) {
        self.strict_identifiers = strict;
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.stack.clear();
        self.buffer.reset();
    }

    /// Number of opening brackets still waiting for their closing pair
    pub fn open_brackets(&self) -> usize {
        self.stack.open_brackets()
    }

    /// True if no character has been consumed since the last reset
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.stack.is_empty() && self.buffer.is_empty()
    }

    pub fn append_char(&mut self, c: char) -> CalcErrorResult {
        trace!("append {:?}, current: {:?}, stack depth {}", c, self.current_str(), self.stack.len());
        if c.is_whitespace() {
            return self.empty_input_buffer();
        }

        // numbers and names cannot interleave, except for the exponent of a number
        if c.is_alphabetic() {
            if self.buffer.is_numeric() && !self.buffer.accepts(c) {
                self.empty_input_buffer()?;
            }
            return self.buffer.insert(c);
        }
        if c.is_ascii_digit() || c == '.' {
            if self.buffer.is_identifier() {
                self.empty_input_buffer()?;
            }
            return self.buffer.insert(c);
        }

        if let Some(op) = Operator::infix(c) {
            self.empty_input_buffer()?;
            if self.current.is_none() {
                if c != '-' {
                    return Err(CalcError::Syntax(format!("Operator '{}' requires a left operand", c)));
                }
                self.stack.push_operation(Operand::function(Operator::negation()));
                return Ok(());
            }
            return self.insert_infix_operation(op);
        }
        if let Some(op) = Operator::postfix(c) {
            self.empty_input_buffer()?;
            return self.insert_postfix_operation(op);
        }

        match c {
            '(' => {
                self.empty_input_buffer()?;
                self.stack.push_bracket(self.current.take());
                Ok(())
            }
            ')' => {
                self.empty_input_buffer()?;
                self.current = self.stack.pop_until_bracket(self.current.take())?;
                Ok(())
            }
            _ => Err(CalcError::unexpected_char(c)),
        }
    }

    pub fn append_str(&mut self, s: &str) -> CalcErrorResult {
        for c in s.chars() {
            self.append_char(c)?;
        }
        Ok(())
    }

    /// Ends the expression: closes every pending operation and hands the
    /// tree over. The parser is empty afterwards. Returns `None` for empty
    /// input
    pub fn finish(&mut self) -> Result<Option<Operand>, CalcError> {
        self.empty_input_buffer()?;
        let current = self.current.take();
        let res = self.stack.pop_all(current, true);
        self.reset();
        res
    }

    /// Tree of the input consumed so far, with unclosed brackets closed
    /// implicitly. The parser is left untouched, so typing can continue
    pub fn tree(&self) -> Result<Option<Operand>, CalcError> {
        let mut snapshot = self.clone();
        snapshot.empty_input_buffer()?;
        let current = snapshot.current.take();
        snapshot.stack.pop_all(current, false)
    }

    /// Parses a complete expression, discarding any previous state
    pub fn parse(&mut self, expr: &str) -> Result<Option<Operand>, CalcError> {
        self.reset();
        self.append_str(expr)?;
        let res = self.finish()?;
        debug!("parsed {:?} into {:?}", expr, res.as_ref().map(|op| op.display_string()));
        Ok(res)
    }

    fn current_str(&self) -> String {
        self.current.as_ref().map(|op| op.display_string()).unwrap_or_default()
    }

    fn empty_input_buffer(&mut self) -> CalcErrorResult {
        match self.buffer.take()? {
            None => Ok(()),
            Some(Token::Number(v)) => self.insert_operand(Operand::literal(v)),
            Some(Token::Identifier(name)) => self.insert_identifier(&name),
        }
    }

    fn insert_identifier(&mut self, name: &str) -> CalcErrorResult {
        let low = name.to_lowercase();
        if let Some(op) = self.trig.function(&low) {
            if self.current.is_some() {
                return Err(CalcError::Syntax(format!("Missing operator before function '{}'", low)));
            }
            self.stack.push_operation(Operand::function(op));
            return Ok(());
        }
        if let Some(c) = Constant::from_name(&low) {
            return self.insert_operand(Operand::constant(c));
        }
        if self.strict_identifiers {
            return Err(CalcError::Syntax(format!("Unknown identifier '{}'", name)));
        }
        debug!("unknown identifier {:?} dropped", name);
        Ok(())
    }

    fn insert_operand(&mut self, operand: Operand) -> CalcErrorResult {
        self.current = attach(self.current.take(), Some(operand))?;
        Ok(())
    }

    fn insert_infix_operation(&mut self, op: Operator) -> CalcErrorResult {
        let current = self.stack.pop_while_priority(self.current.take(), op.precedence())?;
        self.stack.push_operation(Operand::binary(op, current));
        Ok(())
    }

    fn insert_postfix_operation(&mut self, op: Operator) -> CalcErrorResult {
        let current = self.stack.pop_while_priority(self.current.take(), op.precedence())?;
        self.current = Some(Operand::postfix(op, current));
        Ok(())
    }
}

/// Parses a complete expression with a fresh parser (trigonometry in radians)
pub fn parse(expr: &str) -> Result<Option<Operand>, CalcError> {
    Parser::new().parse(expr)
}

/// Parses and evaluates an expression
pub fn eval(expr: &str, parser: &mut Parser) -> CalcResult {
    match parser.parse(expr)? {
        Some(tree) => tree.value(),
        None => Err(CalcError::Syntax("Nothing to calculate".to_string())),
    }
}
