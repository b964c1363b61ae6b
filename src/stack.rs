use log::trace;

use crate::errors::*;
use crate::operand::Operand;

#[derive(Clone, Debug)]
pub(crate) enum Entry {
    /// Operation waiting for an operand
    Op(Operand),
    /// Opening bracket together with the subtree that was current before it
    OpenB(Option<Operand>),
}

/// Ancestors of the current subtree, innermost last
#[derive(Clone, Debug, Default)]
pub(crate) struct Stack {
    entries: Vec<Entry>,
}

/// Inserts `child` into `parent`; whichever is missing makes the other one the result
pub(crate) fn attach(parent: Option<Operand>, child: Option<Operand>) -> Result<Option<Operand>, CalcError> {
    match (parent, child) {
        (parent, None) => Ok(parent),
        (None, child) => Ok(child),
        (Some(mut p), Some(c)) => {
            p.insert_operand(c)?;
            Ok(Some(p))
        }
    }
}

impl Stack {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn open_brackets(&self) -> usize {
        self.entries.iter().filter(|e| matches!(e, Entry::OpenB(..))).count()
    }

    pub(crate) fn push_operation(&mut self, op: Operand) {
        self.entries.push(Entry::Op(op));
    }

    pub(crate) fn push_bracket(&mut self, current: Option<Operand>) {
        self.entries.push(Entry::OpenB(current));
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Precedence of the innermost pending operation. An opening bracket hides everything below it
    fn top_precedence(&self) -> Option<u32> {
        match self.entries.last() {
            Some(Entry::Op(op)) => op.precedence(),
            _ => None,
        }
    }

    /// Pops the innermost pending operation; `None` if the stack is empty or
    /// a bracket is on top
    pub(crate) fn pop_parent(&mut self) -> Option<Operand> {
        match self.entries.last() {
            Some(Entry::Op(..)) => match self.entries.pop() {
                Some(Entry::Op(op)) => Some(op),
                _ => None,
            },
            _ => None,
        }
    }

    // move-to-parent: the current subtree becomes an operand of the parent,
    // which becomes the new current subtree
    fn move_to_parent(&mut self, current: Option<Operand>) -> Result<Option<Operand>, CalcError> {
        match self.pop_parent() {
            Some(parent) => attach(Some(parent), current),
            None => Err(CalcError::Syntax("No pending operation".to_string())),
        }
    }

    /// Closes pending operations while they bind at least as tight as
    /// `priority`. Equal priority closes too: operators are left-associative
    pub(crate) fn pop_while_priority(
        &mut self,
        mut current: Option<Operand>,
        priority: u32,
    ) -> Result<Option<Operand>, CalcError> {
        while let Some(p) = self.top_precedence() {
            if p < priority {
                break;
            }
            current = self.move_to_parent(current)?;
        }
        Ok(current)
    }

    /// Handles a closing bracket: closes every pending operation down to the
    /// nearest opening bracket and removes the bracket
    pub(crate) fn pop_until_bracket(&mut self, mut current: Option<Operand>) -> Result<Option<Operand>, CalcError> {
        loop {
            match self.entries.pop() {
                None => return Err(CalcError::Syntax("Mismatched closing bracket".to_string())),
                Some(Entry::OpenB(before)) => {
                    trace!("bracket closed, {} left on stack", self.entries.len());
                    return attach(before, current);
                }
                Some(Entry::Op(op)) => current = attach(Some(op), current)?,
            }
        }
    }

    /// Final unwind after the expression ends. With `strict` an unclosed
    /// bracket is an error, otherwise it is closed implicitly
    pub(crate) fn pop_all(&mut self, mut current: Option<Operand>, strict: bool) -> Result<Option<Operand>, CalcError> {
        while let Some(e) = self.entries.pop() {
            current = match e {
                Entry::Op(op) => attach(Some(op), current)?,
                Entry::OpenB(..) if strict => {
                    return Err(CalcError::Syntax("Mismatched opening bracket".to_string()));
                }
                Entry::OpenB(before) => attach(before, current)?,
            };
        }
        Ok(current)
    }
}
