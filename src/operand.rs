//! Operation tree: literal and constant leaves, operator nodes above them.
//!
//! Every node reports a value, computed on demand from its children, and a
//! display string that re-parses to an equivalent tree.

use std::collections::HashMap;
use std::f64::consts;
use std::fmt;

use lazy_static::lazy_static;

use crate::errors::*;
use crate::operator::Operator;
use crate::value::Number;

lazy_static! {
    // name -> (value, unicode glyph)
    static ref CONSTANTS: HashMap<&'static str, (f64, &'static str)> = {
        let mut m = HashMap::new();
        m.insert("pi", (consts::PI, "\u{03c0}"));
        m.insert("e", (consts::E, "\u{1d452}"));
        m
    };
}

/// Named symbolic value: `pi` or `e`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constant {
    name: &'static str,
    value: f64,
    glyph: &'static str,
}

impl Constant {
    /// Looks up a constant by its lowercase name
    pub fn from_name(name: &str) -> Option<Constant> {
        let (&name, &(value, glyph)) = CONSTANTS.get_key_value(name)?;
        Some(Constant { name, value, glyph })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unicode_symbol(&self) -> &'static str {
        self.glyph
    }
}

/// Node with two operand slots, filled left to right
#[derive(Clone, Debug)]
pub struct BinaryOperation {
    operator: Operator,
    first: Option<Box<Operand>>,
    second: Option<Box<Operand>>,
}

impl BinaryOperation {
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn first_operand(&self) -> Option<&Operand> {
        self.first.as_deref()
    }

    pub fn second_operand(&self) -> Option<&Operand> {
        self.second.as_deref()
    }

    /// Replaces the second operand regardless of whether it is filled
    pub fn set_second_operand(&mut self, operand: Operand) {
        self.second = Some(Box::new(operand));
    }

    fn insert_operand(&mut self, operand: Operand) -> CalcErrorResult {
        if self.first.is_none() {
            self.first = Some(Box::new(operand));
        } else if self.second.is_none() {
            self.second = Some(Box::new(operand));
        } else {
            return Err(CalcError::UnexpectedOperand(self.operator.symbol().to_string()));
        }
        Ok(())
    }

    fn operands(&self) -> Result<(&Operand, &Operand), CalcError> {
        match (&self.first, &self.second) {
            (Some(first), Some(second)) => Ok((first, second)),
            _ => Err(CalcError::incomplete(self.operator.symbol())),
        }
    }
}

/// Node with a single operand slot: postfix operators and functions
#[derive(Clone, Debug)]
pub struct UnaryOperation {
    operator: Operator,
    operand: Option<Box<Operand>>,
}

impl UnaryOperation {
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn operand(&self) -> Option<&Operand> {
        self.operand.as_deref()
    }

    fn insert_operand(&mut self, operand: Operand) -> CalcErrorResult {
        if self.operand.is_some() {
            return Err(CalcError::UnexpectedOperand(self.operator.symbol().to_string()));
        }
        self.operand = Some(Box::new(operand));
        Ok(())
    }

    fn filled_operand(&self) -> Result<&Operand, CalcError> {
        self.operand.as_deref().ok_or_else(|| CalcError::incomplete(self.operator.symbol()))
    }
}

#[derive(Clone, Debug)]
pub enum OperandKind {
    /// Number typed by the user
    Literal(Number),
    Constant(Constant),
    Binary(BinaryOperation),
    /// Postfix operation, displayed as `operand!`
    Unary(UnaryOperation),
    /// Function call or unary minus, displayed as `name(operand)`
    Function(UnaryOperation),
}

/// A node of the operation tree. It exclusively owns its children.
///
/// Trees can be as deep as the expression is long, so every walk over the
/// tree (evaluation, rendering, cloning, dropping) keeps its own work stack
/// instead of recursing
pub struct Operand {
    kind: OperandKind,
    alias: Option<String>,
}

impl From<OperandKind> for Operand {
    fn from(kind: OperandKind) -> Self {
        Operand { kind, alias: None }
    }
}

impl Operand {
    pub fn literal(v: Number) -> Self {
        OperandKind::Literal(v).into()
    }

    pub fn constant(c: Constant) -> Self {
        OperandKind::Constant(c).into()
    }

    /// Binary operation with its first operand already known
    pub fn binary(operator: Operator, first: Option<Operand>) -> Self {
        OperandKind::Binary(BinaryOperation {
            operator,
            first: first.map(Box::new),
            second: None,
        })
        .into()
    }

    pub fn postfix(operator: Operator, operand: Option<Operand>) -> Self {
        OperandKind::Unary(UnaryOperation {
            operator,
            operand: operand.map(Box::new),
        })
        .into()
    }

    /// Function node awaiting its argument
    pub fn function(operator: Operator) -> Self {
        OperandKind::Function(UnaryOperation { operator, operand: None }).into()
    }

    /// Overrides the display string of the node
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn kind(&self) -> &OperandKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut OperandKind {
        &mut self.kind
    }

    pub fn is_operation(&self) -> bool {
        self.operator().is_some()
    }

    pub fn operator(&self) -> Option<&Operator> {
        match &self.kind {
            OperandKind::Literal(..) | OperandKind::Constant(..) => None,
            OperandKind::Binary(b) => Some(&b.operator),
            OperandKind::Unary(u) | OperandKind::Function(u) => Some(&u.operator),
        }
    }

    /// Precedence of an operation node. Leaves have none
    pub fn precedence(&self) -> Option<u32> {
        self.operator().map(|op| op.precedence())
    }

    /// Fills the next empty operand slot.
    ///
    /// Leaves have no slots at all, so inserting into one is a syntax error
    /// (two operands in a row, e.g. `2pi`). A node with every slot filled
    /// returns `UnexpectedOperand`
    pub fn insert_operand(&mut self, operand: Operand) -> CalcErrorResult {
        match &mut self.kind {
            OperandKind::Binary(b) => return b.insert_operand(operand),
            OperandKind::Unary(u) | OperandKind::Function(u) => return u.insert_operand(operand),
            OperandKind::Literal(..) | OperandKind::Constant(..) => {}
        }
        Err(CalcError::Syntax(format!(
            "Missing operator between '{}' and '{}'",
            self, operand
        )))
    }

    /// Evaluates the subtree. Nothing is cached: every call walks all children
    pub fn value(&self) -> CalcResult {
        let mut steps = vec![Step::Visit(self)];
        let mut values: Vec<Number> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(node) => match &node.kind {
                    OperandKind::Literal(v) => values.push(*v),
                    OperandKind::Constant(c) => values.push(Number::Float(c.value)),
                    OperandKind::Binary(b) => {
                        let (first, second) = b.operands()?;
                        steps.push(Step::ApplyBinary(&b.operator));
                        steps.push(Step::Visit(second));
                        steps.push(Step::Visit(first));
                    }
                    OperandKind::Unary(u) | OperandKind::Function(u) => {
                        steps.push(Step::ApplyUnary(&u.operator));
                        steps.push(Step::Visit(u.filled_operand()?));
                    }
                },
                Step::ApplyBinary(op) => {
                    let v2 = pop_value(&mut values, op)?;
                    let v1 = pop_value(&mut values, op)?;
                    values.push(op.apply_binary(v1, v2)?);
                }
                Step::ApplyUnary(op) => {
                    let v = pop_value(&mut values, op)?;
                    values.push(op.apply_unary(v)?);
                }
            }
        }
        values.pop().ok_or_else(|| CalcError::Syntax("Nothing to calculate".to_string()))
    }

    pub fn display_string(&self) -> String {
        self.render(false)
    }

    /// Same as `display_string` but constants are shown with their glyphs
    pub fn unicode_string(&self) -> String {
        self.render(true)
    }

    fn render(&self, unicode: bool) -> String {
        let mut out = String::new();
        // pieces are pushed right to left
        let mut pieces = vec![Piece::Node(self)];
        while let Some(piece) = pieces.pop() {
            let node = match piece {
                Piece::Text(s) => {
                    out.push_str(s);
                    continue;
                }
                Piece::Node(node) => node,
            };
            if let Some(alias) = &node.alias {
                out.push_str(alias);
                continue;
            }
            match &node.kind {
                OperandKind::Literal(v) => out.push_str(&v.to_source_string()),
                OperandKind::Constant(c) => out.push_str(if unicode { c.glyph } else { c.name }),
                OperandKind::Binary(b) => {
                    let pri = b.operator.precedence();
                    // equal precedence on the right means explicit brackets: operators are left-associative
                    push_child(&mut pieces, b.second.as_deref(), |p| p <= pri);
                    pieces.push(Piece::Text(b.operator.symbol()));
                    push_child(&mut pieces, b.first.as_deref(), |p| p < pri);
                }
                OperandKind::Unary(u) => {
                    let pri = u.operator.precedence();
                    pieces.push(Piece::Text(u.operator.symbol()));
                    push_child(&mut pieces, u.operand.as_deref(), |p| p < pri);
                }
                OperandKind::Function(u) => {
                    pieces.push(Piece::Text(")"));
                    if let Some(arg) = u.operand.as_deref() {
                        pieces.push(Piece::Node(arg));
                    }
                    pieces.push(Piece::Text("("));
                    pieces.push(Piece::Text(u.operator.symbol()));
                }
            }
        }
        out
    }

    // Moves the children out, leaving the slots empty
    fn take_children(&mut self, out: &mut Vec<Box<Operand>>) {
        match &mut self.kind {
            OperandKind::Binary(b) => {
                out.extend(b.second.take());
                out.extend(b.first.take());
            }
            OperandKind::Unary(u) | OperandKind::Function(u) => out.extend(u.operand.take()),
            OperandKind::Literal(..) | OperandKind::Constant(..) => {}
        }
    }
}

enum Step<'a> {
    Visit(&'a Operand),
    ApplyUnary(&'a Operator),
    ApplyBinary(&'a Operator),
}

fn pop_value(values: &mut Vec<Number>, op: &Operator) -> CalcResult {
    values.pop().ok_or_else(|| CalcError::incomplete(op.symbol()))
}

enum Piece<'a> {
    Node(&'a Operand),
    Text(&'a str),
}

// Empty slots render as nothing, so `3+` is shown as typed
fn push_child<'a, F>(pieces: &mut Vec<Piece<'a>>, child: Option<&'a Operand>, needs_brackets: F)
where
    F: Fn(u32) -> bool,
{
    let c = match child {
        Some(c) => c,
        None => return,
    };
    let bracketed = c.precedence().map_or(false, needs_brackets);
    if bracketed {
        pieces.push(Piece::Text(")"));
    }
    pieces.push(Piece::Node(c));
    if bracketed {
        pieces.push(Piece::Text("("));
    }
}

impl Clone for Operand {
    fn clone(&self) -> Self {
        enum Job<'a> {
            Visit(&'a Operand),
            Build(&'a Operand),
        }

        let mut steps = vec![Job::Visit(self)];
        let mut built: Vec<Operand> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Job::Visit(node) => {
                    steps.push(Job::Build(node));
                    match &node.kind {
                        OperandKind::Binary(b) => {
                            steps.extend(b.second.as_deref().map(Job::Visit));
                            steps.extend(b.first.as_deref().map(Job::Visit));
                        }
                        OperandKind::Unary(u) | OperandKind::Function(u) => {
                            steps.extend(u.operand.as_deref().map(Job::Visit));
                        }
                        OperandKind::Literal(..) | OperandKind::Constant(..) => {}
                    }
                }
                Job::Build(node) => {
                    // children were built left to right, so they come off in reverse
                    let mut take = |slot: &Option<Box<Operand>>| match slot {
                        Some(..) => built.pop().map(Box::new),
                        None => None,
                    };
                    let kind = match &node.kind {
                        OperandKind::Literal(v) => OperandKind::Literal(*v),
                        OperandKind::Constant(c) => OperandKind::Constant(*c),
                        OperandKind::Binary(b) => {
                            let second = take(&b.second);
                            let first = take(&b.first);
                            OperandKind::Binary(BinaryOperation {
                                operator: b.operator.clone(),
                                first,
                                second,
                            })
                        }
                        OperandKind::Unary(u) => OperandKind::Unary(UnaryOperation {
                            operator: u.operator.clone(),
                            operand: take(&u.operand),
                        }),
                        OperandKind::Function(u) => OperandKind::Function(UnaryOperation {
                            operator: u.operator.clone(),
                            operand: take(&u.operand),
                        }),
                    };
                    built.push(Operand {
                        kind,
                        alias: node.alias.clone(),
                    });
                }
            }
        }
        // the root is built last and always present
        built.pop().unwrap_or_else(|| Operand {
            kind: OperandKind::Literal(Number::default()),
            alias: None,
        })
    }
}

impl Drop for Operand {
    fn drop(&mut self) {
        let mut orphans = Vec::new();
        self.take_children(&mut orphans);
        while let Some(mut child) = orphans.pop() {
            child.take_children(&mut orphans);
        }
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Operand").field(&self.display_string()).finish()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::PRI_FUNCTION;
    use crate::trig::TrigConfig;
    use pretty_assertions::assert_eq;

    fn int(i: i64) -> Operand {
        Operand::literal(Number::Int(i))
    }

    fn bin(c: char, a: Operand, b: Operand) -> Operand {
        let mut op = Operand::binary(Operator::infix(c).unwrap(), Some(a));
        op.insert_operand(b).unwrap();
        op
    }

    #[test]
    fn test_leaves() {
        let l = int(42);
        assert_eq!(l.value(), Ok(Number::Int(42)));
        assert_eq!(l.display_string(), "42");
        assert!(!l.is_operation());
        assert_eq!(l.precedence(), None);

        let pi = Operand::constant(Constant::from_name("pi").unwrap());
        assert_eq!(pi.value(), Ok(Number::Float(consts::PI)));
        assert_eq!(pi.display_string(), "pi");
        assert_eq!(pi.unicode_string(), "\u{03c0}");

        let e = Constant::from_name("e").unwrap();
        assert_eq!(e.name(), "e");
        assert_eq!(e.value(), consts::E);
        assert_eq!(e.unicode_symbol(), "\u{1d452}");
        assert!(Constant::from_name("phi").is_none());
        assert!(Constant::from_name("PI").is_none());
    }

    #[test]
    fn test_alias() {
        let l = int(1000).with_alias("1k");
        assert_eq!(l.display_string(), "1k");
        assert_eq!(l.alias(), Some("1k"));
        assert_eq!(l.value(), Ok(Number::Int(1000)));
        let sum = bin('+', l, int(1));
        assert_eq!(sum.display_string(), "1k+1");
    }

    #[test]
    fn test_binary_slots() {
        let mut op = Operand::binary(Operator::infix('+').unwrap(), None);
        assert_eq!(op.display_string(), "+");
        op.insert_operand(int(1)).unwrap();
        assert_eq!(op.value(), Err(CalcError::incomplete("+")));
        op.insert_operand(int(2)).unwrap();
        assert_eq!(op.value(), Ok(Number::Int(3)));
        assert_eq!(
            op.insert_operand(int(3)),
            Err(CalcError::UnexpectedOperand("+".to_string()))
        );

        if let OperandKind::Binary(b) = op.kind_mut() {
            b.set_second_operand(int(40));
            assert_eq!(b.first_operand().map(|o| o.display_string()), Some("1".to_string()));
        }
        assert_eq!(op.value(), Ok(Number::Int(41)));
    }

    #[test]
    fn test_clone_is_deep() {
        let t = bin('*', bin('+', int(1).with_alias("one"), int(2)), int(3));
        let mut copy = t.clone();
        assert_eq!(copy.display_string(), "(one+2)*3");
        if let OperandKind::Binary(b) = copy.kind_mut() {
            b.set_second_operand(int(4));
        }
        assert_eq!(copy.value(), Ok(Number::Int(12)));
        assert_eq!(t.value(), Ok(Number::Int(9)));
        assert_eq!(format!("{:?}", t), "Operand(\"(one+2)*3\")");
    }

    #[test]
    fn test_insert_into_leaf() {
        let mut l = int(2);
        let pi = Operand::constant(Constant::from_name("pi").unwrap());
        assert!(matches!(l.insert_operand(pi), Err(CalcError::Syntax(..))));
    }

    #[test]
    fn test_value_not_cached() {
        let cfg = TrigConfig::new(false);
        let mut sin = Operand::function(cfg.function("sin").unwrap());
        sin.insert_operand(int(90)).unwrap();
        let radians = sin.value().unwrap().into_raw_f64();
        cfg.set_mode(true);
        let degrees = sin.value().unwrap().into_raw_f64();
        assert!((radians - 90.0f64.sin()).abs() < 1e-12);
        assert!((degrees - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_brackets() {
        // (1+2)*3
        let t = bin('*', bin('+', int(1), int(2)), int(3));
        assert_eq!(t.display_string(), "(1+2)*3");
        assert_eq!(t.value(), Ok(Number::Int(9)));

        // 1+2+3 stays flat on the left
        let t = bin('+', bin('+', int(1), int(2)), int(3));
        assert_eq!(t.display_string(), "1+2+3");

        // 8-(3-2) keeps brackets on the right
        let t = bin('-', int(8), bin('-', int(3), int(2)));
        assert_eq!(t.display_string(), "8-(3-2)");
        assert_eq!(t.value(), Ok(Number::Int(7)));

        // 1+2*3
        let t = bin('+', int(1), bin('*', int(2), int(3)));
        assert_eq!(t.display_string(), "1+2*3");
    }

    #[test]
    fn test_unary_display() {
        let fact = Operator::postfix('!').unwrap();
        let t = Operand::postfix(fact.clone(), Some(bin('+', int(2), int(1))));
        assert_eq!(t.display_string(), "(2+1)!");
        assert_eq!(t.value(), Ok(Number::Int(6)));

        let t = Operand::postfix(fact.clone(), Some(Operand::postfix(fact.clone(), Some(int(3)))));
        assert_eq!(t.display_string(), "3!!");
        assert_eq!(t.value(), Ok(Number::Int(720)));

        let empty = Operand::postfix(fact, None);
        assert_eq!(empty.display_string(), "!");
        assert_eq!(empty.value(), Err(CalcError::incomplete("!")));
    }

    #[test]
    fn test_function_display() {
        let mut neg = Operand::function(Operator::negation());
        assert_eq!(neg.precedence(), Some(PRI_FUNCTION));
        assert_eq!(neg.display_string(), "-()");
        neg.insert_operand(bin('+', int(2), int(3))).unwrap();
        assert_eq!(neg.display_string(), "-(2+3)");
        assert_eq!(neg.value(), Ok(Number::Int(-5)));

        let t = bin('^', neg, int(2));
        assert_eq!(t.display_string(), "-(2+3)^2");
        assert_eq!(t.value(), Ok(Number::Int(25)));
    }
}
