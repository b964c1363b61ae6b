use std::fmt;
use std::sync::Arc;

use crate::errors::*;
use crate::value::Number;

// Precedence bands, loosest first
pub const PRI_ADDITIVE: u32 = 0;
pub const PRI_MULTIPLICATIVE: u32 = 1;
pub const PRI_POWER: u32 = 2;
pub const PRI_POSTFIX: u32 = 3;
/// Function application and unary minus bind tighter than any operator
pub const PRI_FUNCTION: u32 = 1000;

pub(crate) const UNARY_MINUS: &str = "-";

pub type UnaryFn = Arc<dyn Fn(Number) -> CalcResult + Send + Sync>;
pub type BinaryFn = Arc<dyn Fn(Number, Number) -> CalcResult + Send + Sync>;

/// Evaluation function of an operator together with its arity
#[derive(Clone)]
pub enum OperatorFn {
    Unary(UnaryFn),
    Binary(BinaryFn),
}

/// Immutable (symbol, function, precedence) triple
#[derive(Clone)]
pub struct Operator {
    symbol: &'static str,
    func: OperatorFn,
    precedence: u32,
}

impl Operator {
    pub fn unary<F>(symbol: &'static str, precedence: u32, f: F) -> Self
    where
        F: Fn(Number) -> CalcResult + Send + Sync + 'static,
    {
        Operator {
            symbol,
            func: OperatorFn::Unary(Arc::new(f)),
            precedence,
        }
    }

    pub fn binary<F>(symbol: &'static str, precedence: u32, f: F) -> Self
    where
        F: Fn(Number, Number) -> CalcResult + Send + Sync + 'static,
    {
        Operator {
            symbol,
            func: OperatorFn::Binary(Arc::new(f)),
            precedence,
        }
    }

    /// Returns the infix operator for a character, if it is one of `+ - * / ^`
    pub fn infix(c: char) -> Option<Operator> {
        let op = match c {
            '+' => Operator::binary("+", PRI_ADDITIVE, Number::addition),
            '-' => Operator::binary("-", PRI_ADDITIVE, Number::subtract),
            '*' => Operator::binary("*", PRI_MULTIPLICATIVE, Number::multiply),
            '/' => Operator::binary("/", PRI_MULTIPLICATIVE, Number::divide),
            '^' => Operator::binary("^", PRI_POWER, Number::power),
            _ => return None,
        };
        Some(op)
    }

    /// Returns the postfix operator for a character (only `!` - factorial)
    pub fn postfix(c: char) -> Option<Operator> {
        match c {
            '!' => Some(Operator::unary("!", PRI_POSTFIX, Number::fact)),
            _ => None,
        }
    }

    /// Leading minus: parsed as a function, so it binds tighter than `^`
    pub fn negation() -> Operator {
        Operator::unary(UNARY_MINUS, PRI_FUNCTION, Number::negate)
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn precedence(&self) -> u32 {
        self.precedence
    }

    pub fn is_binary(&self) -> bool {
        matches!(self.func, OperatorFn::Binary(..))
    }

    pub fn apply_unary(&self, v: Number) -> CalcResult {
        match &self.func {
            OperatorFn::Unary(f) => f(v),
            OperatorFn::Binary(..) => Err(CalcError::UnexpectedOperand(self.symbol.to_string())),
        }
    }

    pub fn apply_binary(&self, v1: Number, v2: Number) -> CalcResult {
        match &self.func {
            OperatorFn::Binary(f) => f(v1, v2),
            OperatorFn::Unary(..) => Err(CalcError::UnexpectedOperand(self.symbol.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let arity = if self.is_binary() { 2 } else { 1 };
        write!(f, "Operator({:?}, arity {}, precedence {})", self.symbol, arity, self.precedence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_bands() {
        let pri = |c| Operator::infix(c).map(|op| op.precedence());
        assert_eq!(pri('+'), Some(PRI_ADDITIVE));
        assert_eq!(pri('-'), Some(PRI_ADDITIVE));
        assert_eq!(pri('*'), Some(PRI_MULTIPLICATIVE));
        assert_eq!(pri('/'), Some(PRI_MULTIPLICATIVE));
        assert_eq!(pri('^'), Some(PRI_POWER));
        assert_eq!(pri('!'), None);
        assert_eq!(Operator::postfix('!').map(|op| op.precedence()), Some(PRI_POSTFIX));
        assert_eq!(Operator::negation().precedence(), PRI_FUNCTION);
    }

    #[test]
    fn test_apply() {
        let sub = Operator::infix('-').unwrap();
        assert_eq!(sub.apply_binary(Number::Int(7), Number::Int(9)), Ok(Number::Int(-2)));
        assert_eq!(
            sub.apply_unary(Number::Int(7)),
            Err(CalcError::UnexpectedOperand("-".to_string()))
        );

        let neg = Operator::negation();
        assert_eq!(neg.apply_unary(Number::Float(1.5)), Ok(Number::Float(-1.5)));
        assert!(!neg.is_binary());

        let fact = Operator::postfix('!').unwrap();
        assert_eq!(fact.apply_unary(Number::Int(4)), Ok(Number::Int(24)));
    }

    #[test]
    fn test_classify() {
        for c in "+-*/^".chars() {
            assert!(Operator::infix(c).is_some());
            assert!(Operator::postfix(c).is_none());
        }
        assert!(Operator::infix('!').is_none());
        assert!(Operator::postfix('!').is_some());
        assert!(Operator::postfix('(').is_none());
        assert_eq!(format!("{}", Operator::infix('^').unwrap()), "^");
        assert_eq!(
            format!("{:?}", Operator::infix('*').unwrap()),
            "Operator(\"*\", arity 2, precedence 1)"
        );
    }
}
