use num_traits::{FromPrimitive, Zero};
use std::fmt;

use crate::errors::*;

/// Largest factorial argument that still fits into a finite f64
const MAX_FACTORIAL: i64 = 170;

/// Numeric value of an operand: integers stay exact while they fit into
/// i64, everything else is a float
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

fn format_f64(g: f64) -> String {
    let mut buf = dtoa::Buffer::new();
    buf.format(g).to_string()
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(g) => write!(f, "{}", format_f64(*g)),
        }
    }
}

impl Default for Number {
    fn default() -> Number {
        Number::Int(0)
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Number {
        Number::Int(i)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Number {
        Number::Float(f)
    }
}

// int op int -> checked int; falls back to float on overflow or mixed types
macro_rules! basic_op {
    ($id:ident, $checked:ident, $op:tt) => {
        pub fn $id(self, rhs: Number) -> CalcResult {
            match (self, rhs) {
                (Number::Int(i1), Number::Int(i2)) => match i1.$checked(i2) {
                    Some(i) => Ok(Number::Int(i)),
                    None => Ok(Number::Float(i1 as f64 $op i2 as f64)),
                },
                _ => Ok(Number::Float(self.into_raw_f64() $op rhs.into_raw_f64())),
            }
        }
    };
}

impl Number {
    /// Converts a run of decimal digits. Values that do not fit into i64 become floats
    pub fn from_str_integer(s: &str) -> CalcResult {
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Number::Int(i));
        }
        Number::from_str_float(s)
    }

    /// Literals that overflow f64 are rejected: `inf` does not read back as a number
    pub fn from_str_float(s: &str) -> CalcResult {
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Number::Float(f)),
            _ => Err(CalcError::Syntax(format!("Invalid number '{}'", s))),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => i.is_zero(),
            Number::Float(f) => f.is_zero(),
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Number::Int(..))
    }

    pub fn into_raw_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Text that reads back as the same number. Unlike `Display` it never
    /// uses a negative exponent: `-` is an operator for the parser
    pub fn to_source_string(&self) -> String {
        match self {
            Number::Int(i) => i.to_string(),
            Number::Float(g) => {
                let s = format_f64(*g);
                if s.contains("e-") {
                    format!("{}", g)
                } else {
                    s
                }
            }
        }
    }

    basic_op!(addition, checked_add, +);
    basic_op!(subtract, checked_sub, -);
    basic_op!(multiply, checked_mul, *);

    pub fn divide(self, rhs: Number) -> CalcResult {
        if rhs.is_zero() {
            return Err(CalcError::DividedByZero(self.to_string()));
        }
        match (self, rhs) {
            (Number::Int(i1), Number::Int(i2)) if i1.checked_rem(i2) == Some(0) => match i1.checked_div(i2) {
                Some(i) => Ok(Number::Int(i)),
                None => Ok(Number::Float(i1 as f64 / i2 as f64)),
            },
            _ => Ok(Number::Float(self.into_raw_f64() / rhs.into_raw_f64())),
        }
    }

    pub fn power(self, rhs: Number) -> CalcResult {
        if self.is_zero() && rhs.into_raw_f64() < 0.0 {
            return Err(CalcError::DividedByZero(self.to_string()));
        }
        if let (Number::Int(base), Number::Int(pow)) = (self, rhs) {
            if let Ok(pow) = u32::try_from(pow) {
                if let Some(i) = base.checked_pow(pow) {
                    return Ok(Number::Int(i));
                }
            }
        }

        let base = self.into_raw_f64();
        let pow = rhs.into_raw_f64();
        let f = base.powf(pow);
        if f.is_nan() && !base.is_nan() && !pow.is_nan() {
            return Err(CalcError::InvalidArgument("^".to_string(), format!("{}^{}", self, rhs)));
        }
        Ok(Number::Float(f))
    }

    pub fn negate(self) -> CalcResult {
        match self {
            Number::Int(i) => match i.checked_neg() {
                Some(n) => Ok(Number::Int(n)),
                None => Ok(Number::Float(-(i as f64))),
            },
            Number::Float(f) => Ok(Number::Float(-f)),
        }
    }

    pub fn fact(self) -> CalcResult {
        let n = match self {
            Number::Int(i) => i,
            Number::Float(f) => {
                if f.fract() != 0.0 {
                    return Err(CalcError::InvalidArgument("!".to_string(), self.to_string()));
                }
                if f > MAX_FACTORIAL as f64 {
                    return Ok(Number::Float(f64::INFINITY));
                }
                match i64::from_f64(f) {
                    Some(i) => i,
                    None => return Err(CalcError::InvalidArgument("!".to_string(), self.to_string())),
                }
            }
        };
        if n < 0 {
            return Err(CalcError::InvalidArgument("!".to_string(), self.to_string()));
        }
        if n > MAX_FACTORIAL {
            return Ok(Number::Float(f64::INFINITY));
        }

        let mut res = Number::Int(1);
        for i in 2..=n {
            res = res.multiply(Number::Int(i))?;
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_str() {
        assert_eq!(Number::from_str_integer("0"), Ok(Number::Int(0)));
        assert_eq!(Number::from_str_integer("007"), Ok(Number::Int(7)));
        assert_eq!(
            Number::from_str_integer("123456789012345678901234567890"),
            Ok(Number::Float(123456789012345678901234567890.0))
        );
    }

    #[test]
    fn test_float_str() {
        assert_eq!(Number::from_str_float("2.5"), Ok(Number::Float(2.5)));
        assert_eq!(Number::from_str_float(".5"), Ok(Number::Float(0.5)));
        assert_eq!(Number::from_str_float("3."), Ok(Number::Float(3.0)));
        assert_eq!(Number::from_str_float("1e3"), Ok(Number::Float(1000.0)));
        assert!(Number::from_str_float("1e").is_err());
        assert!(matches!(Number::from_str_float("1e400"), Err(CalcError::Syntax(..))));
        assert!(matches!(Number::from_str_integer(&"9".repeat(400)), Err(CalcError::Syntax(..))));
    }

    #[test]
    fn test_to_str() {
        assert_eq!(Number::Int(-12).to_string(), "-12");
        assert_eq!(Number::Float(2.5).to_string(), "2.5");
        assert_eq!(Number::Float(3.0).to_string(), "3.0");
        assert_eq!(Number::Float(0.0000001).to_source_string(), "0.0000001");
        assert_eq!(Number::Float(0.25).to_source_string(), "0.25");
    }

    #[test]
    fn test_add() {
        assert_eq!(Number::Int(2).addition(Number::Int(3)), Ok(Number::Int(5)));
        assert_eq!(Number::Int(2).addition(Number::Float(0.5)), Ok(Number::Float(2.5)));
        assert_eq!(
            Number::Int(i64::MAX).addition(Number::Int(1)),
            Ok(Number::Float(i64::MAX as f64 + 1.0))
        );
    }

    #[test]
    fn test_sub_mul() {
        assert_eq!(Number::Int(2).subtract(Number::Int(3)), Ok(Number::Int(-1)));
        assert_eq!(Number::Int(4).multiply(Number::Int(3)), Ok(Number::Int(12)));
        assert_eq!(Number::Float(1.5).multiply(Number::Int(2)), Ok(Number::Float(3.0)));
    }

    #[test]
    fn test_div() {
        assert_eq!(Number::Int(6).divide(Number::Int(3)), Ok(Number::Int(2)));
        assert_eq!(Number::Int(3).divide(Number::Int(2)), Ok(Number::Float(1.5)));
        assert_eq!(Number::Float(1.0).divide(Number::Int(4)), Ok(Number::Float(0.25)));
        assert_eq!(
            Number::Int(5).divide(Number::Int(0)),
            Err(CalcError::DividedByZero("5".to_string()))
        );
        assert_eq!(
            Number::Float(5.0).divide(Number::Float(0.0)),
            Err(CalcError::DividedByZero("5.0".to_string()))
        );
        assert_eq!(
            Number::Int(i64::MIN).divide(Number::Int(-1)),
            Ok(Number::Float(9223372036854775808.0))
        );
    }

    #[test]
    fn test_power() {
        assert_eq!(Number::Int(2).power(Number::Int(10)), Ok(Number::Int(1024)));
        assert_eq!(Number::Int(2).power(Number::Int(-1)), Ok(Number::Float(0.5)));
        assert_eq!(Number::Int(4).power(Number::Float(0.5)), Ok(Number::Float(2.0)));
        assert_eq!(Number::Int(2).power(Number::Int(64)), Ok(Number::Float(18446744073709551616.0)));
        assert!(matches!(Number::Int(0).power(Number::Int(-1)), Err(CalcError::DividedByZero(..))));
        assert!(matches!(
            Number::Int(-8).power(Number::Float(0.5)),
            Err(CalcError::InvalidArgument(..))
        ));
    }

    #[test]
    fn test_neg() {
        assert_eq!(Number::Int(5).negate(), Ok(Number::Int(-5)));
        assert_eq!(Number::Float(-0.5).negate(), Ok(Number::Float(0.5)));
        assert_eq!(Number::Int(i64::MIN).negate(), Ok(Number::Float(9223372036854775808.0)));
    }

    #[test]
    fn test_factorial() {
        assert_eq!(Number::Int(0).fact(), Ok(Number::Int(1)));
        assert_eq!(Number::Int(5).fact(), Ok(Number::Int(120)));
        assert_eq!(Number::Float(3.0).fact(), Ok(Number::Int(6)));
        match Number::Int(25).fact() {
            Ok(Number::Float(f)) => assert!((f / 1.5511210043330986e25 - 1.0).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(Number::Int(171).fact(), Ok(Number::Float(f64::INFINITY)));
        assert_eq!(Number::Float(171.0).fact(), Ok(Number::Float(f64::INFINITY)));
        assert_eq!(Number::Float(1e300).fact(), Ok(Number::Float(f64::INFINITY)));
        assert!(matches!(Number::Float(-1e300).fact(), Err(CalcError::InvalidArgument(..))));
        assert!(matches!(Number::Float(f64::INFINITY).fact(), Err(CalcError::InvalidArgument(..))));
        assert!(matches!(Number::Int(-1).fact(), Err(CalcError::InvalidArgument(..))));
        assert!(matches!(Number::Float(0.5).fact(), Err(CalcError::InvalidArgument(..))));
    }
}
