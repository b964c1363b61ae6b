//! # Incremental expression calculator
//!
//! The parser consumes an expression one character at a time, the way a
//! calculator receives key presses, and builds an operation tree. The tree is
//! evaluated lazily: `value()` walks it every time it is called, so a tree
//! parsed once follows later changes of the angle unit.
//!
//! ```
//! use calctree::{Number, Parser};
//!
//! let mut parser = Parser::with_degrees(true);
//! let tree = parser.parse("2*sin(30)+3!").unwrap().unwrap();
//! assert_eq!(tree.display_string(), "2*sin(30)+3!");
//! assert!((tree.value().unwrap().into_raw_f64() - 7.0).abs() < 1e-9);
//!
//! parser.append_str("(1+2").unwrap();
//! assert_eq!(parser.tree().unwrap().unwrap().value(), Ok(Number::Int(3)));
//! ```
//!
//! Numbers are integers while they fit into i64 and the operation is exact,
//! floats otherwise: `7/2` -> `3.5`, `6/3` -> `2`. Float literals can have an
//! exponent: `1.5e3`.
//!
//! Operators (starting from highest priority):
//! * `-` - unary minus, when there is no left operand. Binds like a function:
//!   `-2^2` is `4`
//! * `!` - factorial
//! * `^` - power
//! * `*`, `/` - multiplication, division
//! * `+`, `-` - addition, subtraction
//!
//! All binary operators are left-associative, including power: `2^3^2` is `64`.
//!
//! The list of supported functions: sin, cos, tan. Their argument is in
//! radians or degrees depending on the parser configuration.
//!
//! Predefined constants:
//! * `pi` - 3.14159...
//! * `e` - 2.71828...
//!
//! Names are caseinsensitive. An unknown name is dropped unless the parser
//! is switched to strict identifiers.
//!
//! The display string of a tree contains only the brackets required to parse
//! it back into the same tree: `((1+2))*(3)` is shown as `(1+2)*3`.

pub mod errors;
pub mod operand;
pub mod operator;
pub mod parse;
pub mod trig;
pub mod value;

mod buffer;
mod stack;

pub use errors::{CalcError, CalcResult, ErrorKind};
pub use operand::{BinaryOperation, Constant, Operand, OperandKind, UnaryOperation};
pub use operator::Operator;
pub use parse::{eval, parse, Parser};
pub use trig::{AngleUnit, TrigConfig};
pub use value::Number;
