use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::errors::*;
use crate::operator::{Operator, PRI_FUNCTION};
use crate::value::Number;

lazy_static! {
    static ref TRIG_FUNCS: HashMap<&'static str, fn(f64) -> f64> = {
        let mut m: HashMap<&'static str, fn(f64) -> f64> = HashMap::new();
        m.insert("sin", f64::sin);
        m.insert("cos", f64::cos);
        m.insert("tan", f64::tan);
        m
    };
}

/// Unit of the argument of trigonometric functions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

/// Wraps sin/cos/tan with a degree-or-radian switch.
///
/// Clones share one flag: function nodes built by a parser keep a clone, so
/// changing the mode affects trees that were parsed earlier. The flag is read
/// at evaluation time
#[derive(Clone, Debug, Default)]
pub struct TrigConfig {
    use_degrees: Arc<AtomicBool>,
}

impl TrigConfig {
    pub fn new(use_degrees: bool) -> Self {
        TrigConfig {
            use_degrees: Arc::new(AtomicBool::new(use_degrees)),
        }
    }

    pub fn set_mode(&self, use_degrees: bool) {
        self.use_degrees.store(use_degrees, Ordering::Relaxed);
    }

    pub fn use_degrees(&self) -> bool {
        self.use_degrees.load(Ordering::Relaxed)
    }

    pub fn angle_unit(&self) -> AngleUnit {
        if self.use_degrees() {
            AngleUnit::Degrees
        } else {
            AngleUnit::Radians
        }
    }

    pub fn set_angle_unit(&self, unit: AngleUnit) {
        self.set_mode(unit == AngleUnit::Degrees);
    }

    /// Returns a function operator bound to this configuration
    pub fn function(&self, name: &str) -> Option<Operator> {
        let (&symbol, &func) = TRIG_FUNCS.get_key_value(name)?;
        let cfg = self.clone();
        Some(Operator::unary(symbol, PRI_FUNCTION, move |v| cfg.apply(func, v)))
    }

    fn apply(&self, func: fn(f64) -> f64, v: Number) -> CalcResult {
        let mut arg = v.into_raw_f64();
        if self.use_degrees() {
            arg = arg.to_radians();
        }
        Ok(Number::Float(func(arg)))
    }
}
