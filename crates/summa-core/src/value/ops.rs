use crate::value::{Float64, Value};
use thiserror::Error as ThisError;

///
/// ValueError
///
/// Arithmetic failures raised while reducing or composing values.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValueError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("non-finite result from {op}")]
    NonFinite { op: &'static str },

    #[error("integer overflow in {op}")]
    Overflow { op: &'static str },

    #[error("cannot apply {op} to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
}

///
/// ArithOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
}

impl ArithOp {
    const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
        }
    }

    const fn int(self, a: i64, b: i64) -> Option<i64> {
        match self {
            Self::Add => a.checked_add(b),
            Self::Sub => a.checked_sub(b),
            Self::Mul => a.checked_mul(b),
        }
    }

    fn float(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
        }
    }
}

impl Value {
    /// SQL-style addition: `Null` on either side yields `Null`.
    pub fn checked_add(&self, other: &Self) -> Result<Self, ValueError> {
        self.arith(other, ArithOp::Add)
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, ValueError> {
        self.arith(other, ArithOp::Sub)
    }

    pub fn checked_mul(&self, other: &Self) -> Result<Self, ValueError> {
        self.arith(other, ArithOp::Mul)
    }

    /// True division; numeric operands always produce a `Float64`.
    pub fn checked_div(&self, other: &Self) -> Result<Self, ValueError> {
        if self.is_null() || other.is_null() {
            return Ok(Self::Null);
        }

        let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) else {
            return Err(self.mismatch("div", other));
        };
        if b == 0.0 {
            return Err(ValueError::DivisionByZero);
        }

        float_value(a / b, "div")
    }

    /// Round a numeric scalar to `digits` decimal places.
    ///
    /// Integers and `Null` pass through unchanged.
    pub fn round(&self, digits: u32) -> Result<Self, ValueError> {
        match self {
            Self::Null | Self::Int(_) => Ok(self.clone()),
            Self::Float64(f) => {
                let exp = i32::try_from(digits).map_err(|_| ValueError::Overflow { op: "round" })?;
                let factor = 10f64.powi(exp);
                let scaled = (f.get() * factor).round() / factor;
                if scaled.is_finite() {
                    float_value(scaled, "round")
                } else {
                    // scale overflowed; the value already has fewer digits than requested
                    Ok(self.clone())
                }
            }
            _ => Err(ValueError::TypeMismatch {
                op: "round",
                left: self.kind_name(),
                right: "digits",
            }),
        }
    }

    fn arith(&self, other: &Self, op: ArithOp) -> Result<Self, ValueError> {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => Ok(Self::Null),
            (Self::Int(a), Self::Int(b)) => op
                .int(*a, *b)
                .map(Self::Int)
                .ok_or(ValueError::Overflow { op: op.name() }),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => float_value(op.float(a, b), op.name()),
                _ => Err(self.mismatch(op.name(), other)),
            },
        }
    }

    const fn mismatch(&self, op: &'static str, other: &Self) -> ValueError {
        ValueError::TypeMismatch {
            op,
            left: self.kind_name(),
            right: other.kind_name(),
        }
    }
}

fn float_value(v: f64, op: &'static str) -> Result<Value, ValueError> {
    Float64::try_new(v)
        .map(Value::Float64)
        .ok_or(ValueError::NonFinite { op })
}
