use crate::{deferred::Deferred, error::SummarizeError, value::Value};
use std::ops::{Add, Div, Mul, Sub};

// Arithmetic between nodes resolves both sides and applies the checked
// value operation; `Null` on either side yields `Null`.

macro_rules! impl_deferred_arith {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl $trait for Deferred {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Deferred> for &Deferred {
            type Output = Deferred;

            fn $method(self, rhs: &Deferred) -> Deferred {
                Deferred::combine2(self, rhs, |left: Value, right: Value| {
                    left.$checked(&right).map_err(SummarizeError::from)
                })
            }
        }

        impl $trait<Value> for Deferred {
            type Output = Self;

            fn $method(self, rhs: Value) -> Self {
                self.try_map(move |left| left.$checked(&rhs).map_err(SummarizeError::from))
            }
        }
    };
}

impl_deferred_arith!(Add, add, checked_add);
impl_deferred_arith!(Sub, sub, checked_sub);
impl_deferred_arith!(Mul, mul, checked_mul);
impl_deferred_arith!(Div, div, checked_div);
