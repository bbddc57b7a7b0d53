use crate::{relation::expr::ColumnExpr, value::Value};
use std::ops::{BitAnd, BitOr};

///
/// Predicate AST
///
/// Pure, schema-agnostic representation of filter predicates. Evaluation
/// belongs to backends; rendering belongs to `relation::sql`.
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
}

impl CompareOp {
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComparePredicate {
    pub expr: ColumnExpr,
    pub op: CompareOp,
    pub value: Value,
}

///
/// Predicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    IsNull(ColumnExpr),
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    #[must_use]
    pub fn compare(expr: impl Into<ColumnExpr>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate {
            expr: expr.into(),
            op,
            value: value.into(),
        })
    }

    #[must_use]
    pub fn eq(expr: impl Into<ColumnExpr>, value: impl Into<Value>) -> Self {
        Self::compare(expr, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(expr: impl Into<ColumnExpr>, value: impl Into<Value>) -> Self {
        Self::compare(expr, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(expr: impl Into<ColumnExpr>, value: impl Into<Value>) -> Self {
        Self::compare(expr, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(expr: impl Into<ColumnExpr>, value: impl Into<Value>) -> Self {
        Self::compare(expr, CompareOp::Lte, value)
    }

    #[must_use]
    pub fn gt(expr: impl Into<ColumnExpr>, value: impl Into<Value>) -> Self {
        Self::compare(expr, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(expr: impl Into<ColumnExpr>, value: impl Into<Value>) -> Self {
        Self::compare(expr, CompareOp::Gte, value)
    }

    #[must_use]
    pub fn in_(expr: impl Into<ColumnExpr>, values: Vec<Value>) -> Self {
        Self::compare(expr, CompareOp::In, Value::List(values))
    }

    #[must_use]
    pub fn not_in(expr: impl Into<ColumnExpr>, values: Vec<Value>) -> Self {
        Self::compare(expr, CompareOp::NotIn, Value::List(values))
    }

    #[must_use]
    pub fn is_null(expr: impl Into<ColumnExpr>) -> Self {
        Self::IsNull(expr.into())
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}
