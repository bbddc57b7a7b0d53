use crate::{relation::predicate::Predicate, value::Value};

///
/// ColumnExpr
///
/// Scalar column expression evaluated per source row.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ColumnExpr {
    /// A column of the base entity (`age`) or of a joined association
    /// (`favorite_color.name`).
    Field(String),
    Literal(Value),
    /// Character length of a text expression.
    Length(Box<Self>),
    /// `CASE WHEN when THEN then ELSE otherwise END`
    Case {
        when: Box<Predicate>,
        then: Box<Self>,
        otherwise: Box<Self>,
    },
}

impl ColumnExpr {
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn length(expr: impl Into<Self>) -> Self {
        Self::Length(Box::new(expr.into()))
    }

    /// Build a conditional column expression.
    #[must_use]
    pub fn case(when: Predicate, then: impl Into<Self>, otherwise: impl Into<Self>) -> Self {
        Self::Case {
            when: Box::new(when),
            then: Box::new(then.into()),
            otherwise: Box::new(otherwise.into()),
        }
    }
}

impl From<&str> for ColumnExpr {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for ColumnExpr {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<Value> for ColumnExpr {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

///
/// AggregateFunc
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Min,
    Max,
}

impl AggregateFunc {
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

///
/// AggregateExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AggregateExpr {
    pub func: AggregateFunc,
    pub arg: ColumnExpr,
}

impl AggregateExpr {
    #[must_use]
    pub const fn new(func: AggregateFunc, arg: ColumnExpr) -> Self {
        Self { func, arg }
    }
}
