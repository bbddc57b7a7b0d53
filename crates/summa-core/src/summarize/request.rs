use crate::{
    error::SummarizeError,
    relation::{AggregateExpr, AggregateFunc, ColumnExpr, Filter, GroupColumn, Relation},
    value::{Value, strict_order_cmp},
};
use std::{cmp::Ordering, fmt};

///
/// AggregateOp
///
/// Primitive aggregates that can be redistributed out of one combined fetch.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AggregateOp {
    Count,
    Sum,
    Minimum,
    Maximum,
}

impl AggregateOp {
    #[must_use]
    pub const fn func(self) -> AggregateFunc {
        match self {
            Self::Count => AggregateFunc::Count,
            Self::Sum => AggregateFunc::Sum,
            Self::Minimum => AggregateFunc::Min,
            Self::Maximum => AggregateFunc::Max,
        }
    }

    /// Starting accumulator value.
    #[must_use]
    pub const fn identity(self) -> Value {
        match self {
            Self::Count | Self::Sum => Value::Int(0),
            Self::Minimum | Self::Maximum => Value::Null,
        }
    }

    /// Value projected for rows matching the combined filter but not this
    /// request's own filter.
    #[must_use]
    pub const fn unmatched(self) -> Value {
        match self {
            Self::Sum => Value::Int(0),
            Self::Count | Self::Minimum | Self::Maximum => Value::Null,
        }
    }

    /// Fold one raw value into an accumulator.
    ///
    /// Count and sum coalesce `Null` to zero; extrema skip it.
    pub fn reduce(self, memo: &Value, value: &Value) -> Result<Value, SummarizeError> {
        match self {
            Self::Count | Self::Sum => {
                let zero = Value::Int(0);
                let value = if value.is_null() { &zero } else { value };
                let memo = if memo.is_null() { &zero } else { memo };
                Ok(memo.checked_add(value)?)
            }
            Self::Minimum => Ok(extremum(memo, value, Ordering::Less)),
            Self::Maximum => Ok(extremum(memo, value, Ordering::Greater)),
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
        };
        write!(f, "{label}")
    }
}

fn extremum(memo: &Value, value: &Value, keep: Ordering) -> Value {
    if value.is_null() {
        return memo.clone();
    }
    if memo.is_null() {
        return value.clone();
    }

    match strict_order_cmp(value, memo) {
        Some(ordering) if ordering == keep => value.clone(),
        _ => memo.clone(),
    }
}

///
/// AggregationRequest
///
/// One registered aggregate: an operation over a column expression, bound to
/// the refined relation it was requested on. Immutable once registered.
///

#[derive(Clone, Debug)]
pub struct AggregationRequest {
    op: AggregateOp,
    expr: ColumnExpr,
    relation: Relation,
}

impl AggregationRequest {
    /// Build a request; DISTINCT relations cannot be redistributed.
    pub fn new(
        op: AggregateOp,
        expr: impl Into<ColumnExpr>,
        relation: Relation,
    ) -> Result<Self, SummarizeError> {
        if relation.is_distinct() {
            return Err(SummarizeError::UnsupportedAggregate {
                reason: format!(
                    "{op} over a distinct relation cannot be redistributed across sub-groupings"
                ),
            });
        }

        Ok(Self {
            op,
            expr: expr.into(),
            relation,
        })
    }

    #[must_use]
    pub const fn op(&self) -> AggregateOp {
        self.op
    }

    #[must_use]
    pub const fn expr(&self) -> &ColumnExpr {
        &self.expr
    }

    #[must_use]
    pub const fn relation(&self) -> &Relation {
        &self.relation
    }

    #[must_use]
    pub const fn filter(&self) -> &Filter {
        self.relation.filter_clauses()
    }

    #[must_use]
    pub fn sub_groups(&self) -> &[GroupColumn] {
        self.relation.groups()
    }

    /// Aggregate to project in the combined fetch.
    ///
    /// A request filtered exactly like the base aggregates its column
    /// directly; otherwise rows outside its own filter contribute the
    /// unmatched value through a `CASE` expression.
    #[must_use]
    pub fn select_expression(&self, base_filter: &Filter) -> AggregateExpr {
        if self.filter() == base_filter {
            return AggregateExpr::new(self.op.func(), self.expr.clone());
        }

        let own = self.filter().difference(base_filter).to_predicate();
        let arg = ColumnExpr::case(
            own,
            self.expr.clone(),
            ColumnExpr::literal(self.op.unmatched()),
        );

        AggregateExpr::new(self.op.func(), arg)
    }
}
