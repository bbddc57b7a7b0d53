use crate::{
    relation::{
        BackendError,
        expr::ColumnExpr,
        predicate::{CompareOp, ComparePredicate, Predicate},
    },
    value::{Value, strict_order_cmp},
};
use std::{cmp::Ordering, collections::BTreeMap};

///
/// FieldPresence
///
/// Result of attempting to read a column from a source row. Distinguishes a
/// missing column from a present column whose value may be `Value::Null`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) enum FieldPresence<'a> {
    Present(&'a Value),
    Missing,
}

///
/// Row
///
/// Abstraction over a row-like value that can expose columns by name.
///

pub(super) trait Row {
    fn field(&self, name: &str) -> FieldPresence<'_>;
}

///
/// SourceRow
///
/// One joined source row; base columns are addressable unqualified and
/// qualified by table name, joined columns by association name.
///

#[derive(Clone, Debug, Default)]
pub(super) struct SourceRow {
    columns: BTreeMap<String, Value>,
}

impl SourceRow {
    pub(super) fn insert(&mut self, name: String, value: Value) {
        self.columns.insert(name, value);
    }
}

impl Row for SourceRow {
    fn field(&self, name: &str) -> FieldPresence<'_> {
        self.columns
            .get(name)
            .map_or(FieldPresence::Missing, FieldPresence::Present)
    }
}

/// Evaluate a column expression against one row.
pub(super) fn eval_column<R: Row + ?Sized>(
    row: &R,
    expr: &ColumnExpr,
) -> Result<Value, BackendError> {
    match expr {
        ColumnExpr::Field(name) => match row.field(name) {
            FieldPresence::Present(value) => Ok(value.clone()),
            FieldPresence::Missing => Err(BackendError::UnknownColumn {
                column: name.clone(),
            }),
        },
        ColumnExpr::Literal(value) => Ok(value.clone()),
        ColumnExpr::Length(inner) => match eval_column(row, inner)? {
            Value::Null => Ok(Value::Null),
            Value::Text(text) => Ok(Value::Int(
                i64::try_from(text.chars().count()).unwrap_or(i64::MAX),
            )),
            other => Err(BackendError::Execution {
                message: format!("LENGTH expects text, found {}", other.kind_name()),
            }),
        },
        ColumnExpr::Case {
            when,
            then,
            otherwise,
        } => {
            if eval_predicate(row, when)? == Some(true) {
                eval_column(row, then)
            } else {
                eval_column(row, otherwise)
            }
        }
    }
}

///
/// Evaluate a predicate with SQL three-valued logic.
///
/// `None` is UNKNOWN: any comparison involving NULL, or an ordering
/// comparison between incomparable values. Only `Some(true)` selects a row.
///
pub(super) fn eval_predicate<R: Row + ?Sized>(
    row: &R,
    predicate: &Predicate,
) -> Result<Option<bool>, BackendError> {
    Ok(match predicate {
        Predicate::True => Some(true),
        Predicate::False => Some(false),

        Predicate::And(children) => {
            let mut out = Some(true);
            for child in children {
                match eval_predicate(row, child)? {
                    Some(false) => return Ok(Some(false)),
                    None => out = None,
                    Some(true) => {}
                }
            }
            out
        }
        Predicate::Or(children) => {
            let mut out = Some(false);
            for child in children {
                match eval_predicate(row, child)? {
                    Some(true) => return Ok(Some(true)),
                    None => out = None,
                    Some(false) => {}
                }
            }
            out
        }
        Predicate::Not(inner) => eval_predicate(row, inner)?.map(|v| !v),

        Predicate::Compare(cmp) => eval_compare(row, cmp)?,
        Predicate::IsNull(expr) => Some(eval_column(row, expr)?.is_null()),
    })
}

fn eval_compare<R: Row + ?Sized>(
    row: &R,
    cmp: &ComparePredicate,
) -> Result<Option<bool>, BackendError> {
    let ComparePredicate { expr, op, value } = cmp;
    let actual = eval_column(row, expr)?;
    if actual.is_null() || value.is_null() {
        return Ok(None);
    }

    Ok(match op {
        CompareOp::Eq => Some(values_equal(&actual, value)),
        CompareOp::Ne => Some(!values_equal(&actual, value)),

        CompareOp::Lt => strict_order_cmp(&actual, value).map(Ordering::is_lt),
        CompareOp::Lte => strict_order_cmp(&actual, value).map(Ordering::is_le),
        CompareOp::Gt => strict_order_cmp(&actual, value).map(Ordering::is_gt),
        CompareOp::Gte => strict_order_cmp(&actual, value).map(Ordering::is_ge),

        CompareOp::In => in_list(&actual, value),
        CompareOp::NotIn => in_list(&actual, value).map(|found| !found),
    })
}

fn values_equal(left: &Value, right: &Value) -> bool {
    strict_order_cmp(left, right).map_or_else(|| left == right, Ordering::is_eq)
}

fn in_list(actual: &Value, list: &Value) -> Option<bool> {
    let Value::List(items) = list else {
        return None;
    };

    Some(items.iter().any(|item| values_equal(actual, item)))
}
