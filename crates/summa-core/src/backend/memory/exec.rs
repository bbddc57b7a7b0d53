use crate::{
    backend::memory::{
        Table,
        eval::{SourceRow, eval_column, eval_predicate},
    },
    model::{AssociationKind, EntityModel},
    relation::{
        BackendError, Join, JoinKind,
        expr::{AggregateExpr, AggregateFunc},
        fetch::{FetchOutput, GroupedFetch, SelectExpr},
    },
    value::{Value, canonical_cmp, strict_order_cmp},
};
use std::collections::BTreeMap;

///
/// TableLookup
///

pub(super) trait TableLookup {
    fn table(&self, entity: &EntityModel) -> Result<&Table, BackendError>;
}

/// Execute one grouped fetch against in-memory tables.
pub(super) fn execute<L: TableLookup + ?Sized>(
    tables: &L,
    fetch: &GroupedFetch,
) -> Result<FetchOutput, BackendError> {
    validate_group_by(fetch)?;

    let mut matched = Vec::new();
    for row in source_rows(tables, fetch.entity, &fetch.joins)? {
        if eval_predicate(&row, &fetch.filter)? == Some(true) {
            matched.push(row);
        }
    }

    let rows = if fetch.group_by.is_empty() && !fetch.has_aggregates() {
        matched
            .iter()
            .map(|row| project(fetch, &[row]))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        grouped_rows(fetch, &matched)?
    };

    // single-column projections come back flattened, like a pluck
    if fetch.projection.len() == 1 {
        Ok(FetchOutput::Column(
            rows.into_iter().filter_map(|row| row.into_iter().next()).collect(),
        ))
    } else {
        Ok(FetchOutput::Rows(rows))
    }
}

fn validate_group_by(fetch: &GroupedFetch) -> Result<(), BackendError> {
    for &ordinal in &fetch.group_by {
        let item = ordinal
            .checked_sub(1)
            .and_then(|at| fetch.projection.get(at))
            .ok_or(BackendError::InvalidOrdinal { ordinal })?;
        if !matches!(item.expr, SelectExpr::Column(_)) {
            return Err(BackendError::InvalidOrdinal { ordinal });
        }
    }

    Ok(())
}

fn grouped_rows(fetch: &GroupedFetch, rows: &[SourceRow]) -> Result<Vec<Vec<Value>>, BackendError> {
    let mut groups: BTreeMap<Vec<Value>, Vec<&SourceRow>> = BTreeMap::new();
    if fetch.group_by.is_empty() {
        // ungrouped aggregates always produce one row
        groups.insert(Vec::new(), rows.iter().collect());
    } else {
        for row in rows {
            let mut key = Vec::with_capacity(fetch.group_by.len());
            for &ordinal in &fetch.group_by {
                if let SelectExpr::Column(expr) = &fetch.projection[ordinal - 1].expr {
                    key.push(eval_column(row, expr)?);
                }
            }
            groups.entry(key).or_default().push(row);
        }
    }

    groups
        .values()
        .map(|members| project(fetch, members))
        .collect()
}

fn project(fetch: &GroupedFetch, members: &[&SourceRow]) -> Result<Vec<Value>, BackendError> {
    fetch
        .projection
        .iter()
        .map(|item| match &item.expr {
            SelectExpr::Column(expr) => members
                .first()
                .map_or(Ok(Value::Null), |row| eval_column(*row, expr)),
            SelectExpr::Aggregate(agg) => aggregate(agg, members),
        })
        .collect()
}

/// Aggregate with SQL semantics: NULL inputs are ignored, SUM/MIN/MAX over
/// no non-null input is NULL, COUNT over no input is 0.
fn aggregate(agg: &AggregateExpr, members: &[&SourceRow]) -> Result<Value, BackendError> {
    let mut inputs = Vec::with_capacity(members.len());
    for row in members {
        let value = eval_column(*row, &agg.arg)?;
        if !value.is_null() {
            inputs.push(value);
        }
    }

    match agg.func {
        AggregateFunc::Count => Ok(Value::Int(i64::try_from(inputs.len()).unwrap_or(i64::MAX))),
        AggregateFunc::Sum => {
            let mut iter = inputs.into_iter();
            let Some(first) = iter.next() else {
                return Ok(Value::Null);
            };
            iter.try_fold(first, |acc, value| {
                acc.checked_add(&value)
                    .map_err(|err| BackendError::Execution {
                        message: err.to_string(),
                    })
            })
        }
        AggregateFunc::Min => Ok(extremum(inputs, std::cmp::Ordering::Less)),
        AggregateFunc::Max => Ok(extremum(inputs, std::cmp::Ordering::Greater)),
    }
}

fn extremum(inputs: Vec<Value>, keep: std::cmp::Ordering) -> Value {
    inputs
        .into_iter()
        .reduce(|best, value| {
            let cmp = strict_order_cmp(&value, &best).unwrap_or_else(|| canonical_cmp(&value, &best));
            if cmp == keep { value } else { best }
        })
        .unwrap_or(Value::Null)
}

// Build joined source rows, applying joins in declaration order.
fn source_rows<L: TableLookup + ?Sized>(
    tables: &L,
    entity: &'static EntityModel,
    joins: &[Join],
) -> Result<Vec<SourceRow>, BackendError> {
    let base = tables.table(entity)?;
    let mut rows: Vec<SourceRow> = base
        .records()
        .map(|record| {
            let mut row = SourceRow::default();
            for (field, value) in entity.fields.iter().zip(record) {
                row.insert(field.name.to_string(), value.clone());
                row.insert(format!("{}.{}", entity.table, field.name), value.clone());
            }
            row
        })
        .collect();

    for join in joins {
        rows = apply_join(tables, entity, join, rows)?;
    }

    Ok(rows)
}

fn apply_join<L: TableLookup + ?Sized>(
    tables: &L,
    owner: &'static EntityModel,
    join: &Join,
    rows: Vec<SourceRow>,
) -> Result<Vec<SourceRow>, BackendError> {
    let assoc = join.association;
    let target = assoc.target;
    let target_table = tables.table(target)?;

    let (local_column, target_column) = match assoc.kind {
        AssociationKind::BelongsTo { foreign_key } => (foreign_key, target.primary_key),
        AssociationKind::HasMany { foreign_key } => (owner.primary_key, foreign_key),
    };
    let target_index = target_table.column_index(target_column)?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let local = eval_column(&row, &local_column.into())?;
        let matches: Vec<&Vec<Value>> = if local.is_null() {
            Vec::new()
        } else {
            target_table
                .records()
                .filter(|record| record[target_index] == local)
                .collect()
        };

        if matches.is_empty() {
            if join.kind == JoinKind::LeftOuter {
                let mut row = row;
                for field in target.fields {
                    row.insert(format!("{}.{}", assoc.name, field.name), Value::Null);
                }
                out.push(row);
            }
            continue;
        }

        for record in matches {
            let mut joined = row.clone();
            for (field, value) in target.fields.iter().zip(record) {
                joined.insert(format!("{}.{}", assoc.name, field.name), value.clone());
            }
            out.push(joined);
        }
    }

    Ok(out)
}
