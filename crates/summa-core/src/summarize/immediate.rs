use crate::{
    error::SummarizeError,
    obs::metrics::{self, MetricsEvent},
    relation::{AggregateExpr, Backend, ColumnExpr, GroupedFetch, Relation, SelectItem},
    summarize::{request::AggregateOp, shape::group_key},
    value::Value,
};

/// Run one aggregate on its own, outside any batch.
///
/// Count and sum over no matching rows come back as zero rather than
/// `Null`. A grouped relation yields a map keyed like a batched sub-group.
pub(crate) fn fetch_aggregate(
    backend: &dyn Backend,
    relation: &Relation,
    op: AggregateOp,
    expr: &ColumnExpr,
) -> Result<Value, SummarizeError> {
    let groups = relation.groups();
    let mut projection: Vec<SelectItem> = groups
        .iter()
        .map(|column| SelectItem::column(column.expr.clone()))
        .collect();
    projection.push(SelectItem::aggregate(
        AggregateExpr::new(op.func(), expr.clone()),
        "agg_0".to_string(),
    ));

    let fetch = GroupedFetch {
        entity: relation.entity(),
        joins: relation.joins().to_vec(),
        filter: relation.filter_clauses().to_predicate(),
        projection,
        group_by: (1..=groups.len()).collect(),
    };

    let rows = backend.fetch(&fetch)?.into_rows();
    metrics::record(MetricsEvent::Fetch {
        rows: u64::try_from(rows.len()).unwrap_or(u64::MAX),
    });

    if groups.is_empty() {
        let value = rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or(Value::Null);
        return Ok(coalesce(op, value));
    }

    let width = groups.len();
    let mut entries = Vec::with_capacity(rows.len());
    for mut row in rows {
        if row.len() != width + 1 {
            return Err(SummarizeError::invariant(format!(
                "aggregate fetch returned {} columns, expected {}",
                row.len(),
                width + 1
            )));
        }
        let value = row.pop().unwrap_or(Value::Null);
        entries.push((group_key(row), coalesce(op, value)));
    }

    Ok(Value::from_map(entries))
}

fn coalesce(op: AggregateOp, value: Value) -> Value {
    match op {
        AggregateOp::Count | AggregateOp::Sum if value.is_null() => op.identity(),
        _ => value,
    }
}
