//! Final result shaping shared by the batched and immediate paths.

use crate::{
    error::SummarizeError,
    model::AssociationModel,
    obs::metrics::{self, MetricsEvent},
    relation::{Backend, ColumnExpr, GroupedFetch, Predicate, Relation, SelectItem},
    value::Value,
};
use std::collections::BTreeMap;

/// Key for one grouping tuple: a scalar for one column, a list otherwise.
pub(crate) fn group_key(mut columns: Vec<Value>) -> Value {
    if columns.len() == 1 {
        columns.pop().unwrap_or(Value::Null)
    } else {
        Value::List(columns)
    }
}

/// Collapse per-bucket results into the caller-facing value.
///
/// No base grouping yields the single bucket's bare value. One grouping
/// column keys by scalar, or by the referenced entity when the column is an
/// association reference. Several columns key by tuple.
pub(crate) fn finalize(
    backend: &dyn Backend,
    base: &Relation,
    buckets: Vec<(Vec<Value>, Value)>,
) -> Result<Value, SummarizeError> {
    match base.groups() {
        [] => {
            let mut buckets = buckets.into_iter();
            match (buckets.next(), buckets.next()) {
                (Some((_, value)), None) => Ok(value),
                _ => Err(SummarizeError::invariant(
                    "ungrouped summarize must produce exactly one bucket",
                )),
            }
        }
        [column] => {
            let entries = buckets.into_iter().map(|(key, value)| (group_key(key), value));
            match column.reference {
                Some(association) => replace_references(backend, association, entries.collect()),
                None => Ok(Value::from_map(entries)),
            }
        }
        _ => Ok(Value::from_map(
            buckets
                .into_iter()
                .map(|(key, value)| (Value::List(key), value)),
        )),
    }
}

// One lookup fetch by primary key; keys with no referenced row become Null.
fn replace_references(
    backend: &dyn Backend,
    association: &AssociationModel,
    entries: Vec<(Value, Value)>,
) -> Result<Value, SummarizeError> {
    let target = association.target;
    let keys: Vec<Value> = entries
        .iter()
        .map(|(key, _)| key.clone())
        .filter(|key| !key.is_null())
        .collect();

    let mut records = BTreeMap::new();
    if !keys.is_empty() {
        let pk_at = target
            .fields
            .iter()
            .position(|field| field.name == target.primary_key)
            .ok_or_else(|| {
                SummarizeError::invariant(format!(
                    "entity '{}' does not list its primary key",
                    target.entity_name
                ))
            })?;

        let fetch = GroupedFetch {
            entity: target,
            joins: Vec::new(),
            filter: Predicate::in_(target.primary_key, keys),
            projection: target
                .fields
                .iter()
                .map(|field| SelectItem::column(ColumnExpr::field(field.name)))
                .collect(),
            group_by: Vec::new(),
        };

        let rows = backend.fetch(&fetch)?.into_rows();
        metrics::record(MetricsEvent::Fetch {
            rows: u64::try_from(rows.len()).unwrap_or(u64::MAX),
        });

        for row in rows {
            let key = row.get(pk_at).cloned().unwrap_or(Value::Null);
            let record = Value::record(
                target
                    .fields
                    .iter()
                    .map(|field| field.name)
                    .zip(row),
            );
            records.insert(key, record);
        }
    }

    Ok(Value::from_map(entries.into_iter().map(|(key, value)| {
        let record = records.get(&key).cloned().unwrap_or(Value::Null);
        (record, value)
    })))
}
