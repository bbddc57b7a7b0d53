use crate::{
    error::SummarizeError,
    summarize::{plan::BatchPlan, request::AggregationRequest, shape::group_key},
    value::Value,
};
use std::collections::BTreeMap;

///
/// Bucket
///
/// Per-request results for one base grouping tuple, in registration order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bucket {
    pub key: Vec<Value>,
    pub values: Vec<Value>,
}

///
/// Accumulator
///

#[derive(Clone, Debug)]
enum Accumulator {
    Scalar(Value),
    Grouped(BTreeMap<Value, Value>),
}

impl Accumulator {
    fn new(request: &AggregationRequest) -> Self {
        if request.sub_groups().is_empty() {
            Self::Scalar(request.op().identity())
        } else {
            Self::Grouped(BTreeMap::new())
        }
    }

    fn fold(
        &mut self,
        request: &AggregationRequest,
        positions: &[usize],
        row: &[Value],
        value: &Value,
    ) -> Result<(), SummarizeError> {
        let op = request.op();
        match self {
            Self::Scalar(memo) => *memo = op.reduce(memo, value)?,
            Self::Grouped(map) => {
                let key = group_key(positions.iter().map(|&at| row[at].clone()).collect());
                let identity = op.identity();
                let current = map.get(&key).unwrap_or(&identity);
                let next = op.reduce(current, value)?;

                // untouched keys stay absent
                if &next != current {
                    map.insert(key, next);
                }
            }
        }

        Ok(())
    }

    fn finish(self) -> Value {
        match self {
            Self::Scalar(value) => value,
            Self::Grouped(map) => Value::from_map(map),
        }
    }
}

/// Split the combined fetch's rows into per-request values, bucketed by the
/// base grouping tuple.
///
/// An ungrouped base always yields exactly one bucket, even over zero rows.
pub fn redistribute(
    plan: &BatchPlan,
    requests: &[AggregationRequest],
    rows: Vec<Vec<Value>>,
) -> Result<Vec<Bucket>, SummarizeError> {
    if plan.request_count() != requests.len() {
        return Err(SummarizeError::invariant(format!(
            "plan covers {} requests but {} were registered",
            plan.request_count(),
            requests.len()
        )));
    }

    let width = plan.group_width() + requests.len();
    let mut buckets: BTreeMap<Vec<Value>, Vec<Accumulator>> = BTreeMap::new();

    if plan.base_width() == 0 && rows.is_empty() {
        buckets.insert(Vec::new(), requests.iter().map(Accumulator::new).collect());
    }

    for row in rows {
        if row.len() != width {
            return Err(SummarizeError::invariant(format!(
                "combined fetch returned {} columns, expected {width}",
                row.len()
            )));
        }

        let key = row[..plan.base_width()].to_vec();
        let accumulators = buckets
            .entry(key)
            .or_insert_with(|| requests.iter().map(Accumulator::new).collect());

        for (index, (request, accumulator)) in requests.iter().zip(accumulators).enumerate() {
            let value = &row[plan.group_width() + index];
            accumulator.fold(request, plan.positions(index), &row, value)?;
        }
    }

    Ok(buckets
        .into_iter()
        .map(|(key, accumulators)| Bucket {
            key,
            values: accumulators.into_iter().map(Accumulator::finish).collect(),
        })
        .collect())
}
