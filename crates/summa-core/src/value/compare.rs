use crate::value::Value;
use std::cmp::Ordering;

/// Total canonical comparator used by grouping keys, map normalization and
/// result ordering.
///
/// Ordering rules:
/// 1. Canonical variant rank (`Int` and `Float64` share the numeric rank)
/// 2. Variant-specific comparison for same-ranked values
///
/// Numerically equal `Int`/`Float64` pairs tie-break with `Int` first so the
/// ordering stays consistent with `Eq`.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

/// Strict comparator for orderable scalar pairs.
///
/// Returns `None` for `Null`, collections, and mismatched variants.
/// `Int` and `Float64` compare numerically.
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Float64(_) | Value::Int(_), Value::Float64(_) | Value::Int(_)) => {
            let (a, b) = (left.as_f64()?, right.as_f64()?);
            a.partial_cmp(&b)
        }
        _ => None,
    }
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Float64(a), Value::Float64(b)) => a.cmp(b),
        (Value::Int(_), Value::Float64(_)) => {
            strict_order_cmp(left, right).map_or(Ordering::Less, |cmp| cmp.then(Ordering::Less))
        }
        (Value::Float64(_), Value::Int(_)) => strict_order_cmp(left, right)
            .map_or(Ordering::Greater, |cmp| cmp.then(Ordering::Greater)),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::List(a), Value::List(b)) => canonical_cmp_value_list(a, b),
        (Value::Map(a), Value::Map(b)) => canonical_cmp_value_map(a, b),
        _ => Ordering::Equal,
    }
}

fn canonical_cmp_value_list(left: &[Value], right: &[Value]) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp(left, right);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

fn canonical_cmp_value_map(left: &[(Value, Value)], right: &[(Value, Value)]) -> Ordering {
    for ((left_key, left_value), (right_key, right_value)) in left.iter().zip(right.iter()) {
        let key_cmp = canonical_cmp(left_key, right_key);
        if key_cmp != Ordering::Equal {
            return key_cmp;
        }

        let value_cmp = canonical_cmp(left_value, right_value);
        if value_cmp != Ordering::Equal {
            return value_cmp;
        }
    }

    left.len().cmp(&right.len())
}
