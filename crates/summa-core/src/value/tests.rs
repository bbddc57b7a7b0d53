use super::*;

#[test]
fn float64_rejects_non_finite_and_normalizes_negative_zero() {
    assert!(Float64::try_new(f64::NAN).is_none());
    assert!(Float64::try_new(f64::INFINITY).is_none());

    let zero = Float64::try_new(-0.0).expect("finite");
    assert_eq!(zero.get().to_bits(), 0.0f64.to_bits());
    assert_eq!(Value::from(f64::NAN), Value::Null);
}

#[test]
fn from_map_sorts_and_later_duplicates_win() {
    let map = Value::from_map([
        (Value::Int(3), Value::from("c")),
        (Value::Int(1), Value::from("a")),
        (Value::Int(3), Value::from("z")),
    ]);

    assert_eq!(
        map,
        Value::Map(vec![
            (Value::Int(1), Value::from("a")),
            (Value::Int(3), Value::from("z")),
        ])
    );
    assert_eq!(map.get(&Value::Int(3)), Some(&Value::from("z")));
    assert_eq!(map.get(&Value::Int(2)), None);
}

#[test]
fn canonical_order_ranks_null_first_and_mixes_numbers() {
    let mut values = vec![
        Value::from("b"),
        Value::Int(2),
        Value::Null,
        Value::from(1.5),
        Value::Bool(true),
    ];
    values.sort();

    assert_eq!(
        values,
        vec![
            Value::Null,
            Value::Bool(true),
            Value::from(1.5),
            Value::Int(2),
            Value::from("b"),
        ]
    );
}

#[test]
fn canonical_order_breaks_numeric_ties_int_first() {
    assert_eq!(
        canonical_cmp(&Value::Int(1), &Value::from(1.0)),
        Ordering::Less
    );
    assert_ne!(Value::Int(1), Value::from(1.0));
}

#[test]
fn strict_order_refuses_mismatched_kinds() {
    assert_eq!(strict_order_cmp(&Value::Null, &Value::Int(1)), None);
    assert_eq!(strict_order_cmp(&Value::from("a"), &Value::Int(1)), None);
    assert_eq!(
        strict_order_cmp(&Value::Int(2), &Value::from(1.5)),
        Some(Ordering::Greater)
    );
}

#[test]
fn checked_arithmetic_propagates_null_and_detects_overflow() {
    assert_eq!(Value::Int(2).checked_add(&Value::Int(3)), Ok(Value::Int(5)));
    assert_eq!(Value::Null.checked_add(&Value::Int(3)), Ok(Value::Null));
    assert_eq!(
        Value::Int(2).checked_add(&Value::from(0.5)),
        Ok(Value::from(2.5))
    );
    assert_eq!(
        Value::Int(i64::MAX).checked_add(&Value::Int(1)),
        Err(ValueError::Overflow { op: "add" })
    );
    assert!(matches!(
        Value::from("a").checked_mul(&Value::Int(1)),
        Err(ValueError::TypeMismatch { op: "mul", .. })
    ));
}

#[test]
fn division_is_always_float_and_rejects_zero() {
    assert_eq!(Value::Int(7).checked_div(&Value::Int(2)), Ok(Value::from(3.5)));
    assert_eq!(
        Value::Int(7).checked_div(&Value::Int(0)),
        Err(ValueError::DivisionByZero)
    );
    assert_eq!(Value::Null.checked_div(&Value::Int(0)), Ok(Value::Null));
}

#[test]
fn round_only_touches_floats() {
    assert_eq!(Value::from(2.345_67).round(2), Ok(Value::from(2.35)));
    assert_eq!(Value::Int(4).round(2), Ok(Value::Int(4)));
    assert_eq!(Value::Null.round(2), Ok(Value::Null));
    assert!(Value::from("x").round(2).is_err());
}

#[test]
fn serde_round_trips_nested_values() {
    let value = Value::from_map([
        (Value::from("ages"), Value::List(vec![Value::from(1.5), Value::Null])),
        (Value::from("count"), Value::Int(3)),
    ]);

    let json = serde_json::to_string(&value).expect("serialize");
    let back: Value = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(back, value);
}

mod ordering_laws {
    use super::*;
    use proptest::prelude::*;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-50i64..50).prop_map(Value::Int),
            (-100i32..100).prop_map(|halves| Value::from(f64::from(halves) / 2.0)),
            "[a-c]{0,3}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn canonical_cmp_is_antisymmetric_and_agrees_with_eq(a in scalar(), b in scalar()) {
            let forward = canonical_cmp(&a, &b);

            prop_assert_eq!(forward, canonical_cmp(&b, &a).reverse());
            prop_assert_eq!(forward == Ordering::Equal, a == b);
        }

        #[test]
        fn canonical_cmp_sorts_transitively(mut values in prop::collection::vec(scalar(), 0..24)) {
            values.sort_by(canonical_cmp);

            for (i, left) in values.iter().enumerate() {
                for right in &values[i..] {
                    prop_assert_ne!(canonical_cmp(left, right), Ordering::Greater);
                }
            }
        }

        #[test]
        fn from_map_yields_strictly_ordered_unique_keys(
            entries in prop::collection::vec((scalar(), scalar()), 0..16),
        ) {
            let map = Value::from_map(entries);
            let pairs = map.as_map().expect("map");

            for window in pairs.windows(2) {
                prop_assert_eq!(canonical_cmp(&window[0].0, &window[1].0), Ordering::Less);
            }
            prop_assert_eq!(Value::from_map(pairs.to_vec()), map.clone());
        }
    }
}
