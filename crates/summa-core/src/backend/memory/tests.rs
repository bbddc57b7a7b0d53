use super::*;
use crate::{
    relation::{AggregateExpr, AggregateFunc, ColumnExpr, Join, JoinKind, Predicate, SelectItem},
    test_fixtures::{COLOR, PERSON, seeded_backend},
};

fn aggregate(func: AggregateFunc, column: &str) -> SelectItem {
    SelectItem::aggregate(
        AggregateExpr::new(func, ColumnExpr::field(column)),
        "agg".to_string(),
    )
}

fn fetch(projection: Vec<SelectItem>, filter: Predicate, group_by: Vec<usize>) -> GroupedFetch {
    GroupedFetch {
        entity: &PERSON,
        joins: Vec::new(),
        filter,
        projection,
        group_by,
    }
}

#[test]
fn insert_assigns_sequential_keys_and_validates_columns() {
    let mut backend = MemoryBackend::new();
    backend.register(&COLOR);

    assert_eq!(
        backend.insert(&COLOR, [("name", Value::from("red"))]),
        Ok(Value::Int(1))
    );
    assert_eq!(
        backend.insert(&COLOR, [("id", Value::Int(10)), ("name", Value::from("tan"))]),
        Ok(Value::Int(10))
    );
    assert_eq!(
        backend.insert(&COLOR, [("name", Value::from("blue"))]),
        Ok(Value::Int(11))
    );

    assert!(matches!(
        backend.insert(&COLOR, [("name", Value::Int(3))]),
        Err(BackendError::InvalidValue { .. })
    ));
    assert!(matches!(
        backend.insert(&COLOR, [("shade", Value::from("dark"))]),
        Err(BackendError::UnknownColumn { .. })
    ));
    assert!(matches!(
        backend.insert(&PERSON, [("name", Value::from("x"))]),
        Err(BackendError::UnknownTable { .. })
    ));
}

#[test]
fn ungrouped_aggregates_return_one_row_even_when_nothing_matches() {
    let backend = seeded_backend();
    let output = backend
        .fetch(&fetch(
            vec![
                aggregate(AggregateFunc::Count, "id"),
                aggregate(AggregateFunc::Sum, "number_of_cats"),
                aggregate(AggregateFunc::Max, "age"),
            ],
            Predicate::False,
            Vec::new(),
        ))
        .expect("fetch");

    assert_eq!(
        output,
        FetchOutput::Rows(vec![vec![Value::Int(0), Value::Null, Value::Null]])
    );
}

#[test]
fn aggregates_ignore_nulls() {
    let backend = seeded_backend();
    let output = backend
        .fetch(&fetch(
            vec![
                aggregate(AggregateFunc::Count, "age"),
                aggregate(AggregateFunc::Sum, "age"),
                aggregate(AggregateFunc::Min, "age"),
            ],
            Predicate::True,
            Vec::new(),
        ))
        .expect("fetch");

    assert_eq!(
        output,
        FetchOutput::Rows(vec![vec![
            Value::Int(5),
            Value::from(186.5),
            Value::from(25.5),
        ]])
    );
}

#[test]
fn single_column_projection_comes_back_flattened() {
    let backend = seeded_backend();
    let output = backend
        .fetch(&fetch(
            vec![aggregate(AggregateFunc::Sum, "number_of_cats")],
            Predicate::gte("number_of_cats", 1),
            Vec::new(),
        ))
        .expect("fetch");

    assert_eq!(output, FetchOutput::Column(vec![Value::Int(7)]));
}

#[test]
fn grouped_fetch_groups_by_ordinal_including_null_keys() {
    let backend = seeded_backend();
    let rows = backend
        .fetch(&fetch(
            vec![
                SelectItem::column(ColumnExpr::field("favorite_color_id")),
                aggregate(AggregateFunc::Count, "id"),
            ],
            Predicate::True,
            vec![1],
        ))
        .expect("fetch")
        .into_rows();

    assert_eq!(
        rows,
        vec![
            vec![Value::Null, Value::Int(1)],
            vec![Value::Int(1), Value::Int(2)],
            vec![Value::Int(2), Value::Int(2)],
            vec![Value::Int(3), Value::Int(1)],
        ]
    );
}

#[test]
fn group_by_must_reference_a_projected_column() {
    let backend = seeded_backend();

    for group_by in [vec![2], vec![3], vec![0]] {
        let err = backend
            .fetch(&fetch(
                vec![
                    SelectItem::column(ColumnExpr::field("favorite_color_id")),
                    aggregate(AggregateFunc::Count, "id"),
                ],
                Predicate::True,
                group_by,
            ))
            .expect_err("invalid ordinal");
        assert!(matches!(err, BackendError::InvalidOrdinal { .. }));
    }
}

#[test]
fn comparisons_against_null_never_match() {
    let backend = seeded_backend();
    let matched = |filter: Predicate| {
        backend
            .fetch(&fetch(vec![aggregate(AggregateFunc::Count, "id")], filter, Vec::new()))
            .expect("fetch")
            .into_rows()
    };

    assert_eq!(matched(Predicate::lt("age", 100)), vec![vec![Value::Int(5)]]);
    assert_eq!(
        matched(Predicate::not(Predicate::lt("age", 100))),
        vec![vec![Value::Int(0)]]
    );
    assert_eq!(matched(Predicate::is_null("age")), vec![vec![Value::Int(1)]]);
    assert_eq!(
        matched(Predicate::in_("favorite_color_id", vec![Value::Int(1), Value::Int(3)])),
        vec![vec![Value::Int(3)]]
    );
}

#[test]
fn case_expressions_select_per_row() {
    let backend = seeded_backend();
    let arg = ColumnExpr::case(
        Predicate::eq("favorite_color_id", 2),
        ColumnExpr::field("number_of_cats"),
        ColumnExpr::literal(Value::Int(0)),
    );
    let output = backend
        .fetch(&fetch(
            vec![SelectItem::aggregate(
                AggregateExpr::new(AggregateFunc::Sum, ColumnExpr::length("name")),
                "agg_0".to_string(),
            ), SelectItem::aggregate(
                AggregateExpr::new(AggregateFunc::Sum, arg),
                "agg_1".to_string(),
            )],
            Predicate::True,
            Vec::new(),
        ))
        .expect("fetch");

    assert_eq!(
        output,
        FetchOutput::Rows(vec![vec![Value::Int(18), Value::Int(0)]])
    );
}

#[test]
fn inner_and_left_outer_joins_expose_association_columns() {
    let backend = seeded_backend();
    let association = PERSON.association("favorite_color").expect("association");
    let count_by_color = |kind: JoinKind| GroupedFetch {
        entity: &PERSON,
        joins: vec![Join { kind, association }],
        filter: Predicate::True,
        projection: vec![
            SelectItem::column(ColumnExpr::field("favorite_color.name")),
            aggregate(AggregateFunc::Count, "id"),
        ],
        group_by: vec![1],
    };

    let inner = backend
        .fetch(&count_by_color(JoinKind::Inner))
        .expect("inner")
        .into_rows();
    assert_eq!(
        inner,
        vec![
            vec![Value::from("blue"), Value::Int(1)],
            vec![Value::from("green"), Value::Int(2)],
            vec![Value::from("red"), Value::Int(2)],
        ]
    );

    let outer = backend
        .fetch(&count_by_color(JoinKind::LeftOuter))
        .expect("left outer")
        .into_rows();
    assert_eq!(outer.len(), 4);
    assert_eq!(outer[0], vec![Value::Null, Value::Int(1)]);
}

#[test]
fn fetches_are_counted() {
    let backend = seeded_backend();
    assert_eq!(backend.fetch_count(), 0);

    let query = fetch(vec![aggregate(AggregateFunc::Count, "id")], Predicate::True, Vec::new());
    backend.fetch(&query).expect("fetch");
    backend.fetch(&query).expect("fetch");
    assert_eq!(backend.fetch_count(), 2);

    backend.reset_fetch_count();
    assert_eq!(backend.fetch_count(), 0);
}
