#![allow(dead_code)]

use proptest::{
    prelude::Rng,
    test_runner::{RngAlgorithm, TestRng},
};
use summa::prelude::*;
use summa::MemoryBackend;

pub const PEOPLE_COUNT: usize = 500;

pub const COLOR_NAMES: [&str; 7] = ["red", "orange", "yellow", "green", "blue", "indigo", "violet"];

const SILLY_WORDS: [&str; 12] = [
    "wobble", "snork", "fizz", "bumble", "quark", "noodle", "zazzle", "plonk", "grumble", "twirl",
    "splat", "doodle",
];

///
/// Models
///

pub static COLOR: EntityModel = EntityModel {
    entity_name: "Color",
    table: "colors",
    primary_key: "id",
    fields: &[
        FieldModel {
            name: "id",
            kind: FieldKind::Int,
            nullable: false,
        },
        FieldModel {
            name: "name",
            kind: FieldKind::Text,
            nullable: false,
        },
    ],
    associations: &[AssociationModel {
        name: "people",
        kind: AssociationKind::HasMany {
            foreign_key: "favorite_color_id",
        },
        target: &PERSON,
    }],
};

pub static PERSON: EntityModel = EntityModel {
    entity_name: "Person",
    table: "people",
    primary_key: "id",
    fields: &[
        FieldModel {
            name: "id",
            kind: FieldKind::Int,
            nullable: false,
        },
        FieldModel {
            name: "name",
            kind: FieldKind::Text,
            nullable: false,
        },
        FieldModel {
            name: "age",
            kind: FieldKind::Float64,
            nullable: true,
        },
        FieldModel {
            name: "number_of_cats",
            kind: FieldKind::Int,
            nullable: false,
        },
        FieldModel {
            name: "favorite_color_id",
            kind: FieldKind::Int,
            nullable: true,
        },
        FieldModel {
            name: "least_favorite_color_id",
            kind: FieldKind::Int,
            nullable: true,
        },
    ],
    associations: &[
        AssociationModel {
            name: "favorite_color",
            kind: AssociationKind::BelongsTo {
                foreign_key: "favorite_color_id",
            },
            target: &COLOR,
        },
        AssociationModel {
            name: "least_favorite_color",
            kind: AssociationKind::BelongsTo {
                foreign_key: "least_favorite_color_id",
            },
            target: &COLOR,
        },
    ],
};

///
/// Person
///
/// Plain copy of each inserted row, used to compute expected results
/// independently of any backend.
///

#[derive(Clone, Debug)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: Option<f64>,
    pub number_of_cats: i64,
    pub favorite_color_id: Option<i64>,
    pub least_favorite_color_id: Option<i64>,
}

///
/// Fixture
///

pub struct Fixture {
    pub backend: MemoryBackend,
    pub people: Vec<Person>,
}

impl Fixture {
    /// 500 people with deterministic pseudo-random attributes.
    pub fn seeded() -> Self {
        let mut rng = TestRng::deterministic_rng(RngAlgorithm::ChaCha);
        let mut pick = |n: u64| rng.next_u64() % n;

        let people = (0..PEOPLE_COUNT)
            .map(|_| {
                let first = SILLY_WORDS[usize::try_from(pick(12)).expect("index")];
                let second = SILLY_WORDS[usize::try_from(pick(12)).expect("index")];
                let age = if pick(10) == 0 {
                    None
                } else {
                    let halves = u8::try_from(pick(125)).expect("age");
                    Some(18.0 + f64::from(halves) / 2.0)
                };

                Person {
                    id: 0,
                    name: format!("{first} {second}"),
                    age,
                    number_of_cats: i64::try_from(pick(4)).expect("cats"),
                    favorite_color_id: Some(i64::try_from(pick(7) + 1).expect("color")),
                    least_favorite_color_id: Some(i64::try_from(pick(7) + 1).expect("color")),
                }
            })
            .collect();

        Self::with_people(people)
    }

    /// Load `people` (ids are assigned on insert) and the seven colors.
    pub fn with_people(mut people: Vec<Person>) -> Self {
        let mut backend = MemoryBackend::new();
        backend.register(&COLOR).register(&PERSON);

        for name in COLOR_NAMES {
            backend
                .insert(&COLOR, [("name", Value::from(name))])
                .expect("color insert");
        }

        for person in &mut people {
            let id = backend
                .insert(
                    &PERSON,
                    [
                        ("name", Value::from(person.name.as_str())),
                        ("age", Value::from(person.age)),
                        ("number_of_cats", Value::from(person.number_of_cats)),
                        ("favorite_color_id", Value::from(person.favorite_color_id)),
                        (
                            "least_favorite_color_id",
                            Value::from(person.least_favorite_color_id),
                        ),
                    ],
                )
                .expect("person insert");
            person.id = id.as_i64().expect("integer key");
        }

        Self { backend, people }
    }

    pub fn relation(&self) -> Relation {
        Relation::new(&PERSON)
    }

    pub fn summarize(&self) -> Summarize<'_> {
        Summarize::new(&self.backend, self.relation())
    }
}

/// Build a map value from `(key, value)` pairs.
pub fn map<K: Into<Value>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Value {
    Value::from_map(
        entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into())),
    )
}

/// Round every float in a result so differently ordered summations compare.
pub fn rounded(value: &Value) -> Value {
    match value {
        Value::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), rounded(value)))
                .collect(),
        ),
        Value::List(items) => Value::List(items.iter().map(rounded).collect()),
        Value::Float64(_) => value.round(10).expect("round"),
        other => other.clone(),
    }
}
