use crate::{
    backend::MemoryBackend,
    model::{AssociationKind, AssociationModel, EntityModel, FieldKind, FieldModel},
    value::Value,
};

///
/// Models
///
/// Small people/colors schema shared by unit tests.
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
    ],
    associations: &[AssociationModel {
        name: "favorite_color",
        kind: AssociationKind::BelongsTo {
            foreign_key: "favorite_color_id",
        },
        target: &COLOR,
    }],
};

/// Rows: (name, age, number_of_cats, favorite_color_id).
pub const PEOPLE: &[(&str, Option<f64>, i64, Option<i64>)] = &[
    ("ann", Some(30.0), 2, Some(1)),
    ("bob", Some(41.0), 0, Some(2)),
    ("cyd", None, 1, Some(1)),
    ("dee", Some(25.5), 3, None),
    ("eve", Some(30.0), 0, Some(2)),
    ("flo", Some(60.0), 1, Some(3)),
];

/// Backend holding three colors and the `PEOPLE` rows.
pub fn seeded_backend() -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    backend.register(&COLOR).register(&PERSON);

    for name in ["red", "green", "blue"] {
        backend
            .insert(&COLOR, [("name", Value::from(name))])
            .expect("color insert");
    }

    for &(name, age, cats, color) in PEOPLE {
        backend
            .insert(
                &PERSON,
                [
                    ("name", Value::from(name)),
                    ("age", Value::from(age)),
                    ("number_of_cats", Value::from(cats)),
                    ("favorite_color_id", Value::from(color)),
                ],
            )
            .expect("person insert");
    }

    backend
}
