//! Runtime entity models.
//!
//! Models are declared as `static` items by the embedding application and
//! referenced by relations, backends and the final result fix-up. They
//! describe *what exists*; relations describe *what is asked*.

pub mod entity;
pub mod field;

pub use entity::{AssociationKind, AssociationModel, EntityModel};
pub use field::{FieldKind, FieldModel};
