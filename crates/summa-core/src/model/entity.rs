use crate::model::field::FieldModel;
use std::fmt;

///
/// EntityModel
/// Minimal runtime model for one entity (one backing table).
///

pub struct EntityModel {
    /// Stable external name used in diagnostics.
    pub entity_name: &'static str,
    /// Backing table name.
    pub table: &'static str,
    /// Primary key field name (must name an entry in `fields`).
    pub primary_key: &'static str,
    /// Ordered field list.
    pub fields: &'static [FieldModel],
    /// Associations reachable by name for joins and association grouping.
    pub associations: &'static [AssociationModel],
}

impl EntityModel {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn association(&self, name: &str) -> Option<&'static AssociationModel> {
        self.associations.iter().find(|assoc| assoc.name == name)
    }

    /// Identity comparison; models are unique statics.
    #[must_use]
    pub fn is(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.table == other.table
    }
}

impl PartialEq for EntityModel {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for EntityModel {}

// Associations may point back at their owner, so Debug stays shallow.
impl fmt::Debug for EntityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityModel")
            .field("entity_name", &self.entity_name)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

///
/// AssociationModel
///

pub struct AssociationModel {
    /// Association name, also the qualifier of joined columns (`name.field`).
    pub name: &'static str,
    pub kind: AssociationKind,
    /// Referenced entity.
    pub target: &'static EntityModel,
}

impl AssociationModel {
    /// Return the local column holding the referenced key, if the association
    /// is a plain foreign-key reference.
    #[must_use]
    pub const fn foreign_key(&self) -> Option<&'static str> {
        match self.kind {
            AssociationKind::BelongsTo { foreign_key } => Some(foreign_key),
            AssociationKind::HasMany { .. } => None,
        }
    }
}

impl PartialEq for AssociationModel {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind && self.target.is(other.target)
    }
}

impl Eq for AssociationModel {}

impl fmt::Debug for AssociationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssociationModel")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("target", &self.target.entity_name)
            .finish()
    }
}

///
/// AssociationKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssociationKind {
    /// The owner carries `foreign_key`, pointing at the target's primary key.
    BelongsTo { foreign_key: &'static str },
    /// The target carries `foreign_key`, pointing at the owner's primary key.
    HasMany { foreign_key: &'static str },
}
