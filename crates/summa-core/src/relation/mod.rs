//! Module: relation
//! Responsibility: the query vocabulary exchanged with backends: predicates,
//! filters, column expressions, relations and the combined grouped fetch.
//! Does not own: execution; backends implement `Backend`.

pub mod expr;
pub mod fetch;
pub mod filter;
pub mod predicate;
pub mod sql;


use crate::model::{AssociationModel, EntityModel};
use std::fmt;
use thiserror::Error as ThisError;

// re-exports
pub use expr::{AggregateExpr, AggregateFunc, ColumnExpr};
pub use fetch::{Backend, BackendError, FetchOutput, GroupedFetch, SelectExpr, SelectItem};
pub use filter::Filter;
pub use predicate::{CompareOp, ComparePredicate, Predicate};

///
/// RelationError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RelationError {
    #[error("entity '{entity}' has no association '{name}'")]
    UnknownAssociation { entity: &'static str, name: String },

    #[error("association '{name}' on '{entity}' is not a foreign-key reference")]
    NotAReference { entity: &'static str, name: String },
}

///
/// JoinKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
}

///
/// Join
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub association: &'static AssociationModel,
}

///
/// GroupColumn
///
/// One grouping column. `reference` is set when the column is the foreign
/// key of a `belongs_to` association grouped by association name.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupColumn {
    pub expr: ColumnExpr,
    pub reference: Option<&'static AssociationModel>,
}

impl GroupColumn {
    #[must_use]
    pub const fn new(expr: ColumnExpr) -> Self {
        Self {
            expr,
            reference: None,
        }
    }
}

///
/// ShapePart
///
/// Structural component of a relation that must match for two relations to
/// be merged with OR.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShapePart {
    Entity,
    Joins,
    LeftOuterJoins,
}

impl fmt::Display for ShapePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity => write!(f, "entity"),
            Self::Joins => write!(f, "joins"),
            Self::LeftOuterJoins => write!(f, "left_outer_joins"),
        }
    }
}

///
/// ShapeMismatch
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShapeMismatch {
    pub parts: Vec<ShapePart>,
    pub detail: String,
}

///
/// Relation
///
/// A filterable, groupable view over one entity.
/// Relations are immutable values; every refinement returns a new relation.
///

#[derive(Clone, Debug)]
pub struct Relation {
    entity: &'static EntityModel,
    joins: Vec<Join>,
    filter: Filter,
    groups: Vec<GroupColumn>,
    distinct: bool,
}

impl Relation {
    #[must_use]
    pub const fn new(entity: &'static EntityModel) -> Self {
        Self {
            entity,
            joins: Vec::new(),
            filter: Filter::new(),
            groups: Vec::new(),
            distinct: false,
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    #[must_use]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    #[must_use]
    pub const fn filter_clauses(&self) -> &Filter {
        &self.filter
    }

    #[must_use]
    pub fn groups(&self) -> &[GroupColumn] {
        &self.groups
    }

    #[must_use]
    pub const fn is_grouped(&self) -> bool {
        !self.groups.is_empty()
    }

    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    // ------------------------------------------------------------------
    // Refinement
    // ------------------------------------------------------------------

    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = self.filter.and(predicate);
        self
    }

    #[must_use]
    pub fn group(mut self, expr: impl Into<ColumnExpr>) -> Self {
        self.groups.push(GroupColumn::new(expr.into()));
        self
    }

    /// Group by a `belongs_to` association; results key on referenced entities.
    pub fn group_association(mut self, name: &str) -> Result<Self, RelationError> {
        let association = self.association(name)?;
        let foreign_key = association
            .foreign_key()
            .ok_or_else(|| RelationError::NotAReference {
                entity: self.entity.entity_name,
                name: name.to_string(),
            })?;

        self.groups.push(GroupColumn {
            expr: ColumnExpr::field(foreign_key),
            reference: Some(association),
        });

        Ok(self)
    }

    pub fn joins_association(self, name: &str) -> Result<Self, RelationError> {
        self.join(JoinKind::Inner, name)
    }

    pub fn left_joins_association(self, name: &str) -> Result<Self, RelationError> {
        self.join(JoinKind::LeftOuter, name)
    }

    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Drop every grouping column, keeping source and filter.
    #[must_use]
    pub fn ungrouped(mut self) -> Self {
        self.groups.clear();
        self
    }

    fn join(mut self, kind: JoinKind, name: &str) -> Result<Self, RelationError> {
        let association = self.association(name)?;
        let join = Join { kind, association };
        if !self.joins.contains(&join) {
            self.joins.push(join);
        }

        Ok(self)
    }

    fn association(&self, name: &str) -> Result<&'static AssociationModel, RelationError> {
        self.entity
            .association(name)
            .ok_or_else(|| RelationError::UnknownAssociation {
                entity: self.entity.entity_name,
                name: name.to_string(),
            })
    }

    // ------------------------------------------------------------------
    // Structural compatibility
    // ------------------------------------------------------------------

    /// Check that `other` reads from the same entity through the same joins,
    /// so the two relations' filters can be merged with OR.
    pub fn check_compatible(&self, other: &Self) -> Result<(), ShapeMismatch> {
        let mut parts = Vec::new();
        let mut detail = Vec::new();

        if !self.entity.is(other.entity) {
            parts.push(ShapePart::Entity);
            detail.push(format!(
                "entity: {} vs {}",
                self.entity.entity_name, other.entity.entity_name
            ));
        }

        for (part, kind) in [
            (ShapePart::Joins, JoinKind::Inner),
            (ShapePart::LeftOuterJoins, JoinKind::LeftOuter),
        ] {
            let left = self.join_names(kind);
            let right = other.join_names(kind);
            if left != right {
                parts.push(part);
                detail.push(format!("{part}: [{}] vs [{}]", left.join(", "), right.join(", ")));
            }
        }

        if parts.is_empty() {
            Ok(())
        } else {
            Err(ShapeMismatch {
                parts,
                detail: detail.join("; "),
            })
        }
    }

    fn join_names(&self, kind: JoinKind) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .joins
            .iter()
            .filter(|join| join.kind == kind)
            .map(|join| join.association.name)
            .collect();
        names.sort_unstable();
        names
    }
}
