use crate::{
    model::EntityModel,
    relation::{
        Join,
        expr::{AggregateExpr, ColumnExpr},
        predicate::Predicate,
    },
    value::Value,
};
use thiserror::Error as ThisError;

///
/// Backend
///
/// The one execution capability required from the storage layer: run a
/// single grouped fetch and return its raw rows. Backends own cancellation,
/// timeouts, connections and transactions.
///

pub trait Backend {
    fn fetch(&self, fetch: &GroupedFetch) -> Result<FetchOutput, BackendError>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn fetch(&self, fetch: &GroupedFetch) -> Result<FetchOutput, BackendError> {
        (**self).fetch(fetch)
    }
}

///
/// BackendError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BackendError {
    #[error("unknown table '{table}'")]
    UnknownTable { table: String },

    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    #[error("GROUP BY ordinal {ordinal} does not reference a projected column")]
    InvalidOrdinal { ordinal: usize },

    #[error("value {value:?} rejected by column '{column}'")]
    InvalidValue { column: String, value: Value },

    #[error("execution failed: {message}")]
    Execution { message: String },
}

///
/// SelectExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectExpr {
    Column(ColumnExpr),
    Aggregate(AggregateExpr),
}

///
/// SelectItem
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectItem {
    pub expr: SelectExpr,
    pub alias: Option<String>,
}

impl SelectItem {
    #[must_use]
    pub const fn column(expr: ColumnExpr) -> Self {
        Self {
            expr: SelectExpr::Column(expr),
            alias: None,
        }
    }

    #[must_use]
    pub const fn aggregate(expr: AggregateExpr, alias: String) -> Self {
        Self {
            expr: SelectExpr::Aggregate(expr),
            alias: Some(alias),
        }
    }
}

///
/// GroupedFetch
///
/// One SELECT over an entity and its joins.
///
/// `group_by` holds 1-based ordinals into `projection`; each must reference a
/// `SelectExpr::Column`. With an empty `group_by` and at least one aggregate
/// the fetch yields exactly one row, even over zero matching source rows.
/// With no aggregates it yields one row per matching source row.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupedFetch {
    pub entity: &'static EntityModel,
    pub joins: Vec<Join>,
    pub filter: Predicate,
    pub projection: Vec<SelectItem>,
    pub group_by: Vec<usize>,
}

impl GroupedFetch {
    #[must_use]
    pub fn has_aggregates(&self) -> bool {
        self.projection
            .iter()
            .any(|item| matches!(item.expr, SelectExpr::Aggregate(_)))
    }
}

///
/// FetchOutput
///
/// Raw fetch result. Backends may flatten single-column projections into
/// `Column`; consumers normalize with `into_rows`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FetchOutput {
    Rows(Vec<Vec<Value>>),
    Column(Vec<Value>),
}

impl FetchOutput {
    /// Normalize into uniform rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<Value>> {
        match self {
            Self::Rows(rows) => rows,
            Self::Column(values) => values.into_iter().map(|value| vec![value]).collect(),
        }
    }
}
