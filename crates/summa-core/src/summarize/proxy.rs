use crate::{
    deferred::{Deferred, Tree},
    error::SummarizeError,
    relation::{ColumnExpr, Predicate, Relation},
    summarize::{request::AggregateOp, scope::Scope},
    value::Value,
};
use std::fmt;

///
/// SummarizingProxy
///
/// Relation-like view handed to summarize computations. Aggregates return
/// deferred nodes instead of values; refinements return a new proxy over the
/// refined relation. Nothing outside this capability set can be called.
///

#[derive(Clone)]
pub struct SummarizingProxy<'s> {
    scope: &'s Scope<'s>,
    relation: Relation,
}

impl<'s> SummarizingProxy<'s> {
    pub(crate) const fn new(scope: &'s Scope<'s>, relation: Relation) -> Self {
        Self { scope, relation }
    }

    #[must_use]
    pub const fn relation(&self) -> &Relation {
        &self.relation
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    /// Row count, counting the primary key.
    pub fn count(&self) -> Result<Deferred, SummarizeError> {
        let pk = self.relation.entity().primary_key;
        self.count_of(ColumnExpr::field(pk))
    }

    /// Count of non-null values of `expr`.
    pub fn count_of(&self, expr: impl Into<ColumnExpr>) -> Result<Deferred, SummarizeError> {
        self.scope
            .aggregate(AggregateOp::Count, expr.into(), &self.relation)
    }

    pub fn sum(&self, expr: impl Into<ColumnExpr>) -> Result<Deferred, SummarizeError> {
        self.scope
            .aggregate(AggregateOp::Sum, expr.into(), &self.relation)
    }

    pub fn minimum(&self, expr: impl Into<ColumnExpr>) -> Result<Deferred, SummarizeError> {
        self.scope
            .aggregate(AggregateOp::Minimum, expr.into(), &self.relation)
    }

    pub fn maximum(&self, expr: impl Into<ColumnExpr>) -> Result<Deferred, SummarizeError> {
        self.scope
            .aggregate(AggregateOp::Maximum, expr.into(), &self.relation)
    }

    /// Mean of `expr`, derived from a sum and a count; `Null` where nothing
    /// was counted.
    pub fn average(&self, expr: impl Into<ColumnExpr>) -> Result<Deferred, SummarizeError> {
        self.scope.average(expr.into(), &self.relation)
    }

    // ------------------------------------------------------------------
    // Refinement
    // ------------------------------------------------------------------

    #[must_use]
    pub fn filter(&self, predicate: Predicate) -> Self {
        self.refine(self.relation.clone().filter(predicate))
    }

    #[must_use]
    pub fn group(&self, expr: impl Into<ColumnExpr>) -> Self {
        self.refine(self.relation.clone().group(expr))
    }

    /// Sub-group by a `belongs_to` association's foreign key.
    pub fn group_association(&self, name: &str) -> Result<Self, SummarizeError> {
        Ok(self.refine(self.relation.clone().group_association(name)?))
    }

    pub fn joins(&self, name: &str) -> Result<Self, SummarizeError> {
        Ok(self.refine(self.relation.clone().joins_association(name)?))
    }

    pub fn left_joins(&self, name: &str) -> Result<Self, SummarizeError> {
        Ok(self.refine(self.relation.clone().left_joins_association(name)?))
    }

    /// DISTINCT relations are accepted here but cannot be aggregated.
    #[must_use]
    pub fn distinct(&self) -> Self {
        self.refine(self.relation.clone().distinct())
    }

    /// Summarize computations cannot nest.
    pub fn summarize<F, T>(&self, _computation: F) -> Result<Value, SummarizeError>
    where
        F: FnOnce(&Scope<'_>) -> Result<T, SummarizeError>,
        T: Into<Tree>,
    {
        Err(SummarizeError::IllegalNesting)
    }

    fn refine(&self, relation: Relation) -> Self {
        Self {
            scope: self.scope,
            relation,
        }
    }
}

impl fmt::Debug for SummarizingProxy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizingProxy")
            .field("relation", &self.relation)
            .finish_non_exhaustive()
    }
}
