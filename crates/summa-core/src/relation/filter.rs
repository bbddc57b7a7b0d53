use crate::relation::predicate::Predicate;
use derive_more::Deref;

///
/// Filter
///
/// Ordered conjunction of filter clauses carried by a relation.
/// Supports clause-wise equality and set-difference so the planner can tell
/// which clauses a request adds on top of its base relation.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct Filter {
    clauses: Vec<Predicate>,
}

impl Filter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Append one clause; `Predicate::True` is a no-op.
    #[must_use]
    pub fn and(mut self, clause: Predicate) -> Self {
        if clause != Predicate::True {
            self.clauses.push(clause);
        }

        self
    }

    /// Clauses of `self` that `base` does not carry, in order.
    #[must_use]
    pub fn difference(&self, base: &Self) -> Self {
        Self {
            clauses: self
                .clauses
                .iter()
                .filter(|clause| !base.clauses.contains(clause))
                .cloned()
                .collect(),
        }
    }

    /// Collapse the conjunction into one predicate.
    #[must_use]
    pub fn to_predicate(&self) -> Predicate {
        match self.clauses.as_slice() {
            [] => Predicate::True,
            [only] => only.clone(),
            many => Predicate::And(many.to_vec()),
        }
    }

    /// Merge filters with logical OR, dropping exact duplicates.
    ///
    /// An empty filter matches every row, so it absorbs the disjunction.
    #[must_use]
    pub fn any_of<'a>(filters: impl IntoIterator<Item = &'a Self>) -> Predicate {
        let mut distinct: Vec<&Self> = Vec::new();
        for filter in filters {
            if filter.is_empty() {
                return Predicate::True;
            }
            if !distinct.contains(&filter) {
                distinct.push(filter);
            }
        }

        match distinct.as_slice() {
            [] => Predicate::False,
            [only] => only.to_predicate(),
            many => Predicate::Or(many.iter().map(|filter| filter.to_predicate()).collect()),
        }
    }
}
