//! Core runtime for summa: values, relations, the deferred result graph, and
//! the batching summarize orchestrator.

// public exports are one module level down
pub mod backend;
pub mod deferred;
pub mod error;
pub mod model;
pub mod obs;
pub mod relation;
pub mod summarize;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Vocabulary needed to write a summarize computation.
///

pub mod prelude {
    pub use crate::{
        deferred::{Deferred, Tree},
        error::SummarizeError,
        relation::{ColumnExpr, Predicate, Relation},
        summarize::{Summarize, SummarizeConfig},
        value::Value,
    };
}
