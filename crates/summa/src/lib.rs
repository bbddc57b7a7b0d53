//! ## Crate layout
//! - `core`: values, relations, the deferred result graph, the summarize
//!   orchestrator, the in-memory backend, and observability.
//!
//! The `prelude` module carries what a summarize computation needs.

pub use summa_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::{
    backend::MemoryBackend,
    error::{ErrorClass, SummarizeError},
    summarize::{Summarize, SummarizeConfig},
};

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        deferred::{Deferred, Tree},
        error::SummarizeError,
        model::{AssociationKind, AssociationModel, EntityModel, FieldKind, FieldModel},
        relation::{Backend, ColumnExpr, Predicate, Relation},
        summarize::{Committed, Scope, Summarize, SummarizeConfig, SummarizingProxy},
        value::Value,
    };
}
