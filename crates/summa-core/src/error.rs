use crate::{
    relation::{BackendError, RelationError, ShapeMismatch, ShapePart},
    value::ValueError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// SummarizeError
///
/// Every error is fatal to the current invocation and surfaced unchanged;
/// nothing is retried and no partial result is returned.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SummarizeError {
    #[error(
        "relation must be structurally compatible with the base relation; incompatible values: [{}] ({detail})",
        join_parts(.parts)
    )]
    StructuralIncompatibility {
        parts: Vec<ShapePart>,
        detail: String,
    },

    #[error("unsupported aggregate: {reason}")]
    UnsupportedAggregate { reason: String },

    #[error("cannot start a summarize computation inside another summarize computation")]
    IllegalNesting,

    #[error("invalid mode: {reason}")]
    InvalidMode { reason: String },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Relation(#[from] RelationError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("computation failed: {message}")]
    Computation { message: String },

    #[error("invariant violation: {message}")]
    Invariant { message: String },
}

impl SummarizeError {
    pub(crate) fn invalid_mode(reason: impl Into<String>) -> Self {
        Self::InvalidMode {
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }

    /// Build a failure for a caller-supplied closure.
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation {
            message: message.into(),
        }
    }

    /// Classify the error for tracing and metrics.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::StructuralIncompatibility { .. }
            | Self::IllegalNesting
            | Self::InvalidMode { .. }
            | Self::Relation(_)
            | Self::Value(_)
            | Self::Computation { .. } => ErrorClass::User,
            Self::UnsupportedAggregate { .. } => ErrorClass::Unsupported,
            Self::Backend(_) => ErrorClass::Backend,
            Self::Invariant { .. } => ErrorClass::Internal,
        }
    }
}

impl From<ShapeMismatch> for SummarizeError {
    fn from(mismatch: ShapeMismatch) -> Self {
        Self::StructuralIncompatibility {
            parts: mismatch.parts,
            detail: mismatch.detail,
        }
    }
}

fn join_parts(parts: &[ShapePart]) -> String {
    parts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    User,
    Unsupported,
    Backend,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::User => "user",
            Self::Unsupported => "unsupported",
            Self::Backend => "backend",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}
