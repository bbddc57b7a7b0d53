use crate::{error::SummarizeError, relation::Relation};
use serde::{Deserialize, Serialize};

///
/// SummarizeConfig
///
/// Caller-facing switches for one summarize invocation.
///
/// `pure`: `None` infers purity from the base relation (grouped → pure,
/// otherwise impure). `noop`: run every aggregate immediately and
/// individually, bypassing batching.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SummarizeConfig {
    #[serde(default)]
    pub pure: Option<bool>,
    #[serde(default)]
    pub noop: bool,
}

impl SummarizeConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pure: None,
            noop: false,
        }
    }

    #[must_use]
    pub const fn pure(mut self, pure: bool) -> Self {
        self.pure = Some(pure);
        self
    }

    #[must_use]
    pub const fn noop(mut self, noop: bool) -> Self {
        self.noop = noop;
        self
    }

    /// Effective purity against `base`.
    pub fn resolve_purity(&self, base: &Relation) -> Result<bool, SummarizeError> {
        if base.is_grouped() {
            if self.pure == Some(false) {
                return Err(SummarizeError::invalid_mode(
                    "impure computations are unsupported over a grouped relation",
                ));
            }
            return Ok(true);
        }

        Ok(self.pure.unwrap_or(false))
    }

    /// Reject switch combinations with no defined behavior against `base`
    /// and return the effective purity.
    pub fn validate(&self, base: &Relation) -> Result<bool, SummarizeError> {
        if self.noop && base.is_grouped() {
            return Err(SummarizeError::invalid_mode(
                "noop mode is unsupported over a grouped relation",
            ));
        }

        self.resolve_purity(base)
    }
}
