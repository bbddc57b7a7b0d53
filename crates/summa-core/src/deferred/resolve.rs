use crate::{error::SummarizeError, value::Value};
use std::collections::HashMap;

///
/// ResolveContext
///
/// State scoped to one resolution pass: the memoization switch, the current
/// bucket's row of per-request values, and the memo cache.
///
/// Passed explicitly through every `resolve` call; there is no ambient
/// resolution state.
///

#[derive(Debug, Default)]
pub struct ResolveContext<'row> {
    memoize: bool,
    row: Option<&'row [Value]>,
    memo: HashMap<u64, Value>,
}

impl<'row> ResolveContext<'row> {
    /// Memoizing context; each node runs its operation at most once.
    #[must_use]
    pub fn memoized() -> Self {
        Self {
            memoize: true,
            ..Self::default()
        }
    }

    /// Non-memoizing context; every access re-runs the node's operation.
    #[must_use]
    pub fn uncached() -> Self {
        Self::default()
    }

    /// Bind the row that slot nodes read from.
    #[must_use]
    pub const fn with_row(mut self, row: &'row [Value]) -> Self {
        self.row = Some(row);
        self
    }

    #[must_use]
    pub const fn memoize(&self) -> bool {
        self.memoize
    }

    pub(super) fn slot(&self, index: usize) -> Result<Value, SummarizeError> {
        let row = self
            .row
            .ok_or_else(|| SummarizeError::invariant("aggregate read before the combined fetch ran"))?;

        row.get(index).cloned().ok_or_else(|| {
            SummarizeError::invariant(format!(
                "aggregate slot {index} out of range for a row of {}",
                row.len()
            ))
        })
    }

    pub(super) fn cached(&self, key: u64) -> Option<Value> {
        if self.memoize {
            self.memo.get(&key).cloned()
        } else {
            None
        }
    }

    pub(super) fn store(&mut self, key: u64, value: &Value) {
        if self.memoize {
            self.memo.insert(key, value.clone());
        }
    }
}
