mod compare;
mod float;
mod ops;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// re-exports
pub use compare::{canonical_cmp, strict_order_cmp};
pub use float::Float64;
pub use ops::ValueError;

///
/// Value
///
/// Runtime value exchanged with backends, carried through the deferred graph,
/// and returned to callers.
///
/// Null   → SQL NULL, and "no value" for extrema over empty input.
/// List   → ordered values; also used for multi-column group keys.
/// Map    → canonical map, entries sorted by canonical key order, keys unique.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Value {
    Bool(bool),
    Float64(Float64),
    Int(i64),
    List(Vec<Self>),
    Map(Vec<(Self, Self)>),
    Null,
    Text(String),
}

impl Value {
    ///
    /// CONSTRUCTORS
    ///

    /// Build a canonical map; later duplicates of a key replace earlier ones.
    #[must_use]
    pub fn from_map(entries: impl IntoIterator<Item = (Self, Self)>) -> Self {
        let mut out: Vec<(Self, Self)> = Vec::new();
        for (key, value) in entries {
            match out.binary_search_by(|(probe, _)| canonical_cmp(probe, &key)) {
                Ok(at) => out[at].1 = value,
                Err(at) => out.insert(at, (key, value)),
            }
        }

        Self::Map(out)
    }

    /// Build a canonical map keyed by text labels.
    #[must_use]
    pub fn record<K: Into<String>>(entries: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::from_map(
            entries
                .into_iter()
                .map(|(key, value)| (Self::Text(key.into()), value)),
        )
    }

    ///
    /// INSPECTION
    ///

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float64(v) => Some(v.get()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&[(Self, Self)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up one map entry by key.
    #[must_use]
    pub fn get(&self, key: &Self) -> Option<&Self> {
        let entries = self.as_map()?;
        entries
            .binary_search_by(|(probe, _)| canonical_cmp(probe, key))
            .ok()
            .map(|at| &entries[at].1)
    }

    /// Look up one map entry by text label.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Self> {
        self.get(&Self::Text(name.to_string()))
    }

    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Float64(_) => "float64",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Null => "null",
            Self::Text(_) => "text",
        }
    }

    pub(crate) const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float64(_) => 2,
            Self::Text(_) => 3,
            Self::List(_) => 4,
            Self::Map(_) => 5,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(self, other)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

///
/// CONVERSIONS
///

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

/// Non-finite floats have no canonical representation and become `Null`.
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Float64::try_new(v).map_or(Self::Null, Self::Float64)
    }
}

impl From<Float64> for Value {
    fn from(v: Float64) -> Self {
        Self::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
