use crate::value::Value;

///
/// FieldModel
/// Runtime field metadata used by backends and validation.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Field (column) name as used in predicates and projections.
    pub name: &'static str,
    /// Runtime type shape.
    pub kind: FieldKind,
    /// Whether the column accepts `Value::Null`.
    pub nullable: bool,
}

impl FieldModel {
    /// Return whether `value` can be stored in this field.
    #[must_use]
    pub const fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.nullable,
            _ => self.kind.accepts(value),
        }
    }
}

///
/// FieldKind
///
/// Scalar type surface, aligned with `Value` variants.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Bool,
    Float64,
    Int,
    Text,
}

impl FieldKind {
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Bool, Value::Bool(_))
                | (Self::Float64, Value::Float64(_) | Value::Int(_))
                | (Self::Int, Value::Int(_))
                | (Self::Text, Value::Text(_))
        )
    }
}
