//! Module: deferred
//! Responsibility: the lazy result graph. Nodes stand in for values that are
//! not known until the combined fetch has run, compose freely during capture,
//! and are forced once per result bucket.
//! Does not own: fetching or redistribution; slot values are supplied by the
//! orchestrator through `ResolveContext`.

mod ops;
mod resolve;
mod tree;


use crate::{error::SummarizeError, value::Value};
use std::{
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

// re-exports
pub use resolve::ResolveContext;
pub use tree::{Tree, wrap};

type TransformFn = dyn Fn(Value) -> Result<Value, SummarizeError>;
type CombineFn = dyn Fn(Vec<Value>) -> Result<Value, SummarizeError>;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

///
/// Deferred
///
/// Shared handle to one node of the graph. Cloning is cheap and preserves
/// node identity, so memoization sees every clone as the same node.
///
/// The graph is acyclic by construction: a node can only reference nodes
/// that already exist.
///

#[derive(Clone)]
pub struct Deferred {
    node: Rc<Node>,
}

///
/// Node
///
/// `id` is unique for the life of the process and keys the memo cache.
///

struct Node {
    id: u64,
    kind: NodeKind,
}

// Long chains drop iteratively instead of recursing once per node.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = self.kind.take_sources();
        while let Some(source) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(source.node) {
                pending.extend(node.kind.take_sources());
            }
        }
    }
}

///
/// NodeKind
///

enum NodeKind {
    /// Already-realized value.
    Leaf(Value),

    /// Position in the current bucket's row of per-request values.
    Slot(usize),

    Transform {
        source: Deferred,
        op: Box<TransformFn>,
    },

    Combine {
        sources: Vec<Deferred>,
        op: Box<CombineFn>,
    },

    List(Vec<Deferred>),

    Map(Vec<(Value, Deferred)>),
}

impl NodeKind {
    fn sources(&self) -> Vec<&Deferred> {
        match self {
            Self::Leaf(_) | Self::Slot(_) => Vec::new(),
            Self::Transform { source, .. } => vec![source],
            Self::Combine { sources, .. } | Self::List(sources) => sources.iter().collect(),
            Self::Map(entries) => entries.iter().map(|(_, node)| node).collect(),
        }
    }

    fn take_sources(&mut self) -> Vec<Deferred> {
        match std::mem::replace(self, Self::Slot(0)) {
            Self::Leaf(_) | Self::Slot(_) => Vec::new(),
            Self::Transform { source, .. } => vec![source],
            Self::Combine { sources, .. } | Self::List(sources) => sources,
            Self::Map(entries) => entries.into_iter().map(|(_, node)| node).collect(),
        }
    }

    // Apply this node's operation to its resolved sources, in source order.
    fn apply(&self, inputs: Vec<Value>) -> Result<Value, SummarizeError> {
        match self {
            Self::Leaf(_) | Self::Slot(_) => Err(SummarizeError::invariant(
                "leaf reached the operation path",
            )),
            Self::Transform { op, .. } => {
                let input = inputs
                    .into_iter()
                    .next()
                    .ok_or_else(|| SummarizeError::invariant("transform lost its source"))?;
                op(input)
            }
            Self::Combine { op, .. } => op(inputs),
            Self::List(_) => Ok(Value::List(inputs)),
            Self::Map(entries) => Ok(Value::from_map(
                entries
                    .iter()
                    .map(|(key, _)| key.clone())
                    .zip(inputs),
            )),
        }
    }
}

///
/// Step
///
/// Work item of the explicit resolution stack.
///

enum Step {
    Enter(Deferred),
    Exit(Deferred),
}

impl Deferred {
    fn from_kind(kind: NodeKind) -> Self {
        Self {
            node: Rc::new(Node {
                id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
                kind,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Realized value wrapped as a node.
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::from_kind(NodeKind::Leaf(value.into()))
    }

    pub(crate) fn slot(index: usize) -> Self {
        Self::from_kind(NodeKind::Slot(index))
    }

    pub(crate) fn list(items: Vec<Self>) -> Self {
        Self::from_kind(NodeKind::List(items))
    }

    pub(crate) fn map_node(entries: Vec<(Value, Self)>) -> Self {
        Self::from_kind(NodeKind::Map(entries))
    }

    /// Combine several nodes with one function over their resolved values.
    ///
    /// A single source is passed to `op` unwrapped; any other number of
    /// sources is passed as a `Value::List` in source order.
    pub fn combine<F>(sources: Vec<Self>, op: F) -> Self
    where
        F: Fn(Value) -> Result<Value, SummarizeError> + 'static,
    {
        Self::combine_all(sources, move |mut values| {
            if values.len() == 1 {
                op(values.pop().unwrap_or(Value::Null))
            } else {
                op(Value::List(values))
            }
        })
    }

    pub(crate) fn combine_all<F>(sources: Vec<Self>, op: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, SummarizeError> + 'static,
    {
        Self::from_kind(NodeKind::Combine {
            sources,
            op: Box::new(op),
        })
    }

    /// Combine exactly two nodes.
    pub fn combine2<F>(left: &Self, right: &Self, op: F) -> Self
    where
        F: Fn(Value, Value) -> Result<Value, SummarizeError> + 'static,
    {
        Self::combine_all(vec![left.clone(), right.clone()], move |values| {
            let mut values = values.into_iter();
            match (values.next(), values.next()) {
                (Some(left), Some(right)) => op(left, right),
                _ => Err(SummarizeError::invariant("binary combinator lost a source")),
            }
        })
    }

    // ------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------

    #[must_use]
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(Value) -> Value + 'static,
    {
        self.try_map(move |value| Ok(f(value)))
    }

    #[must_use]
    pub fn try_map<F>(&self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, SummarizeError> + 'static,
    {
        Self::from_kind(NodeKind::Transform {
            source: self.clone(),
            op: Box::new(f),
        })
    }

    /// Round a numeric result; grouped results round every entry.
    #[must_use]
    pub fn round(&self, digits: u32) -> Self {
        self.try_map(move |value| round_deep(&value, digits))
    }

    /// Apply `f` to every value of a grouped result, keeping its keys.
    ///
    /// `Null` passes through untouched.
    #[must_use]
    pub fn transform_values<F>(&self, f: F) -> Self
    where
        F: Fn(&Value, Value) -> Result<Value, SummarizeError> + 'static,
    {
        self.try_map(move |value| match value {
            Value::Null => Ok(Value::Null),
            Value::Map(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let value = f(&key, value)?;
                    out.push((key, value));
                }
                Ok(Value::Map(out))
            }
            other => Err(expected_map("transform_values", &other)),
        })
    }

    /// Merge two grouped results key by key.
    ///
    /// Keys present on only one side are combined with `Null` for the other.
    #[must_use]
    pub fn merge_with<F>(&self, other: &Self, f: F) -> Self
    where
        F: Fn(&Value, Value, Value) -> Result<Value, SummarizeError> + 'static,
    {
        Self::combine2(self, other, move |left, right| {
            let left = into_entries("merge_with", left)?;
            let right = into_entries("merge_with", right)?;

            let mut keys: Vec<&Value> = left.iter().chain(&right).map(|(k, _)| k).collect();
            keys.sort();
            keys.dedup();

            let lookup = |entries: &[(Value, Value)], key: &Value| {
                entries
                    .iter()
                    .find(|(k, _)| k == key)
                    .map_or(Value::Null, |(_, v)| v.clone())
            };

            let mut out = Vec::with_capacity(keys.len());
            for key in keys {
                let merged = f(key, lookup(&left, key), lookup(&right, key))?;
                out.push((key.clone(), merged));
            }

            Ok(Value::from_map(out))
        })
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Force this node within one resolution pass.
    ///
    /// Sources resolve depth-first on an explicit stack, so graph depth is
    /// bounded by memory rather than the call stack. With memoization enabled
    /// a node runs its operation at most once per context; failures are
    /// never cached.
    pub fn resolve(&self, cx: &mut ResolveContext<'_>) -> Result<Value, SummarizeError> {
        let mut steps = vec![Step::Enter(self.clone())];
        let mut values: Vec<Value> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(node) => match &node.node.kind {
                    NodeKind::Leaf(value) => values.push(value.clone()),
                    NodeKind::Slot(index) => values.push(cx.slot(*index)?),
                    kind => {
                        if let Some(value) = cx.cached(node.node.id) {
                            values.push(value);
                            continue;
                        }

                        let sources: Vec<Deferred> =
                            kind.sources().into_iter().cloned().collect();
                        steps.push(Step::Exit(node.clone()));
                        steps.extend(sources.into_iter().rev().map(Step::Enter));
                    }
                },
                Step::Exit(node) => {
                    let arity = node.node.kind.sources().len();
                    let at = values.len().checked_sub(arity).ok_or_else(|| {
                        SummarizeError::invariant("resolution stack lost a source value")
                    })?;
                    let inputs = values.split_off(at);

                    let value = node.node.kind.apply(inputs)?;
                    cx.store(node.node.id, &value);
                    values.push(value);
                }
            }
        }

        values
            .pop()
            .ok_or_else(|| SummarizeError::invariant("resolution produced no value"))
    }

    /// Whether both handles point at the same node.
    #[must_use]
    pub fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match &self.node.kind {
            NodeKind::Leaf(value) => return f.debug_tuple("Leaf").field(value).finish(),
            NodeKind::Slot(index) => return f.debug_tuple("Slot").field(index).finish(),
            NodeKind::Transform { .. } => "Transform",
            NodeKind::Combine { .. } => "Combine",
            NodeKind::List(_) => "List",
            NodeKind::Map(_) => "Map",
        };
        f.write_str(label)
    }
}

impl From<Value> for Deferred {
    fn from(value: Value) -> Self {
        Self::value(value)
    }
}

fn round_deep(value: &Value, digits: u32) -> Result<Value, SummarizeError> {
    match value {
        Value::Map(entries) => entries
            .iter()
            .map(|(key, value)| -> Result<_, SummarizeError> {
                Ok((key.clone(), round_deep(value, digits)?))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Map),
        Value::List(items) => items
            .iter()
            .map(|item| round_deep(item, digits))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        scalar => Ok(scalar.round(digits)?),
    }
}

fn into_entries(op: &'static str, value: Value) -> Result<Vec<(Value, Value)>, SummarizeError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Map(entries) => Ok(entries),
        other => Err(expected_map(op, &other)),
    }
}

fn expected_map(op: &'static str, value: &Value) -> SummarizeError {
    crate::value::ValueError::TypeMismatch {
        op,
        left: value.kind_name(),
        right: "map",
    }
    .into()
}
