use crate::{deferred::Deferred, value::Value};

///
/// Tree
///
/// Container of realized values, deferred nodes, and nested lists or keyed
/// maps of either. This is what a summarize computation returns.
///

#[derive(Clone, Debug)]
pub enum Tree {
    Value(Value),
    Deferred(Deferred),
    List(Vec<Self>),
    Map(Vec<(Value, Self)>),
}

impl Tree {
    #[must_use]
    pub fn list<T: Into<Self>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn map<K, T>(entries: impl IntoIterator<Item = (K, T)>) -> Self
    where
        K: Into<Value>,
        T: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Turn a tree into one deferred node.
///
/// Deferred nodes come back unchanged, containers wrap their elements
/// recursively, and realized values become leaves.
#[must_use]
pub fn wrap(tree: Tree) -> Deferred {
    match tree {
        Tree::Value(value) => Deferred::value(value),
        Tree::Deferred(node) => node,
        Tree::List(items) => Deferred::list(items.into_iter().map(wrap).collect()),
        Tree::Map(entries) => Deferred::map_node(
            entries
                .into_iter()
                .map(|(key, value)| (key, wrap(value)))
                .collect(),
        ),
    }
}

impl From<Value> for Tree {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Deferred> for Tree {
    fn from(node: Deferred) -> Self {
        Self::Deferred(node)
    }
}

impl From<&Deferred> for Tree {
    fn from(node: &Deferred) -> Self {
        Self::Deferred(node.clone())
    }
}

impl From<i64> for Tree {
    fn from(v: i64) -> Self {
        Self::Value(v.into())
    }
}

impl From<&str> for Tree {
    fn from(v: &str) -> Self {
        Self::Value(v.into())
    }
}

impl<T: Into<Self>> From<Vec<T>> for Tree {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

impl<A: Into<Self>, B: Into<Self>> From<(A, B)> for Tree {
    fn from((a, b): (A, B)) -> Self {
        Self::List(vec![a.into(), b.into()])
    }
}

impl<A: Into<Self>, B: Into<Self>, C: Into<Self>> From<(A, B, C)> for Tree {
    fn from((a, b, c): (A, B, C)) -> Self {
        Self::List(vec![a.into(), b.into(), c.into()])
    }
}
