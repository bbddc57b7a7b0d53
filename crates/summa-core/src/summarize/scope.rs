use crate::{
    deferred::{Deferred, ResolveContext},
    error::SummarizeError,
    obs::metrics::{self, MetricsEvent},
    relation::{Backend, ColumnExpr, Relation},
    summarize::{
        immediate,
        proxy::SummarizingProxy,
        request::{AggregateOp, AggregationRequest},
    },
    value::Value,
};
use std::{cell::RefCell, fmt, rc::Rc};

///
/// ScopeMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ScopeMode {
    /// Aggregates register requests and resolve after one combined fetch.
    Batched,
    /// Aggregates fetch immediately and individually.
    Immediate,
}

///
/// Scope
///
/// Handed to a summarize computation. Owns the registered requests and
/// committed nodes for the lifetime of one invocation.
///

pub struct Scope<'a> {
    backend: &'a dyn Backend,
    base: Relation,
    mode: ScopeMode,
    pure: bool,
    requests: RefCell<Vec<AggregationRequest>>,
    commits: RefCell<Vec<(Deferred, Committed)>>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(backend: &'a dyn Backend, base: Relation, mode: ScopeMode, pure: bool) -> Self {
        Self {
            backend,
            base,
            mode,
            pure,
            requests: RefCell::new(Vec::new()),
            commits: RefCell::new(Vec::new()),
        }
    }

    /// Relation proxy to request aggregates from.
    ///
    /// In batched mode the proxy starts ungrouped so capture begins from a
    /// clean slate; the base grouping is reapplied when results are bucketed.
    #[must_use]
    pub fn relation(&self) -> SummarizingProxy<'_> {
        let relation = match self.mode {
            ScopeMode::Batched => self.base.clone().ungrouped(),
            ScopeMode::Immediate => self.base.clone(),
        };

        SummarizingProxy::new(self, relation)
    }

    #[must_use]
    pub const fn is_pure(&self) -> bool {
        self.pure
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.mode == ScopeMode::Immediate
    }

    /// Combine nodes with `f` over their resolved values.
    ///
    /// One source is passed unwrapped, several as a `Value::List`. In noop
    /// mode the combination is evaluated on the spot.
    pub fn with<F>(&self, sources: Vec<Deferred>, f: F) -> Deferred
    where
        F: Fn(Value) -> Result<Value, SummarizeError> + 'static,
    {
        let node = Deferred::combine(sources, f);
        self.settle(node)
    }

    /// Combine two nodes with `f`.
    pub fn with2<F>(&self, left: &Deferred, right: &Deferred, f: F) -> Deferred
    where
        F: Fn(Value, Value) -> Result<Value, SummarizeError> + 'static,
    {
        let node = Deferred::combine2(left, right, f);
        self.settle(node)
    }

    /// Register a node stashed outside the computation's return value.
    ///
    /// The returned handle is filled once the computation's result has
    /// resolved. Pure computations communicate only through their return
    /// value and cannot commit.
    pub fn commit(&self, node: &Deferred) -> Result<Committed, SummarizeError> {
        if self.pure {
            return Err(SummarizeError::invalid_mode(
                "pure computations cannot commit deferred values",
            ));
        }

        let handle = Committed::default();
        if self.mode == ScopeMode::Immediate {
            // nothing to wait for; fill on the spot when possible
            if let Ok(value) = node.resolve(&mut ResolveContext::uncached()) {
                handle.fill(value);
                return Ok(handle);
            }
        }

        self.commits.borrow_mut().push((node.clone(), handle.clone()));

        Ok(handle)
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    pub(crate) fn aggregate(
        &self,
        op: AggregateOp,
        expr: ColumnExpr,
        relation: &Relation,
    ) -> Result<Deferred, SummarizeError> {
        let request = AggregationRequest::new(op, expr, relation.clone())?;

        match self.mode {
            ScopeMode::Batched => {
                self.base.check_compatible(relation)?;

                let mut requests = self.requests.borrow_mut();
                let slot = requests.len();
                requests.push(request);
                metrics::record(MetricsEvent::RequestRegistered);

                Ok(Deferred::slot(slot))
            }
            ScopeMode::Immediate => {
                let value =
                    immediate::fetch_aggregate(self.backend, relation, op, request.expr())?;
                Ok(Deferred::value(value))
            }
        }
    }

    /// `sum / count` over the same expression, `Null` where the count is 0.
    pub(crate) fn average(
        &self,
        expr: ColumnExpr,
        relation: &Relation,
    ) -> Result<Deferred, SummarizeError> {
        let sum = self.aggregate(AggregateOp::Sum, expr.clone(), relation)?;
        let count = self.aggregate(AggregateOp::Count, expr, relation)?;

        Ok(self.with2(&sum, &count, average_values))
    }

    pub(crate) fn into_parts(self) -> (Vec<AggregationRequest>, Vec<(Deferred, Committed)>) {
        (self.requests.into_inner(), self.commits.into_inner())
    }

    fn settle(&self, node: Deferred) -> Deferred {
        if self.mode == ScopeMode::Immediate {
            // failures stay lazy and surface again at resolution
            if let Ok(value) = node.resolve(&mut ResolveContext::uncached()) {
                return Deferred::value(value);
            }
        }

        node
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("base", &self.base)
            .field("mode", &self.mode)
            .field("pure", &self.pure)
            .field("requests", &self.requests.borrow().len())
            .finish_non_exhaustive()
    }
}

fn average_values(sum: Value, count: Value) -> Result<Value, SummarizeError> {
    match count {
        Value::Map(counts) => {
            let mut out = Vec::with_capacity(counts.len());
            for (key, count) in counts {
                let total = sum.get(&key).cloned().unwrap_or(Value::Int(0));
                out.push((key, average_scalar(&total, &count)?));
            }
            Ok(Value::from_map(out))
        }
        count => average_scalar(&sum, &count),
    }
}

fn average_scalar(sum: &Value, count: &Value) -> Result<Value, SummarizeError> {
    if count.is_null() || count == &Value::Int(0) {
        return Ok(Value::Null);
    }

    Ok(sum.checked_div(count)?)
}

///
/// Committed
///
/// Handle to a value resolved by the post-resolution sweep of an impure
/// computation. Empty until the summarize call that issued it returns.
///

#[derive(Clone, Debug, Default)]
pub struct Committed {
    cell: Rc<RefCell<Option<Value>>>,
}

impl Committed {
    #[must_use]
    pub fn get(&self) -> Option<Value> {
        self.cell.borrow().clone()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cell.borrow().is_some()
    }

    pub(crate) fn fill(&self, value: Value) {
        *self.cell.borrow_mut() = Some(value);
    }
}
