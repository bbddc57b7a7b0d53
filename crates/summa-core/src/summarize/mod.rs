//! Module: summarize
//! Responsibility: capture a computation's aggregate requests, answer them
//! with one combined fetch, redistribute the rows, and resolve the deferred
//! result per base group.
//! Does not own: fetch execution (see `relation::Backend`) or the deferred
//! graph itself (see `deferred`).

mod config;
mod guard;
mod immediate;
mod plan;
mod proxy;
mod redistribute;
mod request;
mod scope;
mod shape;


use crate::{
    deferred::{ResolveContext, Tree, wrap},
    error::SummarizeError,
    obs::{
        metrics::{self, MetricsEvent},
        trace::{SummarizeTraceSink, TraceMode, TraceScope},
    },
    relation::{Backend, Relation},
    value::Value,
};
use guard::NestingGuard;
use scope::ScopeMode;

// re-exports
pub use config::SummarizeConfig;
pub use plan::BatchPlan;
pub use proxy::SummarizingProxy;
pub use redistribute::{Bucket, redistribute};
pub use request::{AggregateOp, AggregationRequest};
pub use scope::{Committed, Scope};

///
/// Summarize
///
/// Entry point for one summarize invocation over a base relation.
///
/// ```ignore
/// let stats = Summarize::new(&backend, people).process(|scope| {
///     let people = scope.relation();
///     Ok(vec![people.count()?, people.average("age")?])
/// })?;
/// ```
///

pub struct Summarize<'a> {
    backend: &'a dyn Backend,
    relation: Relation,
    config: SummarizeConfig,
    trace: Option<&'static dyn SummarizeTraceSink>,
}

impl<'a> Summarize<'a> {
    #[must_use]
    pub fn new(backend: &'a dyn Backend, relation: Relation) -> Self {
        Self {
            backend,
            relation,
            config: SummarizeConfig::default(),
            trace: None,
        }
    }

    #[must_use]
    pub const fn config(mut self, config: SummarizeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn pure(mut self, pure: bool) -> Self {
        self.config = self.config.pure(pure);
        self
    }

    #[must_use]
    pub const fn noop(mut self, noop: bool) -> Self {
        self.config = self.config.noop(noop);
        self
    }

    #[must_use]
    pub const fn with_trace(mut self, sink: &'static dyn SummarizeTraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Run `computation` and return its fully resolved, shaped result.
    pub fn process<F, T>(self, computation: F) -> Result<Value, SummarizeError>
    where
        F: FnOnce(&Scope<'_>) -> Result<T, SummarizeError>,
        T: Into<Tree>,
    {
        let _guard = NestingGuard::enter()?;
        let pure = self.config.validate(&self.relation)?;

        metrics::record(MetricsEvent::SummarizeStart {
            noop: self.config.noop,
        });
        let mode = if self.config.noop {
            TraceMode::Noop
        } else {
            TraceMode::Batched { pure }
        };
        let trace = TraceScope::start(self.trace, mode);

        let result = if self.config.noop {
            self.run_immediate(pure, computation)
        } else {
            self.run_batched(pure, trace.as_ref(), computation)
        };

        match result {
            Ok((value, buckets)) => {
                metrics::record(MetricsEvent::BucketsResolved {
                    buckets: u64::try_from(buckets).unwrap_or(u64::MAX),
                });
                if let Some(trace) = trace {
                    trace.finish(buckets);
                }
                Ok(value)
            }
            Err(err) => {
                metrics::record(MetricsEvent::Error);
                if let Some(trace) = trace {
                    trace.error(&err);
                }
                Err(err)
            }
        }
    }

    /// Capture `computation` and render its combined fetch without running it.
    pub fn explain<F, T>(self, computation: F) -> Result<String, SummarizeError>
    where
        F: FnOnce(&Scope<'_>) -> Result<T, SummarizeError>,
        T: Into<Tree>,
    {
        let _guard = NestingGuard::enter()?;
        let pure = self.config.resolve_purity(&self.relation)?;

        let scope = Scope::new(self.backend, self.relation.clone(), ScopeMode::Batched, pure);
        computation(&scope)?;
        let (requests, _) = scope.into_parts();

        Ok(BatchPlan::build(&self.relation, &requests)?.to_sql())
    }

    // Capture, plan, fetch once, redistribute, then resolve per bucket.
    fn run_batched<F, T>(
        &self,
        pure: bool,
        trace: Option<&TraceScope>,
        computation: F,
    ) -> Result<(Value, usize), SummarizeError>
    where
        F: FnOnce(&Scope<'_>) -> Result<T, SummarizeError>,
        T: Into<Tree>,
    {
        let scope = Scope::new(self.backend, self.relation.clone(), ScopeMode::Batched, pure);
        let root = wrap(computation(&scope)?.into());
        let (requests, commits) = scope.into_parts();

        let plan = BatchPlan::build(&self.relation, &requests)?;
        let rows = if plan.is_empty() {
            Vec::new()
        } else {
            let fingerprint = plan.fingerprint();
            if let Some(trace) = trace {
                trace.plan(fingerprint, requests.len(), plan.group_width());
            }

            let rows = self.backend.fetch(plan.fetch())?.into_rows();
            metrics::record(MetricsEvent::Fetch {
                rows: u64::try_from(rows.len()).unwrap_or(u64::MAX),
            });
            if let Some(trace) = trace {
                trace.fetch(fingerprint, rows.len());
            }
            rows
        };

        let buckets = redistribute(&plan, &requests, rows)?;
        if !commits.is_empty() && buckets.len() != 1 {
            return Err(SummarizeError::invariant(
                "committed values require exactly one result bucket",
            ));
        }

        let count = buckets.len();
        let mut resolved = Vec::with_capacity(count);
        for bucket in &buckets {
            let mut cx = ResolveContext::memoized().with_row(&bucket.values);
            let value = root.resolve(&mut cx)?;

            for (node, handle) in &commits {
                handle.fill(node.resolve(&mut cx)?);
            }

            resolved.push((bucket.key.clone(), value));
        }

        let value = shape::finalize(self.backend, &self.relation, resolved)?;

        Ok((value, count))
    }

    // Every aggregate already fetched; resolution re-runs each access.
    fn run_immediate<F, T>(&self, pure: bool, computation: F) -> Result<(Value, usize), SummarizeError>
    where
        F: FnOnce(&Scope<'_>) -> Result<T, SummarizeError>,
        T: Into<Tree>,
    {
        let scope = Scope::new(self.backend, self.relation.clone(), ScopeMode::Immediate, pure);
        let root = wrap(computation(&scope)?.into());
        let (_, commits) = scope.into_parts();

        let mut cx = ResolveContext::uncached();
        let value = root.resolve(&mut cx)?;
        for (node, handle) in &commits {
            handle.fill(node.resolve(&mut cx)?);
        }

        Ok((value, 1))
    }
}
