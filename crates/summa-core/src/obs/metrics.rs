//! Process-local summarize counters.
//!
//! All instrumentation flows through `MetricsEvent` and `record`.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

///
/// EventOps
/// Ephemeral, in-memory counters for summarize invocations.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    pub summarize_calls: u64,
    pub noop_calls: u64,
    pub requests_registered: u64,
    pub fetches: u64,
    pub rows_fetched: u64,
    pub buckets_resolved: u64,
    pub errors: u64,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    SummarizeStart { noop: bool },
    RequestRegistered,
    Fetch { rows: u64 },
    BucketsResolved { buckets: u64 },
    Error,
}

thread_local! {
    static EVENT_OPS: RefCell<EventOps> = RefCell::new(EventOps::default());
}

/// Record one metrics event into the thread-local counters.
pub fn record(event: MetricsEvent) {
    EVENT_OPS.with(|ops| {
        let mut m = ops.borrow_mut();
        match event {
            MetricsEvent::SummarizeStart { noop } => {
                m.summarize_calls = m.summarize_calls.saturating_add(1);
                if noop {
                    m.noop_calls = m.noop_calls.saturating_add(1);
                }
            }
            MetricsEvent::RequestRegistered => {
                m.requests_registered = m.requests_registered.saturating_add(1);
            }
            MetricsEvent::Fetch { rows } => {
                m.fetches = m.fetches.saturating_add(1);
                m.rows_fetched = m.rows_fetched.saturating_add(rows);
            }
            MetricsEvent::BucketsResolved { buckets } => {
                m.buckets_resolved = m.buckets_resolved.saturating_add(buckets);
            }
            MetricsEvent::Error => m.errors = m.errors.saturating_add(1),
        }
    });
}

/// Copy of the current thread's counters.
#[must_use]
pub fn snapshot() -> EventOps {
    EVENT_OPS.with(|ops| ops.borrow().clone())
}

/// Reset all counters (useful in tests).
pub fn reset() {
    EVENT_OPS.with(|ops| *ops.borrow_mut() = EventOps::default());
}
