//! Summarize tracing boundary.

use crate::error::{ErrorClass, SummarizeError};
use sha2::{Digest, Sha256};
use std::fmt;

///
/// SummarizeTraceSink
///

pub trait SummarizeTraceSink: Send + Sync {
    fn on_event(&self, event: SummarizeTraceEvent);
}

///
/// TraceMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TraceMode {
    Batched { pure: bool },
    Noop,
}

///
/// PlanFingerprint
///
/// Stable SHA-256 fingerprint of one combined fetch.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PlanFingerprint([u8; 32]);

impl PlanFingerprint {
    /// Fingerprint the rendered SQL of a combined fetch.
    #[must_use]
    pub fn from_sql(sql: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"planfp:v1");
        let len = u32::try_from(sql.len()).unwrap_or(u32::MAX);
        hasher.update(len.to_be_bytes());
        hasher.update(sql.as_bytes());

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Display for PlanFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

///
/// SummarizeTraceEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SummarizeTraceEvent {
    Start {
        mode: TraceMode,
    },
    Plan {
        fingerprint: PlanFingerprint,
        requests: u32,
        groups: u32,
    },
    Fetch {
        fingerprint: PlanFingerprint,
        rows: u64,
    },
    Finish {
        buckets: u64,
    },
    Error {
        class: ErrorClass,
    },
}

///
/// TraceScope
///

pub(crate) struct TraceScope {
    sink: &'static dyn SummarizeTraceSink,
}

impl TraceScope {
    pub(crate) fn start(
        sink: Option<&'static dyn SummarizeTraceSink>,
        mode: TraceMode,
    ) -> Option<Self> {
        let sink = sink?;
        sink.on_event(SummarizeTraceEvent::Start { mode });
        Some(Self { sink })
    }

    pub(crate) fn plan(&self, fingerprint: PlanFingerprint, requests: usize, groups: usize) {
        self.sink.on_event(SummarizeTraceEvent::Plan {
            fingerprint,
            requests: u32::try_from(requests).unwrap_or(u32::MAX),
            groups: u32::try_from(groups).unwrap_or(u32::MAX),
        });
    }

    pub(crate) fn fetch(&self, fingerprint: PlanFingerprint, rows: usize) {
        self.sink.on_event(SummarizeTraceEvent::Fetch {
            fingerprint,
            rows: u64::try_from(rows).unwrap_or(u64::MAX),
        });
    }

    pub(crate) fn finish(self, buckets: usize) {
        self.sink.on_event(SummarizeTraceEvent::Finish {
            buckets: u64::try_from(buckets).unwrap_or(u64::MAX),
        });
    }

    pub(crate) fn error(self, err: &SummarizeError) {
        self.sink
            .on_event(SummarizeTraceEvent::Error { class: err.class() });
    }
}
