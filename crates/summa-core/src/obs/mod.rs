//! Observability boundary.
//!
//! Tracing is optional and injected by the caller; metrics are process-local
//! counters. Neither may affect summarize semantics.

pub mod metrics;
pub mod trace;
