//! Shared inference state
//!
//! Per-query state lives in [`crate::context::QueryState`]; what is kept here
//! outlives single queries and is safe to share between threads.

pub mod metrics;

pub use metrics::{InferenceMetrics, MetricSummary};
