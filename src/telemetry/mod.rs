//! Pool observability.
//!
//! Counters and a latency histogram per pool. Log output goes through
//! `tracing`; the library installs no subscriber.

pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};
