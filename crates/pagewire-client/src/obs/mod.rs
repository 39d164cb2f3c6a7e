//! Lightweight in-process interaction metrics.
//!
//! Counters, gauges, and a latency histogram stored as atomics behind
//! `DashMap` labels, rendered in Prometheus text format on demand.

pub mod metrics;
