//! Log Aggregation Engine - turns raw classified request records into the
//! view-models the dashboard charts consume.
//!
//! Produces, from one pass over a record set:
//! - time-bucketed hit counts (per the range selector)
//! - per-agent hit counts
//! - latest usage-limit snapshots parsed out of rule-match text
//! - an outcome summary whose total balances by construction

pub mod engine;
pub mod usage;

pub use engine::{aggregate, aggregate_at, normalize_agent, Aggregation};
pub use usage::{parse_usage_annotation, UsageSnapshot};
