//! # radar-core
//!
//! Access-policy modeling and log aggregation for automated-traffic
//! telemetry. A site owner defines per-agent access rules (allow, block,
//! quota-restricted, metered, redirecting); the external enforcement
//! engine applies them at the edge and emits classified log records; this
//! crate turns rules and records into the view-models a dashboard renders.
//!
//! # Architecture
//! - [`policy`]: the rule working set - copy-on-write edits, sanitized
//!   save payloads, per-policy counts and quota/fee totals
//! - [`bucket`]: range selector → ordered chart bucket labels, with a
//!   lookup side that shares the generation formatting
//! - [`aggregate`]: one pass over a record set → bucketed counts,
//!   per-agent counts, usage-limit snapshots, outcome summary
//! - [`score`]: discrete risk/protection levels (local fallback plus an
//!   accept-external path)
//! - [`client`]: async JSON client for the backend data source, with auth
//!   expiry as a first-class error
//! - [`panel`]: per-panel loading/data/error lifecycle with
//!   generation-stamped refreshes and an optional background scheduler
//! - [`seo`]: robots.txt / robots meta renderings of the rule set

pub mod aggregate;
pub mod bucket;
pub mod client;
pub mod error;
pub mod panel;
pub mod policy;
pub mod score;
pub mod seo;
pub mod types;

pub use aggregate::{aggregate, aggregate_at, Aggregation, UsageSnapshot};
pub use bucket::TimeBuckets;
pub use client::ApiClient;
pub use error::RadarError;
pub use panel::{DashboardPanel, PanelScheduler, PanelState, RadarSnapshot, SchedulerConfig};
pub use policy::{sanitize_for_save, PolicyCounts, RulePatch, RuleSet};
pub use score::{block_ratio, local_risk_level, protection_level, RiskSource};
pub use types::{
    LogRecord, Policy, ProtectionLevel, RiskInsights, RiskLevel, Rule, StatsSummary, TimeRange,
};
