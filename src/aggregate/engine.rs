//! The aggregation pass itself.

use crate::aggregate::usage::{parse_usage_annotation, UsageSnapshot};
use crate::bucket::TimeBuckets;
use crate::types::{LogRecord, StatsSummary, TimeRange};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashMap;

/// Everything the dashboard charts need for one record set and range.
///
/// # Ordering
/// - `bucket_labels`/`bucket_counts` follow range-generation order
///   (oldest → newest).
/// - `by_agent` and `usage_limits` follow insertion order of first
///   occurrence. No sort-by-count is applied here; presentation decides.
#[derive(Clone, Debug, Serialize)]
pub struct Aggregation {
    pub range: TimeRange,

    /// Bucket labels, parallel to `bucket_counts`.
    pub bucket_labels: Vec<String>,
    pub bucket_counts: Vec<u64>,

    /// Hits per normalized agent key.
    pub by_agent: Vec<(String, u64)>,

    /// Latest usage snapshot per rule pattern (last write wins).
    pub usage_limits: Vec<UsageSnapshot>,

    pub summary: StatsSummary,
}

impl Aggregation {
    /// Hit count for a normalized agent key, 0 when unseen.
    pub fn agent_count(&self, agent: &str) -> u64 {
        self.by_agent
            .iter()
            .find(|(name, _)| name == agent)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Latest usage snapshot for a rule pattern.
    pub fn usage_for(&self, pattern: &str) -> Option<&UsageSnapshot> {
        self.usage_limits.iter().find(|s| s.pattern == pattern)
    }
}

/// Aggregate `records` over `range`, anchored at the current instant.
pub fn aggregate(records: &[LogRecord], range: TimeRange) -> Aggregation {
    aggregate_at(records, range, Local::now())
}

/// Aggregate `records` over `range`, anchored at `now`.
///
/// Pure and synchronous; safe to re-run on every render of already
/// fetched data. Records outside the bucketed span still contribute to
/// `by_agent`, `usage_limits` and `summary` - only the time chart is
/// span-limited, matching what each panel shows.
pub fn aggregate_at(records: &[LogRecord], range: TimeRange, now: DateTime<Local>) -> Aggregation {
    let buckets = TimeBuckets::generate_at(range, now);
    let mut bucket_counts = vec![0u64; buckets.len()];

    let mut by_agent: Vec<(String, u64)> = Vec::new();
    let mut agent_slots: HashMap<String, usize> = HashMap::new();

    let mut usage_limits: Vec<UsageSnapshot> = Vec::new();
    let mut usage_slots: HashMap<String, usize> = HashMap::new();

    for record in records {
        if let Some(slot) = buckets.slot(record.timestamp) {
            bucket_counts[slot] += 1;
        }

        let agent = normalize_agent(&record.user_agent);
        match agent_slots.get(agent) {
            Some(&slot) => by_agent[slot].1 += 1,
            None => {
                agent_slots.insert(agent.to_string(), by_agent.len());
                by_agent.push((agent.to_string(), 1));
            }
        }

        if let Some(snapshot) = parse_usage_annotation(&record.rule) {
            match usage_slots.get(&snapshot.pattern) {
                // Later records carry the newer quota snapshot.
                Some(&slot) => usage_limits[slot] = snapshot,
                None => {
                    usage_slots.insert(snapshot.pattern.clone(), usage_limits.len());
                    usage_limits.push(snapshot);
                }
            }
        }
    }

    let summary = StatsSummary::tally(records.iter().map(|r| r.outcome.as_str()));

    Aggregation {
        range,
        bucket_labels: buckets.labels().to_vec(),
        bucket_counts,
        by_agent,
        usage_limits,
        summary,
    }
}

/// Normalized agent key: the substring of the user agent before the first
/// `/` or whitespace, or `"Unknown"` when that leaves nothing.
pub fn normalize_agent(user_agent: &str) -> &str {
    let head = user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or("");
    if head.is_empty() {
        "Unknown"
    } else {
        head
    }
}
