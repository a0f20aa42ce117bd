//! Usage-limit annotation parser.
//!
//! The enforcement engine smuggles the current quota consumption of a
//! restricted rule inside the free-text `rule` field of a log record, in
//! the literal shape `limit:<pattern> (<used>/<max>)`. This module is the
//! only place that knows the format; everything else works with the typed
//! snapshot.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static USAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"limit:(.*?) \((\d+)/(\d+)\)").expect("usage annotation pattern compiles")
});

/// Latest known quota consumption for one rule pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub pattern: String,
    pub used: u64,
    pub max: u64,
}

impl UsageSnapshot {
    /// Consumption as a whole percentage, clamped to `[0, 100]`.
    ///
    /// A zero `max` reads as 0% rather than a division error; quota
    /// ceilings of zero do occur for freshly restricted rules.
    pub fn percent(&self) -> u8 {
        if self.max == 0 {
            return 0;
        }
        let pct = (self.used as f64 / self.max as f64 * 100.0).round();
        pct.min(100.0) as u8
    }
}

/// Extract a usage annotation from rule-match text.
///
/// Returns `None` for text without an annotation or with one that does not
/// parse; malformed input is never an error.
pub fn parse_usage_annotation(rule: &str) -> Option<UsageSnapshot> {
    if !rule.starts_with("limit:") {
        return None;
    }
    let caps = USAGE_RE.captures(rule)?;
    let used = caps[2].parse().ok()?;
    let max = caps[3].parse().ok()?;
    Some(UsageSnapshot {
        pattern: caps[1].to_string(),
        used,
        max,
    })
}
