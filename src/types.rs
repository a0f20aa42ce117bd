//! Core data structures shared across the crate.
//!
//! Defines the rule/log entities consumed from the backend data source and
//! the summary shapes handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix timestamp in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ================================================================================================
// ACCESS POLICIES
// ================================================================================================

/// Enforcement action associated with a rule.
///
/// One closed set covering both rule shapes found in deployed configs:
/// quota-carrying rules (`restricted`), monetized rules (`tariff`) and
/// redirecting rules (`redirect`) all live in the same enum, with their
/// extra fields activated per-policy on [`Rule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    Allow,
    Block,
    Restricted,
    Tariff,
    Redirect,
}

impl Policy {
    /// True when the policy carries a quota ceiling.
    pub fn uses_limit(&self) -> bool {
        matches!(self, Policy::Restricted)
    }

    /// True when the policy carries a per-request fee.
    pub fn uses_fee(&self) -> bool {
        matches!(self, Policy::Tariff)
    }

    /// True when the policy carries a redirect target.
    pub fn uses_redirect(&self) -> bool {
        matches!(self, Policy::Redirect)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Policy::Allow => "allow",
            Policy::Block => "block",
            Policy::Restricted => "restricted",
            Policy::Tariff => "tariff",
            Policy::Redirect => "redirect",
        };
        write!(f, "{}", s)
    }
}

/// A single access-policy record for one named agent/pattern.
///
/// `pattern` is matched against request attributes by the external
/// enforcement engine; this crate treats it as an opaque string.
///
/// `limit`, `fee` and `redirect_url` are only meaningful under their
/// respective policies (`restricted`, `tariff`, `redirect`). Sanitization
/// before save nulls whichever fields the active policy does not use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Backend-assigned identifier; absent on new, unsaved rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display label of the bot/agent this rule targets.
    pub agent_name: String,

    /// Match pattern consumed by the enforcement engine.
    pub pattern: String,

    /// Enforcement action.
    pub policy: Policy,

    /// Quota ceiling for `restricted` rules. `None` means unset, which is
    /// distinct from a zero quota.
    #[serde(default)]
    pub limit: Option<u64>,

    /// Per-request fee for `tariff` rules, in the site's billing currency.
    #[serde(default)]
    pub fee: Option<f64>,

    /// Redirect target for `redirect` rules.
    #[serde(default)]
    pub redirect_url: Option<String>,
}

impl Rule {
    /// Create an empty rule targeting `agent_name` with the given policy.
    pub fn new(agent_name: impl Into<String>, pattern: impl Into<String>, policy: Policy) -> Self {
        Rule {
            id: None,
            agent_name: agent_name.into(),
            pattern: pattern.into(),
            policy,
            limit: None,
            fee: None,
            redirect_url: None,
        }
    }
}

// ================================================================================================
// LOG RECORDS
// ================================================================================================

/// One classified request event, produced by the external enforcement
/// engine and consumed read-only here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,

    /// Absolute instant of the request (RFC 3339 on the wire).
    pub timestamp: DateTime<Utc>,

    pub ip_address: String,
    pub user_agent: String,
    pub path: String,

    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub accept_language: Option<String>,
    #[serde(default)]
    pub sec_ch_ua: Option<String>,
    #[serde(default)]
    pub sec_ch_ua_mobile: Option<String>,
    #[serde(default)]
    pub sec_ch_ua_platform: Option<String>,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub js_executed: bool,

    /// Short classification string (allow/block/limit/...).
    pub outcome: String,

    /// Free-text description of the rule that fired. May embed a usage
    /// annotation in the shape `limit:<pattern> (<used>/<max>)`.
    pub rule: String,

    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Aggregated outcome counters for a log window.
///
/// `total` always equals the sum of the seven named counters when built
/// through [`StatsSummary::tally`]; deserialized values from the backend
/// are taken as-is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub allow: u64,
    pub block: u64,
    pub limit: u64,
    pub ratelimit: u64,
    pub redirect: u64,
    pub flagged: u64,
    pub other: u64,
    pub total: u64,
}

impl StatsSummary {
    /// Count outcome strings into the seven named buckets. Unrecognized
    /// outcomes fall into `other`; `total` is the sum of all buckets.
    pub fn tally<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut s = StatsSummary::default();
        for outcome in outcomes {
            match outcome {
                "allow" => s.allow += 1,
                "block" => s.block += 1,
                "limit" => s.limit += 1,
                "ratelimit" => s.ratelimit += 1,
                "redirect" => s.redirect += 1,
                "flagged" => s.flagged += 1,
                _ => s.other += 1,
            }
        }
        s.total = s.allow + s.block + s.limit + s.ratelimit + s.redirect + s.flagged + s.other;
        s
    }

    /// Whether `total` matches the sum of the named counters.
    pub fn is_balanced(&self) -> bool {
        self.total
            == self.allow
                + self.block
                + self.limit
                + self.ratelimit
                + self.redirect
                + self.flagged
                + self.other
    }
}

// ================================================================================================
// RANGE SELECTORS
// ================================================================================================

/// Time window selector understood by the backend and the bucketer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "24h")]
    Last24h,
    #[serde(rename = "7d")]
    Last7d,
    #[serde(rename = "15d")]
    Last15d,
    #[serde(rename = "1m")]
    Last1m,
    #[serde(rename = "6m")]
    Last6m,
    #[serde(rename = "1y")]
    Last1y,
}

impl TimeRange {
    /// All selectors, in menu order.
    pub fn all() -> [TimeRange; 6] {
        [
            TimeRange::Last24h,
            TimeRange::Last7d,
            TimeRange::Last15d,
            TimeRange::Last1m,
            TimeRange::Last6m,
            TimeRange::Last1y,
        ]
    }

    /// Wire identifier used in `?range=` query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last24h => "24h",
            TimeRange::Last7d => "7d",
            TimeRange::Last15d => "15d",
            TimeRange::Last1m => "1m",
            TimeRange::Last6m => "6m",
            TimeRange::Last1y => "1y",
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(TimeRange::Last24h),
            "7d" => Ok(TimeRange::Last7d),
            "15d" => Ok(TimeRange::Last15d),
            "1m" => Ok(TimeRange::Last1m),
            "6m" => Ok(TimeRange::Last6m),
            "1y" => Ok(TimeRange::Last1y),
            other => Err(format!("unknown range selector '{}'", other)),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ================================================================================================
// RISK / PROTECTION CLASSIFICATIONS
// ================================================================================================

/// Discrete threat-exposure classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Discrete enforcement-strength classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionLevel {
    Low,
    Medium,
    High,
}

/// Externally computed risk classification for the last 24 hours.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Last24hInsight {
    pub detections: u64,
    pub risk_level: RiskLevel,
}

/// Externally computed traffic breakdown for the last 7 days.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Last7dInsight {
    pub total_detected: u64,
    pub blocked: u64,
    pub limited: u64,
    pub allowed: u64,
}

/// One entry of the per-bot-type breakdown.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotTypeCount {
    pub bot_type: String,
    pub count: u64,
}

/// Risk/protection classification computed by the log-insights collaborator.
///
/// This crate accepts the shape as-is; it never recomputes the contained
/// levels (see the scorer for the local fallback classifier).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInsights {
    pub last24h: Last24hInsight,
    #[serde(default)]
    pub last7days: Last7dInsight,
    #[serde(default)]
    pub by_bot_type: Vec<BotTypeCount>,
    pub protection_level: ProtectionLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_balances_with_unknown_outcomes() {
        let outcomes = ["allow", "block", "weird", "allow", "flagged"];
        let s = StatsSummary::tally(outcomes);
        assert_eq!(s.allow, 2);
        assert_eq!(s.block, 1);
        assert_eq!(s.flagged, 1);
        assert_eq!(s.other, 1);
        assert_eq!(s.total, 5);
        assert!(s.is_balanced());
    }

    #[test]
    fn test_range_round_trip() {
        for range in TimeRange::all() {
            let parsed: TimeRange = range.as_str().parse().unwrap();
            assert_eq!(parsed, range);
        }
        assert!("2h".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_policy_serde_lowercase() {
        let json = serde_json::to_string(&Policy::Restricted).unwrap();
        assert_eq!(json, "\"restricted\"");
        let back: Policy = serde_json::from_str("\"tariff\"").unwrap();
        assert_eq!(back, Policy::Tariff);
    }

    #[test]
    fn test_insights_wire_shape() {
        let json = r#"{
            "last24h": { "detections": 12, "riskLevel": "medium" },
            "last7days": { "totalDetected": 80, "blocked": 30, "limited": 10, "allowed": 40 },
            "byBotType": [{ "botType": "scraper", "count": 5 }],
            "protectionLevel": "high"
        }"#;
        let insights: RiskInsights = serde_json::from_str(json).unwrap();
        assert_eq!(insights.last24h.detections, 12);
        assert_eq!(insights.last24h.risk_level, RiskLevel::Medium);
        assert_eq!(insights.by_bot_type[0].bot_type, "scraper");
        assert_eq!(insights.protection_level, ProtectionLevel::High);
    }
}
