//! Risk / Protection Scorer.
//!
//! Two independent three-valued axes:
//! - **risk** summarizes recent threat exposure. The authoritative value
//!   comes from the log-insights collaborator; when that is unavailable a
//!   local threshold classifier over the outcome summary stands in.
//! - **protection** summarizes enforcement strength and is driven by
//!   whether enforcement is active, not by traffic shape.
//!
//! A view-model records which source produced its risk level so the two
//! classifiers are never silently mixed within one view.

use crate::types::{ProtectionLevel, RiskLevel, StatsSummary};
use serde::Serialize;

/// Block ratio above which the local classifier reports high risk.
const HIGH_RISK_BLOCK_RATIO: f64 = 0.5;

/// Which classifier produced a risk level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSource {
    /// Externally computed by the log-insights collaborator.
    External,
    /// Client-computable fallback from the outcome summary.
    Local,
}

/// Share of enforced traffic that was blocked: `block / (allow + block + limit)`.
///
/// An empty window reads as 0 rather than a division error.
pub fn block_ratio(summary: &StatsSummary) -> f64 {
    let considered = summary.allow + summary.block + summary.limit;
    if considered == 0 {
        0.0
    } else {
        summary.block as f64 / considered as f64
    }
}

/// Local fallback classifier over the outcome summary.
///
/// Only distinguishes high from low; `medium` is reserved for the richer
/// external classification.
pub fn local_risk_level(summary: &StatsSummary) -> RiskLevel {
    if block_ratio(summary) > HIGH_RISK_BLOCK_RATIO {
        RiskLevel::High
    } else {
        RiskLevel::Low
    }
}

/// Protection level from the enforcement-active signal.
///
/// `None` means no signal was available, which reads as unprotected.
pub fn protection_level(enforcement_active: Option<bool>) -> ProtectionLevel {
    match enforcement_active {
        Some(true) => ProtectionLevel::High,
        Some(false) | None => ProtectionLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(allow: u64, block: u64, limit: u64) -> StatsSummary {
        StatsSummary {
            allow,
            block,
            limit,
            total: allow + block + limit,
            ..Default::default()
        }
    }

    #[test]
    fn test_block_ratio_zero_guard() {
        assert_eq!(block_ratio(&StatsSummary::default()), 0.0);
    }

    #[test]
    fn test_local_risk_threshold() {
        assert_eq!(local_risk_level(&summary(10, 0, 0)), RiskLevel::Low);
        // Exactly half is not high.
        assert_eq!(local_risk_level(&summary(5, 5, 0)), RiskLevel::Low);
        assert_eq!(local_risk_level(&summary(2, 7, 1)), RiskLevel::High);
        assert_eq!(local_risk_level(&StatsSummary::default()), RiskLevel::Low);
    }

    #[test]
    fn test_ratio_ignores_unenforced_counters() {
        let mut s = summary(1, 9, 0);
        s.flagged = 50;
        s.other = 50;
        s.total = 110;
        assert_eq!(local_risk_level(&s), RiskLevel::High);
    }

    #[test]
    fn test_protection_defaults_low_without_signal() {
        assert_eq!(protection_level(None), ProtectionLevel::Low);
        assert_eq!(protection_level(Some(false)), ProtectionLevel::Low);
        assert_eq!(protection_level(Some(true)), ProtectionLevel::High);
    }
}
