//! Rule Policy Model - the working set of access rules.
//!
//! Holds the rules an operator is editing, applies field-level updates,
//! and produces sanitized payloads for the whole-collection replace the
//! backend expects.
//!
//! # Invariants
//! - Updates are copy-on-write: a slot is replaced with a fresh `Arc`, so
//!   anything still holding the previous rule observes no change.
//! - Sanitization nulls every field the active policy does not use; a
//!   saved rule never carries a stale quota, fee or redirect target.
//! - Quota/fee totals skip rules whose relevant field is unset. `None`
//!   means "not configured", which is distinct from a zero quota.

use crate::error::RadarError;
use crate::types::{Policy, Rule};
use std::sync::Arc;

/// Partial update for a single rule. `None` leaves the field untouched;
/// the nested options on `limit`/`fee`/`redirect_url` allow explicitly
/// clearing a value.
#[derive(Clone, Debug, Default)]
pub struct RulePatch {
    pub agent_name: Option<String>,
    pub pattern: Option<String>,
    pub policy: Option<Policy>,
    pub limit: Option<Option<u64>>,
    pub fee: Option<Option<f64>>,
    pub redirect_url: Option<Option<String>>,
}

impl RulePatch {
    /// Patch that only switches the policy.
    pub fn policy(policy: Policy) -> Self {
        RulePatch {
            policy: Some(policy),
            ..Default::default()
        }
    }

    /// Patch that only sets the quota ceiling.
    pub fn limit(limit: u64) -> Self {
        RulePatch {
            limit: Some(Some(limit)),
            ..Default::default()
        }
    }

    /// Patch that only sets the per-request fee.
    pub fn fee(fee: f64) -> Self {
        RulePatch {
            fee: Some(Some(fee)),
            ..Default::default()
        }
    }
}

/// Per-policy rule counts plus derived totals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicyCounts {
    pub allow: usize,
    pub block: usize,
    pub restricted: usize,
    pub tariff: usize,
    pub redirect: usize,

    /// Number of rules in the set.
    pub total: usize,

    /// Sum of `limit` across restricted rules with a configured quota.
    pub total_quota: u64,

    /// Sum of `fee` across tariff rules with a configured fee.
    pub total_fees: f64,
}

/// The working set of rules being edited.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Arc<Rule>>,
}

impl RuleSet {
    /// Empty working set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Working set seeded from a fetched rule collection.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        RuleSet {
            rules: rules.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Shared view of the current rules.
    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    pub fn get(&self, index: usize) -> Option<Arc<Rule>> {
        self.rules.get(index).map(Arc::clone)
    }

    /// Append a new rule to the end of the set.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(Arc::new(rule));
    }

    /// Remove the rule at `index`, failing loudly when out of range.
    pub fn remove(&mut self, index: usize) -> Result<Arc<Rule>, RadarError> {
        if index >= self.rules.len() {
            return Err(RadarError::IndexOutOfRange {
                index,
                len: self.rules.len(),
            });
        }
        Ok(self.rules.remove(index))
    }

    /// Merge `patch` into the rule at `index`.
    ///
    /// The existing rule is copied, the patch applied to the copy, and the
    /// slot replaced. Out-of-range indices return an explicit error and
    /// leave the set untouched.
    pub fn update_rule(&mut self, index: usize, patch: RulePatch) -> Result<(), RadarError> {
        let len = self.rules.len();
        let slot = self
            .rules
            .get_mut(index)
            .ok_or(RadarError::IndexOutOfRange { index, len })?;

        let mut updated = (**slot).clone();
        if let Some(agent_name) = patch.agent_name {
            updated.agent_name = agent_name;
        }
        if let Some(pattern) = patch.pattern {
            updated.pattern = pattern;
        }
        if let Some(policy) = patch.policy {
            updated.policy = policy;
        }
        if let Some(limit) = patch.limit {
            updated.limit = limit;
        }
        if let Some(fee) = patch.fee {
            updated.fee = fee;
        }
        if let Some(redirect_url) = patch.redirect_url {
            updated.redirect_url = redirect_url;
        }

        *slot = Arc::new(updated);
        Ok(())
    }

    /// Sanitized copy of the set, ready for the whole-collection replace.
    pub fn sanitized(&self) -> Vec<Rule> {
        sanitize_for_save(self.rules.iter().map(Arc::as_ref))
    }

    /// Per-policy counts plus quota/fee totals for the current set.
    pub fn counts(&self) -> PolicyCounts {
        let mut counts = PolicyCounts {
            total: self.rules.len(),
            ..Default::default()
        };

        for rule in &self.rules {
            match rule.policy {
                Policy::Allow => counts.allow += 1,
                Policy::Block => counts.block += 1,
                Policy::Restricted => counts.restricted += 1,
                Policy::Tariff => counts.tariff += 1,
                Policy::Redirect => counts.redirect += 1,
            }
            if rule.policy.uses_limit() {
                if let Some(limit) = rule.limit {
                    counts.total_quota += limit;
                }
            }
            if rule.policy.uses_fee() {
                if let Some(fee) = rule.fee {
                    counts.total_fees += fee;
                }
            }
        }

        counts
    }
}

/// Retain only the fields each rule's policy uses; null everything else.
///
/// The backend stores rules verbatim, so a limit left over from a previous
/// `restricted` phase would silently resurface if the rule ever switched
/// back. Nulling here keeps the stored shape honest.
pub fn sanitize_for_save<'a, I>(rules: I) -> Vec<Rule>
where
    I: IntoIterator<Item = &'a Rule>,
{
    rules
        .into_iter()
        .map(|rule| {
            let mut clean = rule.clone();
            if !clean.policy.uses_limit() {
                clean.limit = None;
            }
            if !clean.policy.uses_fee() {
                clean.fee = None;
            }
            if !clean.policy.uses_redirect() {
                clean.redirect_url = None;
            }
            clean
        })
        .collect()
}

/// Parse quota text from an external form, coercing malformed input to 0.
pub fn coerce_limit(text: &str) -> u64 {
    text.trim().parse().unwrap_or(0)
}

/// Parse fee text from an external form, coercing malformed input to 0.
/// Negative values are clamped; a fee below zero is never meaningful.
pub fn coerce_fee(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> RuleSet {
        RuleSet::from_rules(vec![
            Rule::new("GPTBot", "GPTBot", Policy::Block),
            Rule::new("ClaudeAI", "ClaudeAI", Policy::Allow),
            Rule {
                limit: Some(500),
                ..Rule::new("Perplexity", "Perplexity", Policy::Restricted)
            },
            Rule::new("Bingbot", "Bingbot", Policy::Restricted),
        ])
    }

    #[test]
    fn test_counts_scenario() {
        let set = sample_set();
        let counts = set.counts();
        assert_eq!(counts.block, 1);
        assert_eq!(counts.allow, 1);
        assert_eq!(counts.restricted, 2);
        assert_eq!(counts.tariff, 0);
        assert_eq!(counts.total, 4);
        // The unset quota on the second restricted rule does not contribute.
        assert_eq!(counts.total_quota, 500);
    }

    #[test]
    fn test_counts_idempotent() {
        let set = sample_set();
        assert_eq!(set.counts(), set.counts());
    }

    #[test]
    fn test_fee_total_skips_unset() {
        let mut set = RuleSet::from_rules(vec![
            Rule {
                fee: Some(0.05),
                ..Rule::new("Scraper", "scraper", Policy::Tariff)
            },
            Rule::new("Crawler", "crawler", Policy::Tariff),
        ]);
        assert!((set.counts().total_fees - 0.05).abs() < f64::EPSILON);

        set.update_rule(1, RulePatch::fee(0.10)).unwrap();
        assert!((set.counts().total_fees - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_update_rule_out_of_range() {
        let mut set = sample_set();
        let err = set.update_rule(4, RulePatch::policy(Policy::Allow));
        match err {
            Err(RadarError::IndexOutOfRange { index: 4, len: 4 }) => {}
            other => panic!("expected IndexOutOfRange, got {:?}", other),
        }
        // Working set untouched.
        assert_eq!(set.counts(), sample_set().counts());
    }

    #[test]
    fn test_update_rule_copy_on_write() {
        let mut set = sample_set();
        let before = set.get(0).unwrap();

        set.update_rule(0, RulePatch::policy(Policy::Allow)).unwrap();

        // The old reference still sees the original policy.
        assert_eq!(before.policy, Policy::Block);
        assert_eq!(set.get(0).unwrap().policy, Policy::Allow);
    }

    #[test]
    fn test_sanitize_nulls_inactive_fields() {
        let set = RuleSet::from_rules(vec![
            Rule {
                limit: Some(100),
                fee: Some(1.0),
                redirect_url: Some("https://example.com".into()),
                ..Rule::new("A", "a", Policy::Block)
            },
            Rule {
                limit: Some(100),
                fee: Some(1.0),
                redirect_url: Some("https://example.com".into()),
                ..Rule::new("B", "b", Policy::Restricted)
            },
            Rule {
                limit: Some(100),
                fee: Some(1.0),
                redirect_url: Some("https://example.com".into()),
                ..Rule::new("C", "c", Policy::Tariff)
            },
            Rule {
                limit: Some(100),
                fee: Some(1.0),
                redirect_url: Some("https://example.com".into()),
                ..Rule::new("D", "d", Policy::Redirect)
            },
        ]);

        let clean = set.sanitized();
        assert_eq!(clean[0].limit, None);
        assert_eq!(clean[0].fee, None);
        assert_eq!(clean[0].redirect_url, None);

        assert_eq!(clean[1].limit, Some(100));
        assert_eq!(clean[1].fee, None);
        assert_eq!(clean[1].redirect_url, None);

        assert_eq!(clean[2].limit, None);
        assert_eq!(clean[2].fee, Some(1.0));
        assert_eq!(clean[2].redirect_url, None);

        assert_eq!(clean[3].limit, None);
        assert_eq!(clean[3].fee, None);
        assert_eq!(clean[3].redirect_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_coerce_malformed_numeric_input() {
        assert_eq!(coerce_limit("500"), 500);
        assert_eq!(coerce_limit("  42 "), 42);
        assert_eq!(coerce_limit("abc"), 0);
        assert_eq!(coerce_limit(""), 0);
        assert_eq!(coerce_limit("-5"), 0);

        assert!((coerce_fee("0.25") - 0.25).abs() < f64::EPSILON);
        assert_eq!(coerce_fee("not a number"), 0.0);
        assert_eq!(coerce_fee("-1.5"), 0.0);
    }
}
