//! Integration tests for the rule policy model.

use radar::policy::{sanitize_for_save, RulePatch, RuleSet};
use radar::types::{Policy, Rule};
use radar::RadarError;

fn restricted(name: &str, limit: Option<u64>) -> Rule {
    Rule {
        limit,
        ..Rule::new(name, name, Policy::Restricted)
    }
}

#[test]
fn counts_report_policies_and_quota_total() {
    // Rules: block, allow, restricted(500), restricted(unset).
    let set = RuleSet::from_rules(vec![
        Rule::new("GPTBot", "GPTBot", Policy::Block),
        Rule::new("Googlebot", "Googlebot", Policy::Allow),
        restricted("ClaudeAI", Some(500)),
        restricted("Perplexity", None),
    ]);

    let counts = set.counts();
    assert_eq!(counts.block, 1);
    assert_eq!(counts.allow, 1);
    assert_eq!(counts.restricted, 2);
    assert_eq!(counts.total_quota, 500);

    // Idempotent over an unmodified set.
    assert_eq!(set.counts(), counts);
}

#[test]
fn sanitize_never_leaks_fields_across_policies() {
    // Every rule starts fully populated; after sanitizing, each policy
    // keeps only its own field.
    let dirty: Vec<Rule> = [
        Policy::Allow,
        Policy::Block,
        Policy::Restricted,
        Policy::Tariff,
        Policy::Redirect,
    ]
    .into_iter()
    .map(|policy| Rule {
        limit: Some(10),
        fee: Some(0.5),
        redirect_url: Some("https://example.com/paywall".into()),
        ..Rule::new("agent", "pattern", policy)
    })
    .collect();

    for rule in sanitize_for_save(dirty.iter()) {
        if !rule.policy.uses_limit() {
            assert_eq!(rule.limit, None, "{} kept a limit", rule.policy);
        }
        if !rule.policy.uses_fee() {
            assert_eq!(rule.fee, None, "{} kept a fee", rule.policy);
        }
        if !rule.policy.uses_redirect() {
            assert_eq!(rule.redirect_url, None, "{} kept a redirect", rule.policy);
        }
    }
}

#[test]
fn policy_switch_then_save_drops_the_old_configuration() {
    let mut set = RuleSet::from_rules(vec![restricted("ClaudeAI", Some(500))]);

    // Operator switches the rule to plain block; the quota must not
    // survive the save.
    set.update_rule(0, RulePatch::policy(Policy::Block)).unwrap();
    let saved = set.sanitized();
    assert_eq!(saved[0].policy, Policy::Block);
    assert_eq!(saved[0].limit, None);
}

#[test]
fn update_out_of_range_is_loud_and_harmless() {
    let mut set = RuleSet::from_rules(vec![Rule::new("GPTBot", "GPTBot", Policy::Allow)]);
    let err = set.update_rule(3, RulePatch::limit(10)).unwrap_err();
    assert!(matches!(
        err,
        RadarError::IndexOutOfRange { index: 3, len: 1 }
    ));
    assert_eq!(set.get(0).unwrap().policy, Policy::Allow);
}

#[test]
fn updates_are_copy_on_write() {
    let mut set = RuleSet::from_rules(vec![restricted("ClaudeAI", Some(500))]);
    let held = set.get(0).unwrap();

    set.update_rule(0, RulePatch::limit(900)).unwrap();

    assert_eq!(held.limit, Some(500));
    assert_eq!(set.get(0).unwrap().limit, Some(900));
}

#[test]
fn rule_wire_shape_round_trips() {
    let rule = Rule {
        id: Some("r-1".into()),
        fee: Some(0.02),
        ..Rule::new("Scraper", "scraper-pattern", Policy::Tariff)
    };
    let json = serde_json::to_string(&rule).unwrap();
    let back: Rule = serde_json::from_str(&json).unwrap();
    assert_eq!(back, rule);

    // Unsaved rules serialize without an id key.
    let fresh = Rule::new("New", "new", Policy::Allow);
    let json = serde_json::to_string(&fresh).unwrap();
    assert!(!json.contains("\"id\""));
}
