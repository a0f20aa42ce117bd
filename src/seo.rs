//! SEO exports derived from the rule working set.
//!
//! robots.txt and robots meta tags are advisory companions to the real
//! enforcement at the edge: well-behaved crawlers honor them, everything
//! else meets the firewall. Quota and fee policies cannot be expressed in
//! robots directives, so they render as disallowed and rely on the edge
//! for the nuance.

use crate::types::{Policy, Rule};
use std::fmt::Write;

/// Render one robots.txt group per rule.
pub fn robots_txt<'a, I>(rules: I) -> String
where
    I: IntoIterator<Item = &'a Rule>,
{
    let mut out = String::new();
    for rule in rules {
        let _ = writeln!(out, "User-agent: {}", rule.pattern);
        match rule.policy {
            Policy::Allow => {
                let _ = writeln!(out, "Allow: /");
            }
            _ => {
                let _ = writeln!(out, "Disallow: /");
            }
        }
        out.push('\n');
    }
    out
}

/// Render one robots meta tag per rule, carrying the rule pattern.
pub fn meta_robots_tags<'a, I>(rules: I) -> String
where
    I: IntoIterator<Item = &'a Rule>,
{
    let mut out = String::new();
    for rule in rules {
        let content = match rule.policy {
            Policy::Block => "noindex, nofollow",
            Policy::Allow => "index, follow",
            _ => "index, nofollow",
        };
        let _ = writeln!(
            out,
            "<meta name=\"robots\" content=\"{}\" data-pattern=\"{}\" />",
            content, rule.pattern
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robots_txt_policy_mapping() {
        let rules = vec![
            Rule::new("GPTBot", "GPTBot", Policy::Block),
            Rule::new("Googlebot", "Googlebot", Policy::Allow),
            Rule::new("ClaudeAI", "ClaudeAI", Policy::Restricted),
        ];
        let txt = robots_txt(rules.iter());
        assert!(txt.contains("User-agent: GPTBot\nDisallow: /"));
        assert!(txt.contains("User-agent: Googlebot\nAllow: /"));
        assert!(txt.contains("User-agent: ClaudeAI\nDisallow: /"));
    }

    #[test]
    fn test_meta_tags_policy_mapping() {
        let rules = vec![
            Rule::new("GPTBot", "GPTBot", Policy::Block),
            Rule::new("Googlebot", "Googlebot", Policy::Allow),
            Rule::new("Scraper", "scraper", Policy::Tariff),
        ];
        let tags = meta_robots_tags(rules.iter());
        assert!(tags.contains("content=\"noindex, nofollow\" data-pattern=\"GPTBot\""));
        assert!(tags.contains("content=\"index, follow\" data-pattern=\"Googlebot\""));
        assert!(tags.contains("content=\"index, nofollow\" data-pattern=\"scraper\""));
    }

    #[test]
    fn test_empty_rule_set_renders_empty() {
        assert_eq!(robots_txt(std::iter::empty()), "");
        assert_eq!(meta_robots_tags(std::iter::empty()), "");
    }
}
