//! Example: building a dashboard snapshot without a backend.
//!
//! Generates a synthetic record set, runs the aggregation and scoring
//! pipeline over it, and prints the resulting view-model.
//!
//! Run with: `cargo run --example dashboard_snapshot`

use chrono::{Duration, Utc};
use radar::panel::RadarSnapshot;
use radar::score::RiskSource;
use radar::types::{LogRecord, TimeRange};

fn synthetic_record(i: i64) -> LogRecord {
    let agents = ["GPTBot/1.1", "ClaudeBot/1.0", "Bingbot/2.0", "curl/8.4"];
    let outcomes = ["allow", "block", "limit", "allow", "block", "block"];

    let rule = if i % 6 == 2 {
        format!("limit:gptbot ({}/500)", 100 + i * 10)
    } else if i % 6 == 1 || i % 6 == 4 || i % 6 == 5 {
        "block:bot-pattern".to_string()
    } else {
        "allow:default".to_string()
    };

    LogRecord {
        id: format!("rec-{}", i),
        timestamp: Utc::now() - Duration::minutes(i * 37),
        ip_address: format!("203.0.113.{}", i % 250),
        user_agent: agents[(i % 4) as usize].to_string(),
        path: "/articles".to_string(),
        referrer: None,
        accept_language: None,
        sec_ch_ua: None,
        sec_ch_ua_mobile: None,
        sec_ch_ua_platform: None,
        utm_source: None,
        fingerprint: None,
        js_executed: false,
        outcome: outcomes[(i % 6) as usize].to_string(),
        rule,
        redirect_url: None,
    }
}

fn main() {
    println!("=================================================");
    println!("  Dashboard Snapshot (synthetic data)            ");
    println!("=================================================");
    println!();

    let records: Vec<LogRecord> = (0..36).map(synthetic_record).collect();

    // No insights collaborator here, so the local classifier runs.
    let snapshot = RadarSnapshot::from_local(TimeRange::Last24h, &records, Some(true));

    let s = &snapshot.stats;
    println!("Outcome summary:");
    println!("  allow={} block={} limit={} other={} total={}", s.allow, s.block, s.limit, s.other, s.total);
    println!();

    println!(
        "Risk: {:?} (source: {})",
        snapshot.risk_level,
        match snapshot.risk_source {
            RiskSource::External => "insights collaborator",
            RiskSource::Local => "local threshold classifier",
        }
    );
    println!("Protection: {:?}", snapshot.protection_level);
    println!();

    println!("Hits by agent:");
    for (agent, count) in &snapshot.aggregation.by_agent {
        println!("  {:<12} {}", agent, count);
    }
    println!();

    println!("Usage limits:");
    for snap in &snapshot.aggregation.usage_limits {
        println!("  {} {}/{} ({}%)", snap.pattern, snap.used, snap.max, snap.percent());
    }
    println!();

    println!("Hits per hour (last 24h):");
    for (label, count) in snapshot
        .aggregation
        .bucket_labels
        .iter()
        .zip(&snapshot.aggregation.bucket_counts)
    {
        println!("  {}  {}", label, "▪".repeat(*count as usize));
    }
}
