//! # Radar Viewer CLI
//!
//! Command-line tool for inspecting exported access-log records.
//!
//! Usage:
//!   radar-viewer --file logs.json stats
//!   radar-viewer --file logs.json agents [--limit N]
//!   radar-viewer --file logs.json buckets [--range 24h]
//!   radar-viewer --file logs.json usage
//!   radar-viewer --file logs.json recent [--limit N]

use clap::{Parser, Subcommand};
use radar::aggregate::aggregate;
use radar::score::{block_ratio, local_risk_level};
use radar::types::{LogRecord, TimeRange};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "radar-viewer")]
#[command(about = "Inspect exported access-log records", long_about = None)]
struct Cli {
    /// Path to an exported log file (JSON array or one JSON record per line)
    #[arg(short, long)]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the outcome summary and local risk classification
    Stats,

    /// Show hit counts per agent
    Agents {
        /// Maximum number of agents to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show time-bucketed hit counts
    Buckets {
        /// Range selector (24h, 7d, 15d, 1m, 6m, 1y)
        #[arg(short, long, default_value = "24h")]
        range: TimeRangeArg,
    },

    /// Show the latest usage-limit snapshots
    Usage,

    /// Show the most recent records
    Recent {
        /// Maximum number of records to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

/// clap-parsable wrapper around the range selector.
#[derive(Clone)]
struct TimeRangeArg(TimeRange);

impl std::str::FromStr for TimeRangeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(TimeRangeArg)
    }
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();

    let records = load_records(&cli.file)?;

    match cli.command {
        Commands::Stats => {
            let agg = aggregate(&records, TimeRange::Last24h);
            let s = &agg.summary;

            println!("📊 Outcome Summary ({} records)\n", s.total);
            println!("Allowed:      {}", s.allow);
            println!("Blocked:      {}", s.block);
            println!("Limited:      {}", s.limit);
            println!("Rate-limited: {}", s.ratelimit);
            println!("Redirected:   {}", s.redirect);
            println!("Flagged:      {}", s.flagged);
            println!("Other:        {}", s.other);
            println!();
            println!(
                "Block ratio:  {:.1}%  →  {:?} risk (local classifier)",
                block_ratio(s) * 100.0,
                local_risk_level(s)
            );
        }

        Commands::Agents { limit } => {
            let agg = aggregate(&records, TimeRange::Last24h);

            println!("🤖 Hits by agent:\n");
            let mut agents = agg.by_agent;
            agents.sort_by(|a, b| b.1.cmp(&a.1));
            for (agent, count) in agents.into_iter().take(limit) {
                println!("{:>8}  {}", count, agent);
            }
        }

        Commands::Buckets { range } => {
            let agg = aggregate(&records, range.0);

            println!("🕒 Hits over {} ({} buckets):\n", range.0, agg.bucket_labels.len());
            for (label, count) in agg.bucket_labels.iter().zip(&agg.bucket_counts) {
                println!("{:>8}  {}", label, count);
            }
            let in_range: u64 = agg.bucket_counts.iter().sum();
            let dropped = agg.summary.total - in_range;
            if dropped > 0 {
                println!("\n({} records outside the {} window)", dropped, range.0);
            }
        }

        Commands::Usage => {
            let agg = aggregate(&records, TimeRange::Last24h);

            if agg.usage_limits.is_empty() {
                println!("No usage limits reported in this record set");
            } else {
                println!("📈 Usage limits (latest snapshot per pattern):\n");
                for snap in &agg.usage_limits {
                    println!(
                        "{:<24} {:>6}/{:<6} ({:>3}%)",
                        snap.pattern,
                        snap.used,
                        snap.max,
                        snap.percent()
                    );
                }
            }
        }

        Commands::Recent { limit } => {
            println!("📋 Most recent {} records:\n", limit);
            let mut sorted: Vec<&LogRecord> = records.iter().collect();
            sorted.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
            for record in sorted.into_iter().take(limit) {
                print_record(record);
            }
        }
    }

    Ok(())
}

fn load_records(path: &PathBuf) -> Result<Vec<LogRecord>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    // Whole-file JSON array first, then one record per line.
    if let Ok(records) = serde_json::from_str::<Vec<LogRecord>>(&text) {
        return Ok(records);
    }

    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: LogRecord = serde_json::from_str(line)
            .map_err(|e| format!("Failed to parse record on line {}: {}", idx + 1, e))?;
        records.push(record);
    }
    Ok(records)
}

fn print_record(record: &LogRecord) {
    let icon = match record.outcome.as_str() {
        "allow" => "✅",
        "block" => "🚫",
        "limit" | "ratelimit" => "⏳",
        "redirect" => "↪️",
        "flagged" => "🚩",
        _ => "❔",
    };

    println!(
        "{} {} | {} | {} | {} | {}",
        icon,
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.ip_address,
        record.path,
        record.outcome,
        record.user_agent
    );
    println!("   ↳ rule: {}", record.rule);
    println!();
}
