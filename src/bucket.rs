//! Time-Bucketer - deterministic mapping from a range selector to chart
//! bucket labels.
//!
//! Each range produces a fixed, ordered list of labels (oldest → newest,
//! current bucket included) and a classification from timestamp to label.
//! Generation and lookup share one formatting function, so the two can
//! never drift apart; a timestamp lands in a bucket exactly when its own
//! label equals a generated one.
//!
//! Label equality alone cannot exclude old traffic on the `24h` range
//! (hour-of-day labels repeat every day), so [`TimeBuckets::slot`] guards
//! with the generated span before the label lookup. Out-of-range
//! timestamps map to no bucket.

use crate::types::TimeRange;
use chrono::{DateTime, Datelike, Days, Duration, Local, Months, NaiveDate, TimeZone, Timelike, Utc};
use std::collections::HashMap;

/// Number of weekly buckets in the `6m` range (~180 days).
const WEEKS_6M: i64 = 26;

/// Ordered bucket labels for one range, with the lookup side attached.
#[derive(Clone, Debug)]
pub struct TimeBuckets {
    range: TimeRange,
    labels: Vec<String>,
    index: HashMap<String, usize>,
    span_start: DateTime<Local>,
    span_end: DateTime<Local>,
}

impl TimeBuckets {
    /// Generate buckets for `range` anchored at the current instant.
    pub fn generate(range: TimeRange) -> Self {
        Self::generate_at(range, Local::now())
    }

    /// Generate buckets for `range` anchored at `now`.
    ///
    /// Exposed separately so aggregation over a fixed window is
    /// reproducible in tests.
    pub fn generate_at(range: TimeRange, now: DateTime<Local>) -> Self {
        let instants: Vec<DateTime<Local>> = match range {
            TimeRange::Last24h => (0..24).rev().map(|i| now - Duration::hours(i)).collect(),
            TimeRange::Last7d => (0..7).rev().map(|i| now - Duration::days(i)).collect(),
            TimeRange::Last15d => (0..15).rev().map(|i| now - Duration::days(i)).collect(),
            TimeRange::Last1m => (0..30).rev().map(|i| now - Duration::days(i)).collect(),
            TimeRange::Last6m => (0..WEEKS_6M)
                .rev()
                .map(|i| now - Duration::weeks(i))
                .collect(),
            TimeRange::Last1y => (0..12)
                .rev()
                .map(|i| {
                    now.checked_sub_months(Months::new(i))
                        .expect("month arithmetic stays in range")
                })
                .collect(),
        };

        let mut labels = Vec::with_capacity(instants.len());
        let mut index = HashMap::with_capacity(instants.len());
        for instant in &instants {
            let label = label_for(range, *instant);
            index.insert(label.clone(), labels.len());
            labels.push(label);
        }

        let span_start = span_start_for(range, instants[0]);

        TimeBuckets {
            range,
            labels,
            index,
            span_start,
            span_end: now,
        }
    }

    /// The range this bucket list was generated for.
    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Bucket labels, oldest first.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Bucket index for a timestamp, or `None` when it falls outside the
    /// generated span.
    pub fn slot(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        let local = timestamp.with_timezone(&Local);
        if local < self.span_start || local > self.span_end {
            return None;
        }
        self.index.get(&label_for(self.range, local)).copied()
    }

    /// Bucket label for a timestamp, or `None` when out of range.
    pub fn label_of(&self, timestamp: DateTime<Utc>) -> Option<&str> {
        self.slot(timestamp).map(|i| self.labels[i].as_str())
    }
}

/// The one formatting rule shared by generation and lookup.
fn label_for(range: TimeRange, t: DateTime<Local>) -> String {
    match range {
        TimeRange::Last24h => format!("{:02}:00", t.hour()),
        TimeRange::Last7d | TimeRange::Last15d | TimeRange::Last1m => month_day(t.date_naive()),
        TimeRange::Last6m => month_day(week_start(t.date_naive())),
        TimeRange::Last1y => format!("{} {}", t.format("%b"), t.format("%y")),
    }
}

/// Short month + day-of-month, e.g. `Aug 6`.
fn month_day(date: NaiveDate) -> String {
    format!("{} {}", date.format("%b"), date.day())
}

/// Monday of the week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}

/// Inclusive lower bound of the generated span, aligned to the oldest
/// bucket's own boundary.
fn span_start_for(range: TimeRange, oldest: DateTime<Local>) -> DateTime<Local> {
    match range {
        TimeRange::Last24h => truncate_to_hour(oldest),
        TimeRange::Last7d | TimeRange::Last15d | TimeRange::Last1m => {
            start_of_day(oldest.date_naive(), oldest)
        }
        TimeRange::Last6m => start_of_day(week_start(oldest.date_naive()), oldest),
        TimeRange::Last1y => {
            let first = oldest
                .date_naive()
                .with_day(1)
                .unwrap_or_else(|| oldest.date_naive());
            start_of_day(first, oldest)
        }
    }
}

fn truncate_to_hour(t: DateTime<Local>) -> DateTime<Local> {
    let secs = t.timestamp();
    Local
        .timestamp_opt(secs - secs.rem_euclid(3600), 0)
        .single()
        .unwrap_or(t)
}

fn start_of_day(date: NaiveDate, fallback: DateTime<Local>) -> DateTime<Local> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or(fallback)
}
