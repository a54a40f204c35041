// Time-series bucketing and order-statistic reductions used by the DORA
// calculators and analytics reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Grouping interval for windowed reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Day,
    Week,
    Month,
}

impl Interval {
    pub fn seconds(&self) -> i64 {
        match self {
            Interval::Day => 86_400,
            Interval::Week => 7 * 86_400,
            // Fixed-width month bucket; calendar-aware grouping is done by
            // the analytics layer where local dates matter.
            Interval::Month => 30 * 86_400,
        }
    }
}

/// One materialized bucket of a partitioned window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub count: u64,
    pub sum: f64,
}

/// Partition `[window_start, window_end)` into fixed-width buckets of
/// `interval_secs` and assign each observation by
/// `floor((t - window_start) / interval)`.
///
/// Every bucket is materialized, empty ones included, so callers can index
/// bucket `i` without a presence check. Observations outside the window are
/// ignored. A trailing partial interval still gets a bucket (its `end` is
/// clamped to the window end).
pub fn bucket_by(
    series: &[(DateTime<Utc>, f64)],
    interval_secs: i64,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<Bucket> {
    if interval_secs <= 0 || window_end <= window_start {
        return Vec::new();
    }

    let window_secs = (window_end - window_start).num_seconds();
    let bucket_count = ((window_secs + interval_secs - 1) / interval_secs) as usize;

    let mut buckets: Vec<Bucket> = (0..bucket_count)
        .map(|i| {
            let start = window_start + chrono::Duration::seconds(interval_secs * i as i64);
            let end = std::cmp::min(
                start + chrono::Duration::seconds(interval_secs),
                window_end,
            );
            Bucket {
                start,
                end,
                count: 0,
                sum: 0.0,
            }
        })
        .collect();

    for (timestamp, value) in series {
        if *timestamp < window_start || *timestamp >= window_end {
            continue;
        }
        let offset = (*timestamp - window_start).num_seconds();
        let index = (offset / interval_secs) as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.count += 1;
            bucket.sum += value;
        }
    }

    buckets
}

/// Arithmetic mean; 0.0 on empty input.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle element for odd lengths, mean of the two central elements for
/// even lengths; 0.0 on empty input.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Nearest-rank percentile: sort ascending, take
/// `ceil(n * p / 100) - 1` clamped to `[0, n-1]`.
///
/// No interpolation; downstream determinism tests depend on exact element
/// selection. 0.0 on empty input.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len() as f64;
    let rank = (n * p / 100.0).ceil() as i64 - 1;
    let index = rank.clamp(0, sorted.len() as i64 - 1) as usize;
    sorted[index]
}
