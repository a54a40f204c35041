use crate::aggregate::{self, Bucket, Interval};
use crate::dora::DateRange;
use crate::store::{MetricFilter, MetricStore};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Weekly issue-closure throughput.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamVelocityReport {
    pub total_closed: u64,
    pub weekly: Vec<WeeklyClosure>,
    /// Closures averaged over the weeks that actually had data, so a
    /// half-populated window is not diluted by empty calendar weeks.
    pub velocity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyClosure {
    pub week_start: chrono::DateTime<chrono::Utc>,
    pub closed: u64,
}

pub async fn calculate(
    store: &dyn MetricStore,
    window: &DateRange,
    repository: Option<&str>,
) -> TeamVelocityReport {
    let mut filter = MetricFilter::new()
        .name("github.issue.closed")
        .since(window.start)
        .until(window.end);
    if let Some(repo) = repository {
        filter = filter.dimensions(crate::model::Dimensions::new().set("repository", repo));
    }

    let rows = match store.list(&filter).await {
        Ok(rows) => rows,
        Err(err) => {
            warn!(error = %err, "Velocity query failed; treating as empty");
            Vec::new()
        }
    };

    let series: Vec<(chrono::DateTime<chrono::Utc>, f64)> =
        rows.iter().map(|m| (m.timestamp, m.value)).collect();
    let buckets = aggregate::bucket_by(&series, Interval::Week.seconds(), window.start, window.end);

    let weeks_with_data: Vec<&Bucket> = buckets.iter().filter(|b| b.count > 0).collect();
    let total_closed: u64 = weeks_with_data.iter().map(|b| b.sum as u64).sum();
    let velocity = if weeks_with_data.is_empty() {
        0.0
    } else {
        total_closed as f64 / weeks_with_data.len() as f64
    };

    TeamVelocityReport {
        total_closed,
        weekly: weeks_with_data
            .iter()
            .map(|b| WeeklyClosure {
                week_start: b.start,
                closed: b.sum as u64,
            })
            .collect(),
        velocity,
    }
}
