use crate::dora::DateRange;
use crate::model::Metric;
use crate::store::{MetricFilter, MetricStore};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub commits: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotEntry {
    pub name: String,
    pub changes: u64,
    /// Percentage of all changes in the window, one decimal.
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorActivity {
    pub author: String,
    pub commits: u64,
}

/// Commit volume by calendar day plus directory/extension hotspots and
/// author leaderboard. Always structurally complete; empty windows yield
/// zero totals and empty lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitActivityReport {
    pub total_commits: u64,
    pub daily: Vec<DailyCount>,
    pub directories: Vec<HotspotEntry>,
    pub extensions: Vec<HotspotEntry>,
    pub authors: Vec<AuthorActivity>,
}

fn share_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// A failing sub-query degrades to an empty facet rather than blanking the
/// whole report.
async fn rows_or_empty(store: &dyn MetricStore, filter: &MetricFilter, facet: &str) -> Vec<Metric> {
    match store.list(filter).await {
        Ok(rows) => rows,
        Err(err) => {
            warn!(facet = facet, error = %err, "Analytics sub-query failed; treating as empty");
            Vec::new()
        }
    }
}

fn hotspots(rows: &[Metric], key: &str) -> Vec<HotspotEntry> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for metric in rows {
        if let Some(name) = metric.dimensions.get_str(key) {
            *counts.entry(name.to_string()).or_insert(0) += metric.value as u64;
        }
    }
    let total: u64 = counts.values().sum();
    let mut entries: Vec<HotspotEntry> = counts
        .into_iter()
        .map(|(name, changes)| HotspotEntry {
            name,
            changes,
            share: share_of(changes, total),
        })
        .collect();
    entries.sort_by(|a, b| b.changes.cmp(&a.changes).then(a.name.cmp(&b.name)));
    entries
}

pub async fn calculate(
    store: &dyn MetricStore,
    window: &DateRange,
    repository: Option<&str>,
) -> CommitActivityReport {
    let scoped = |name: &str| {
        let mut filter = MetricFilter::new()
            .name(name)
            .since(window.start)
            .until(window.end);
        if let Some(repo) = repository {
            filter = filter.dimensions(crate::model::Dimensions::new().set("repository", repo));
        }
        filter
    };

    let pushes = rows_or_empty(store, &scoped("github.push.commits.total"), "commits").await;
    let directories = rows_or_empty(store, &scoped("commit.directory_change"), "directories").await;
    let extensions = rows_or_empty(store, &scoped("commit.file_extension"), "extensions").await;

    // Calendar-date grouping, not fixed-width buckets from the window
    // start: a push at 23:50 and one at 00:10 land on different days.
    let mut daily: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut authors: BTreeMap<String, u64> = BTreeMap::new();
    let mut total_commits = 0u64;
    for push in &pushes {
        let commits = push.value as u64;
        total_commits += commits;
        *daily.entry(push.timestamp.date_naive()).or_insert(0) += commits;
        if let Some(author) = push.dimensions.get_str("pusher") {
            *authors.entry(author.to_string()).or_insert(0) += commits;
        }
    }

    let mut authors: Vec<AuthorActivity> = authors
        .into_iter()
        .map(|(author, commits)| AuthorActivity { author, commits })
        .collect();
    authors.sort_by(|a, b| b.commits.cmp(&a.commits).then(a.author.cmp(&b.author)));

    CommitActivityReport {
        total_commits,
        daily: daily
            .into_iter()
            .map(|(date, commits)| DailyCount { date, commits })
            .collect(),
        directories: hotspots(&directories, "directory"),
        extensions: hotspots(&extensions, "extension"),
        authors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_rounds_to_one_decimal_and_guards_zero() {
        assert_eq!(share_of(1, 3), 33.3);
        assert_eq!(share_of(2, 3), 66.7);
        assert_eq!(share_of(0, 0), 0.0);
        assert_eq!(share_of(5, 5), 100.0);
    }
}
