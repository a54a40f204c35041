// DORA performance indicators: deployment frequency, lead time for
// changes, time to restore service, change failure rate.

pub mod change_failure_rate;
pub mod deployment_frequency;
pub mod lead_time;
pub mod time_to_restore;

pub use change_failure_rate::ChangeFailureRateReport;
pub use deployment_frequency::DeploymentFrequencyReport;
pub use lead_time::{LeadTimeBreakdown, LeadTimeOptions, LeadTimeReport};
pub use time_to_restore::TimeToRestoreReport;

use crate::model::{Dimensions, Metric, Rating};
use crate::store::{MetricFilter, MetricStore};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Inclusive-start, inclusive-end aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn last_days(days: u32) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(days as i64),
            end,
        }
    }

    /// Window length in days, floored at 1 so per-day rates never divide
    /// by zero on sub-day windows.
    pub fn days(&self) -> f64 {
        let days = (self.end - self.start).num_seconds() as f64 / 86_400.0;
        days.max(1.0)
    }
}

/// One step of a fallback chain: a way of naming the metric rows to read,
/// optionally narrowed by a dimension subset.
#[derive(Debug, Clone)]
pub struct FallbackTier {
    pub matcher: NameMatcher,
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone)]
pub enum NameMatcher {
    Exact(&'static str),
    Contains(&'static str),
}

impl FallbackTier {
    pub fn exact(name: &'static str) -> Self {
        Self {
            matcher: NameMatcher::Exact(name),
            dimensions: None,
        }
    }

    pub fn contains(fragment: &'static str) -> Self {
        Self {
            matcher: NameMatcher::Contains(fragment),
            dimensions: None,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    fn describe(&self) -> String {
        match self.matcher {
            NameMatcher::Exact(name) => name.to_string(),
            NameMatcher::Contains(fragment) => format!("%{fragment}%"),
        }
    }
}

/// Walk a fallback chain in order and return the first tier that yields
/// rows, along with a description of which tier won. Tiers never merge; a
/// tier that fails with a storage error is logged and treated as empty so
/// one bad lookup cannot blank a composite report.
pub async fn first_non_empty(
    store: &dyn MetricStore,
    window: &DateRange,
    scope: Option<&Dimensions>,
    tiers: &[FallbackTier],
) -> (Vec<Metric>, Option<String>) {
    for tier in tiers {
        let mut filter = MetricFilter::new().since(window.start).until(window.end);
        filter = match tier.matcher {
            NameMatcher::Exact(name) => filter.name(name),
            NameMatcher::Contains(fragment) => filter.name_contains(fragment),
        };

        let mut dims = scope.cloned().unwrap_or_default();
        if let Some(tier_dims) = &tier.dimensions {
            for (k, v) in tier_dims.iter() {
                dims.insert(k.clone(), v.clone());
            }
        }
        if !dims.is_empty() {
            filter = filter.dimensions(dims);
        }

        match store.list(&filter).await {
            Ok(rows) if !rows.is_empty() => {
                return (rows, Some(tier.describe()));
            }
            Ok(_) => {}
            Err(err) => {
                warn!(
                    tier = tier.describe().as_str(),
                    error = %err,
                    "Fallback tier query failed; treating as empty"
                );
            }
        }
    }
    (Vec::new(), None)
}

fn scope_for(repository: Option<&str>) -> Option<Dimensions> {
    repository.map(|repo| Dimensions::new().set("repository", repo))
}

/// All four indicators plus the overall band, dashboard-ready.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoraDashboard {
    pub deployment_frequency: DeploymentFrequencyReport,
    pub lead_time: LeadTimeReport,
    pub time_to_restore: TimeToRestoreReport,
    pub change_failure_rate: ChangeFailureRateReport,
    pub overall: Rating,
}

/// Mean of the four ratings' ordinal scores, `Unknown` excluded from the
/// denominator, rounded to the nearest band.
pub fn overall_rating(ratings: &[Rating]) -> Rating {
    let known: Vec<u32> = ratings
        .iter()
        .filter(|r| **r != Rating::Unknown)
        .map(|r| r.score())
        .collect();
    if known.is_empty() {
        return Rating::Unknown;
    }
    let mean = known.iter().sum::<u32>() as f64 / known.len() as f64;
    Rating::from_score(mean.round() as u32)
}

/// Read-side facade over the four calculators.
pub struct DoraEngine {
    store: Arc<dyn MetricStore>,
}

impl DoraEngine {
    pub fn new(store: Arc<dyn MetricStore>) -> Self {
        Self { store }
    }

    pub async fn deployment_frequency(
        &self,
        window: &DateRange,
        repository: Option<&str>,
    ) -> DeploymentFrequencyReport {
        deployment_frequency::calculate(self.store.as_ref(), window, scope_for(repository).as_ref())
            .await
    }

    pub async fn lead_time(
        &self,
        window: &DateRange,
        repository: Option<&str>,
        options: &LeadTimeOptions,
    ) -> LeadTimeReport {
        lead_time::calculate(
            self.store.as_ref(),
            window,
            scope_for(repository).as_ref(),
            options,
        )
        .await
    }

    pub async fn time_to_restore(
        &self,
        window: &DateRange,
        repository: Option<&str>,
    ) -> TimeToRestoreReport {
        time_to_restore::calculate(self.store.as_ref(), window, scope_for(repository).as_ref())
            .await
    }

    pub async fn change_failure_rate(
        &self,
        window: &DateRange,
        repository: Option<&str>,
    ) -> ChangeFailureRateReport {
        change_failure_rate::calculate(self.store.as_ref(), window, scope_for(repository).as_ref())
            .await
    }

    pub async fn dashboard(&self, window: &DateRange, repository: Option<&str>) -> DoraDashboard {
        let deployment_frequency = self.deployment_frequency(window, repository).await;
        let lead_time = self
            .lead_time(window, repository, &LeadTimeOptions::default())
            .await;
        let time_to_restore = self.time_to_restore(window, repository).await;
        let change_failure_rate = self.change_failure_rate(window, repository).await;

        let overall = overall_rating(&[
            deployment_frequency.rating,
            lead_time.rating,
            time_to_restore.rating,
            change_failure_rate.rating,
        ]);

        DoraDashboard {
            deployment_frequency,
            lead_time,
            time_to_restore,
            change_failure_rate,
            overall,
        }
    }
}
