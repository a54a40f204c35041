// Periodic rollups: raw observations condensed into named aggregates

use crate::dora::DateRange;
use crate::errors::Result;
use crate::model::{Dimensions, Metric};
use crate::store::{MetricFilter, MetricStore};
use std::sync::Arc;
use tracing::info;

/// Condenses a raw metric series into a single aggregate row per
/// (name, dimensions) pair, so the DORA fallback chains can hit a cheap
/// pre-summed tier before scanning raw observations.
///
/// This is the only path in the system that mutates a stored metric.
pub struct MetricRollupService {
    store: Arc<dyn MetricStore>,
}

impl MetricRollupService {
    pub fn new(store: Arc<dyn MetricStore>) -> Self {
        Self { store }
    }

    /// Sum `source_name` rows in the window and upsert the result as
    /// `<target_name>` with the given dimension set: an existing aggregate
    /// with the exact same dimensions is updated in place, otherwise a new
    /// row is written. Returns the aggregate row.
    pub async fn rollup(
        &self,
        source_name: &str,
        target_name: &str,
        window: &DateRange,
        dimensions: Dimensions,
    ) -> Result<Metric> {
        let mut filter = MetricFilter::new()
            .name(source_name)
            .since(window.start)
            .until(window.end);
        if !dimensions.is_empty() {
            filter = filter.dimensions(dimensions.clone());
        }
        let rows = self.store.list(&filter).await?;
        let total: f64 = rows.iter().map(|m| m.value).sum();

        let aggregate = match self.store.find_aggregate(target_name, &dimensions).await? {
            Some(mut existing) => {
                existing.value = total;
                existing.timestamp = window.end;
                self.store.update(existing).await?
            }
            None => {
                let fresh = Metric::new(target_name, total, "dora", dimensions, window.end);
                self.store.save(fresh).await?
            }
        };

        info!(
            rollup.source = source_name,
            rollup.target = target_name,
            rollup.value = total,
            rollup.rows = rows.len(),
            "Rollup aggregate written"
        );
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMetricStore;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn rollup_creates_then_updates_one_aggregate_row() {
        let store = Arc::new(MemoryMetricStore::new());
        let rollups = MetricRollupService::new(store.clone());
        let end = Utc::now();
        let window = DateRange::new(end - Duration::hours(1), end);
        let dims = Dimensions::new().set("repository", "acme/api");

        for minutes in [50, 30, 10] {
            store
                .save(Metric::new(
                    "github.ci.deploy.completed",
                    1.0,
                    "github",
                    dims.clone(),
                    end - Duration::minutes(minutes),
                ))
                .await
                .unwrap();
        }

        let first = rollups
            .rollup(
                "github.ci.deploy.completed",
                "dora.deployment_frequency.hourly",
                &window,
                dims.clone(),
            )
            .await
            .unwrap();
        assert_eq!(first.value, 3.0);
        assert_eq!(first.source, "dora");

        // Another observation lands; re-rolling updates the same row.
        store
            .save(Metric::new(
                "github.ci.deploy.completed",
                1.0,
                "github",
                dims.clone(),
                end - Duration::minutes(5),
            ))
            .await
            .unwrap();

        let second = rollups
            .rollup(
                "github.ci.deploy.completed",
                "dora.deployment_frequency.hourly",
                &window,
                dims.clone(),
            )
            .await
            .unwrap();
        assert_eq!(second.value, 4.0);
        assert_eq!(second.id, first.id);

        let aggregates = store
            .list(&MetricFilter::new().name("dora.deployment_frequency.hourly"))
            .await
            .unwrap();
        assert_eq!(aggregates.len(), 1);
    }
}
