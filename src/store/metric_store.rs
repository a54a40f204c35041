use super::filter::{MetricFilter, SortOrder};
use crate::errors::{DevPulseError, Result};
use crate::model::{Dimensions, Metric};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Persistence contract for metric records.
///
/// Queries that match nothing return empty results; errors are reserved
/// for connectivity/constraint failures (`DevPulseError::Storage`).
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Persist a new metric, stamping its id.
    async fn save(&self, metric: Metric) -> Result<Metric>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Metric>>;

    async fn list(&self, filter: &MetricFilter) -> Result<Vec<Metric>>;

    /// Locate an existing aggregate by name and an exact two-way dimension
    /// match; most recent timestamp wins. Used by the rollup path.
    async fn find_aggregate(&self, name: &str, dimensions: &Dimensions) -> Result<Option<Metric>>;

    /// Replace a previously saved metric by id.
    async fn update(&self, metric: Metric) -> Result<Metric>;
}

/// In-memory reference implementation backed by an RwLock'd vector.
///
/// Concurrent-writer safety here is an implementation detail of this
/// store, not a coordination promise to callers.
#[derive(Debug, Default)]
pub struct MemoryMetricStore {
    rows: Arc<RwLock<Vec<Metric>>>,
}

impl MemoryMetricStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetricStore for MemoryMetricStore {
    async fn save(&self, mut metric: Metric) -> Result<Metric> {
        metric.id = Some(Uuid::new_v4());
        let mut rows = self.rows.write().await;
        rows.push(metric.clone());
        Ok(metric)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Metric>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|m| m.id == Some(id)).cloned())
    }

    async fn list(&self, filter: &MetricFilter) -> Result<Vec<Metric>> {
        let rows = self.rows.read().await;
        let mut matched: Vec<Metric> = rows.iter().filter(|m| filter.matches(m)).cloned().collect();

        match filter.order {
            SortOrder::Ascending => matched.sort_by_key(|m| m.timestamp),
            SortOrder::Descending => {
                matched.sort_by_key(|m| std::cmp::Reverse(m.timestamp))
            }
        }
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn find_aggregate(&self, name: &str, dimensions: &Dimensions) -> Result<Option<Metric>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|m| m.name == name && m.dimensions.matches_exactly(dimensions))
            .max_by_key(|m| m.timestamp)
            .cloned())
    }

    async fn update(&self, metric: Metric) -> Result<Metric> {
        let id = metric
            .id
            .ok_or_else(|| DevPulseError::Validation("cannot update a metric without an id".into()))?;

        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|m| m.id == Some(id)) {
            Some(existing) => {
                *existing = metric.clone();
                Ok(metric)
            }
            None => Err(DevPulseError::not_found("metric", id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn metric_at(name: &str, value: f64, ts_secs: i64) -> Metric {
        Metric::new(
            name,
            value,
            "github",
            Dimensions::new().set("repository", "acme/api"),
            Utc.timestamp_opt(ts_secs, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn save_assigns_an_id() {
        let store = MemoryMetricStore::new();
        let saved = store.save(metric_at("m", 1.0, 100)).await.unwrap();
        assert!(saved.id.is_some());

        let found = store.find_by_id(saved.id.unwrap()).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn list_orders_and_limits() {
        let store = MemoryMetricStore::new();
        for ts in [300, 100, 200] {
            store.save(metric_at("m", 1.0, ts)).await.unwrap();
        }

        let ascending = store.list(&MetricFilter::new().name("m")).await.unwrap();
        let stamps: Vec<i64> = ascending.iter().map(|m| m.timestamp.timestamp()).collect();
        assert_eq!(stamps, vec![100, 200, 300]);

        let latest = store
            .list(&MetricFilter::new().name("m").descending().limit(1))
            .await
            .unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].timestamp.timestamp(), 300);
    }

    #[tokio::test]
    async fn no_match_returns_empty_not_error() {
        let store = MemoryMetricStore::new();
        let rows = store.list(&MetricFilter::new().name("absent")).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn find_aggregate_needs_exact_dimensions_and_takes_latest() {
        let store = MemoryMetricStore::new();
        let dims = Dimensions::new().set("repository", "acme/api");

        store.save(metric_at("dora.deployment_frequency.hourly", 3.0, 100)).await.unwrap();
        store.save(metric_at("dora.deployment_frequency.hourly", 5.0, 200)).await.unwrap();

        let found = store
            .find_aggregate("dora.deployment_frequency.hourly", &dims)
            .await
            .unwrap()
            .expect("aggregate row");
        assert_eq!(found.value, 5.0);

        let wider = dims.clone().set("environment", "prod");
        let missing = store
            .find_aggregate("dora.deployment_frequency.hourly", &wider)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn update_replaces_by_id_and_rejects_unsaved() {
        let store = MemoryMetricStore::new();
        let mut saved = store.save(metric_at("m", 1.0, 100)).await.unwrap();
        saved.value = 9.0;
        let updated = store.update(saved.clone()).await.unwrap();
        assert_eq!(updated.value, 9.0);

        let unsaved = metric_at("m", 1.0, 100);
        assert!(matches!(
            store.update(unsaved).await,
            Err(DevPulseError::Validation(_))
        ));
    }
}
