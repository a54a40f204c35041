#![cfg(feature = "database")]

use super::event_store::EventStore;
use super::filter::{MetricFilter, SortOrder};
use super::metric_store::MetricStore;
use crate::errors::{DevPulseError, Result};
use crate::model::{Dimensions, Event, Metric};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{migrate::MigrateDatabase, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

/// SQLite-backed stores for durable deployments.
///
/// Dimensions and event payloads are stored as JSON columns; dimension
/// subset matching is applied in Rust after a coarse SQL scan, which keeps
/// the schema flat while preserving the `MetricFilter` contract.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect, creating the database file and tables if missing.
    pub async fn connect(database_url: &str) -> Result<Self> {
        if !sqlx::Sqlite::database_exists(database_url)
            .await
            .map_err(DevPulseError::from)?
        {
            info!(db.url = database_url, "Creating metrics database");
            sqlx::Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metrics (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                value REAL NOT NULL,
                source TEXT NOT NULL,
                dimensions TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                source TEXT NOT NULL,
                data TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_metrics_name_ts ON metrics (name, timestamp)")
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_metric(row: &sqlx::sqlite::SqliteRow) -> Result<Metric> {
        let id: String = row.get("id");
        let dimensions: String = row.get("dimensions");
        let timestamp: i64 = row.get("timestamp");

        Ok(Metric {
            id: Some(
                Uuid::parse_str(&id)
                    .map_err(|e| DevPulseError::Storage(format!("bad metric id: {e}")))?,
            ),
            name: row.get("name"),
            value: row.get("value"),
            source: row.get("source"),
            dimensions: serde_json::from_str(&dimensions)?,
            timestamp: ts_from_secs(timestamp)?,
        })
    }
}

fn ts_from_secs(secs: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| DevPulseError::Storage(format!("bad timestamp: {secs}")))
}

#[async_trait]
impl MetricStore for SqliteStore {
    async fn save(&self, mut metric: Metric) -> Result<Metric> {
        let id = Uuid::new_v4();
        metric.id = Some(id);
        sqlx::query(
            r#"
            INSERT INTO metrics (id, name, value, source, dimensions, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(id.to_string())
        .bind(&metric.name)
        .bind(metric.value)
        .bind(&metric.source)
        .bind(serde_json::to_string(&metric.dimensions)?)
        .bind(metric.timestamp.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(metric)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Metric>> {
        let row = sqlx::query("SELECT * FROM metrics WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_metric).transpose()
    }

    async fn list(&self, filter: &MetricFilter) -> Result<Vec<Metric>> {
        // Coarse SQL pass on the indexed columns; dimension containment and
        // the limit are applied after decoding.
        let mut sql = String::from("SELECT * FROM metrics WHERE 1=1");
        if filter.name.is_some() {
            sql.push_str(" AND name = ?1");
        }
        let order = match filter.order {
            SortOrder::Ascending => " ORDER BY timestamp ASC",
            SortOrder::Descending => " ORDER BY timestamp DESC",
        };
        sql.push_str(order);

        let mut query = sqlx::query(&sql);
        if let Some(name) = &filter.name {
            query = query.bind(name.clone());
        }

        let rows = query.fetch_all(&self.pool).await?;
        let mut matched = Vec::new();
        for row in &rows {
            let metric = Self::row_to_metric(row)?;
            if filter.matches(&metric) {
                matched.push(metric);
            }
        }
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn find_aggregate(&self, name: &str, dimensions: &Dimensions) -> Result<Option<Metric>> {
        let rows = sqlx::query("SELECT * FROM metrics WHERE name = ?1 ORDER BY timestamp DESC")
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

        for row in &rows {
            let metric = Self::row_to_metric(row)?;
            if metric.dimensions.matches_exactly(dimensions) {
                return Ok(Some(metric));
            }
        }
        Ok(None)
    }

    async fn update(&self, metric: Metric) -> Result<Metric> {
        let id = metric
            .id
            .ok_or_else(|| DevPulseError::Validation("cannot update a metric without an id".into()))?;

        let result = sqlx::query(
            r#"
            UPDATE metrics SET name = ?2, value = ?3, source = ?4, dimensions = ?5, timestamp = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .bind(&metric.name)
        .bind(metric.value)
        .bind(&metric.source)
        .bind(serde_json::to_string(&metric.dimensions)?)
        .bind(metric.timestamp.timestamp())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DevPulseError::not_found("metric", id.to_string()));
        }
        Ok(metric)
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn save(&self, mut event: Event) -> Result<Event> {
        let id = Uuid::new_v4();
        event.id = Some(id);
        let timestamp = event.timestamp.unwrap_or_else(Utc::now);
        event.timestamp = Some(timestamp);

        sqlx::query(
            r#"
            INSERT INTO events (id, name, source, data, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(id.to_string())
        .bind(&event.name)
        .bind(&event.source)
        .bind(serde_json::to_string(&event.data)?)
        .bind(timestamp.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(event)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query("SELECT * FROM events WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw_id: String = row.get("id");
        let data: String = row.get("data");
        let timestamp: i64 = row.get("timestamp");

        Ok(Some(Event {
            id: Some(
                Uuid::parse_str(&raw_id)
                    .map_err(|e| DevPulseError::Storage(format!("bad event id: {e}")))?,
            ),
            name: row.get("name"),
            source: row.get("source"),
            data: serde_json::from_str(&data)?,
            timestamp: Some(ts_from_secs(timestamp)?),
        }))
    }
}
