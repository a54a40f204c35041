use super::dimensions::Dimensions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single named, dimensioned, timestamped numeric observation.
///
/// Counts are stored as floats; `timestamp` is when the observation
/// occurred, not when it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub id: Option<Uuid>,
    /// Dotted name, conventionally `source.entity.action[.detail]`.
    pub name: String,
    pub value: f64,
    /// Producing system: the originating event's source, or `"dora"` for
    /// rolled-up aggregates.
    pub source: String,
    pub dimensions: Dimensions,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        source: impl Into<String>,
        dimensions: Dimensions,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            value,
            source: source.into(),
            dimensions,
            timestamp,
        }
    }
}

/// Unsaved classifier output: what to record, not yet stamped with the
/// event's source/timestamp or a storage id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    pub value: f64,
    pub dimensions: Dimensions,
}

impl MetricDefinition {
    pub fn new(name: impl Into<String>, value: f64, dimensions: Dimensions) -> Self {
        Self {
            name: name.into(),
            value,
            dimensions,
        }
    }

    /// Realize the definition into a persistable metric.
    pub fn into_metric(self, source: &str, timestamp: DateTime<Utc>) -> Metric {
        Metric::new(self.name, self.value, source, self.dimensions, timestamp)
    }
}
