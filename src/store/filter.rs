use crate::model::Dimensions;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Builder-style query filter over stored metrics.
///
/// All criteria are conjunctive. Name criteria are exclusive in practice
/// (a query sets at most one of exact/prefix/contains); if several are set
/// they all apply. Time bounds are inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct MetricFilter {
    pub name: Option<String>,
    pub name_prefix: Option<String>,
    /// Substring match, the last tier of the DORA fallback chains.
    pub name_contains: Option<String>,
    pub source: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// Subset containment: a metric matches when it carries every
    /// key-value pair listed here.
    pub dimensions: Option<Dimensions>,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl MetricFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.name_contains = Some(fragment.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn descending(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a metric satisfies every criterion except ordering/limit.
    pub fn matches(&self, metric: &crate::model::Metric) -> bool {
        if let Some(name) = &self.name {
            if metric.name != *name {
                return false;
            }
        }
        if let Some(prefix) = &self.name_prefix {
            if !metric.name.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(fragment) = &self.name_contains {
            if !metric.name.contains(fragment.as_str()) {
                return false;
            }
        }
        if let Some(source) = &self.source {
            if metric.source != *source {
                return false;
            }
        }
        if let Some(since) = self.since {
            if metric.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if metric.timestamp > until {
                return false;
            }
        }
        if let Some(dims) = &self.dimensions {
            if !metric.dimensions.contains(dims) {
                return false;
            }
        }
        true
    }
}
