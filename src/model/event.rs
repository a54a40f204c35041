use crate::errors::{DevPulseError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable fact received from an external system (webhook payload,
/// already normalized by the ingestion layer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Assigned by the event store on save; `None` before persistence.
    pub id: Option<Uuid>,
    /// Dotted classification, e.g. `"github.push"`.
    pub name: String,
    /// Originating system, e.g. `"github"`.
    pub source: String,
    /// Arbitrarily nested payload. Always a JSON object, possibly empty.
    pub data: serde_json::Value,
    /// When the event occurred. Stamped at persistence if not supplied.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Event {
    pub fn new(name: impl Into<String>, source: impl Into<String>, data: serde_json::Value) -> Result<Self> {
        let name = name.into();
        let source = source.into();
        if name.trim().is_empty() {
            return Err(DevPulseError::Validation("event name must not be empty".into()));
        }
        if source.trim().is_empty() {
            return Err(DevPulseError::Validation("event source must not be empty".into()));
        }
        let data = if data.is_null() {
            serde_json::json!({})
        } else {
            data
        };
        Ok(Self {
            id: None,
            name,
            source,
            data,
            timestamp: None,
        })
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Walk a dot path into the payload, e.g. `"repository.full_name"`.
    pub fn data_path(&self, path: &str) -> Option<&serde_json::Value> {
        let mut current = &self.data;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current)
    }

    pub fn data_str(&self, path: &str) -> Option<&str> {
        self.data_path(path).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_empty_name_and_source() {
        assert!(Event::new("", "github", json!({})).is_err());
        assert!(Event::new("github.push", "  ", json!({})).is_err());
        assert!(Event::new("github.push", "github", json!({})).is_ok());
    }

    #[test]
    fn null_payload_becomes_empty_object() {
        let event = Event::new("github.push", "github", serde_json::Value::Null).unwrap();
        assert!(event.data.is_object());
    }

    #[test]
    fn data_path_walks_nested_objects() {
        let event = Event::new(
            "github.push",
            "github",
            json!({"repository": {"full_name": "acme/api"}}),
        )
        .unwrap();

        assert_eq!(event.data_str("repository.full_name"), Some("acme/api"));
        assert_eq!(event.data_str("repository.owner.login"), None);
    }
}
