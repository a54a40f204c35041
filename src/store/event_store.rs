use crate::errors::Result;
use crate::model::Event;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Persistence contract for incoming events. Events are written once by
/// the ingestion layer and read many times by the calculation service.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist an event, stamping id and (when absent) timestamp.
    async fn save(&self, event: Event) -> Result<Event>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>>;
}

#[derive(Debug, Default)]
pub struct MemoryEventStore {
    rows: Arc<RwLock<Vec<Event>>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn save(&self, mut event: Event) -> Result<Event> {
        event.id = Some(Uuid::new_v4());
        if event.timestamp.is_none() {
            event.timestamp = Some(Utc::now());
        }
        let mut rows = self.rows.write().await;
        rows.push(event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|e| e.id == Some(id)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn save_stamps_id_and_timestamp() {
        let store = MemoryEventStore::new();
        let event = Event::new("github.push", "github", json!({})).unwrap();
        assert!(event.timestamp.is_none());

        let saved = store.save(event).await.unwrap();
        assert!(saved.id.is_some());
        assert!(saved.timestamp.is_some());
    }

    #[tokio::test]
    async fn find_by_id_misses_cleanly() {
        let store = MemoryEventStore::new();
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
