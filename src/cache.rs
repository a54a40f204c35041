// Advisory read-through/write-through cache for analytic reports

use crate::errors::Result;
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::Expiry;
use std::time::{Duration, Instant};

/// Best-effort cache collaborator. A failing read is a miss and a failing
/// write is a no-op; callers log and proceed as if no cache existed.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>>;
    async fn write(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}

/// Build a flat report cache key: colon-delimited report type, parameters
/// and window, with repository slashes flattened
/// (`build_performance:days_30:repo_acme_api`).
pub fn report_key(report: &str, parts: &[&str]) -> String {
    let mut key = String::from(report);
    for part in parts {
        key.push(':');
        key.push_str(&part.replace('/', "_"));
    }
    key
}

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process cache backed by moka with per-entry TTLs.
pub struct MemoryCache {
    inner: MokaCache<String, Entry>,
}

impl MemoryCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            inner: MokaCache::builder()
                .max_capacity(max_entries)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.get(key).await.map(|entry| entry.value))
    }

    async fn write(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.inner
            .insert(key.to_string(), Entry { value, ttl })
            .await;
        Ok(())
    }
}
