// Storage contracts and reference implementations

pub mod event_store;
pub mod filter;
pub mod metric_store;
#[cfg(feature = "database")]
pub mod sqlite;

pub use event_store::{EventStore, MemoryEventStore};
pub use filter::{MetricFilter, SortOrder};
pub use metric_store::{MemoryMetricStore, MetricStore};
#[cfg(feature = "database")]
pub use sqlite::SqliteStore;
