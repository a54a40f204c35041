// DevPulse Library - Engineering Activity Metrics and DORA Analytics
// This exposes the core components for testing and integration

pub mod aggregate;
pub mod alerts;
pub mod analytics;
pub mod cache;
pub mod calculate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod dora;
pub mod errors;
pub mod model;
pub mod registrar;
pub mod rollup;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use alerts::{AlertEvaluator, AlertRule, NotificationPort, TracingNotifier};
pub use analytics::AnalyticsService;
pub use cache::{Cache, MemoryCache};
pub use calculate::{CalculationOutcome, MetricCalculationService};
pub use classify::{ClassifierOptions, EventKind, MetricClassifier, UnparseableCommitMode};
pub use config::DevPulseConfig;
pub use dora::{DateRange, DoraDashboard, DoraEngine};
pub use errors::{DevPulseError, Result};
pub use model::{Alert, CodeRepository, Dimensions, Event, Metric, MetricDefinition, Rating, Team};
pub use registrar::{MemoryRegistrar, RepositoryRegistrar};
pub use rollup::MetricRollupService;
pub use store::{EventStore, MemoryEventStore, MemoryMetricStore, MetricFilter, MetricStore};
pub use telemetry::{generate_correlation_id, init_telemetry};
