// Domain records shared across the classification and aggregation pipeline

pub mod alert;
pub mod dimensions;
pub mod event;
pub mod metric;
pub mod org;
pub mod rating;

pub use alert::{Alert, AlertSeverity, AlertStatus};
pub use dimensions::{DimensionValue, Dimensions};
pub use event::Event;
pub use metric::{Metric, MetricDefinition};
pub use org::{CodeRepository, Team};
pub use rating::Rating;
