use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Firing,
    Resolved,
}

/// A derived notification record produced when a metric crosses a
/// configured threshold. Delivery happens through `NotificationPort`;
/// the core only constructs these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub name: String,
    pub severity: AlertSeverity,
    pub metric_name: String,
    pub threshold: f64,
    /// Observed value that triggered (or cleared) the alert.
    pub value: f64,
    pub status: AlertStatus,
    pub timestamp: DateTime<Utc>,
}
