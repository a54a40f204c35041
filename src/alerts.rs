// Threshold evaluation over windowed metric means

use crate::aggregate;
use crate::dora::DateRange;
use crate::errors::Result;
use crate::model::{Alert, AlertSeverity, AlertStatus};
use crate::store::{MetricFilter, MetricStore};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Outbound alert delivery boundary. Transport failures are the caller's
/// to swallow; evaluation must not depend on delivery succeeding.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn send_alert(&self, alert: &Alert) -> Result<()>;
}

/// Reference notifier that writes alerts to the structured log.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationPort for TracingNotifier {
    async fn send_alert(&self, alert: &Alert) -> Result<()> {
        info!(
            alert.name = alert.name.as_str(),
            alert.metric = alert.metric_name.as_str(),
            alert.value = alert.value,
            alert.threshold = alert.threshold,
            alert.severity = ?alert.severity,
            "Alert raised"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Above,
    Below,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub name: String,
    pub metric_name: String,
    pub comparison: Comparison,
    pub threshold: f64,
    pub severity: AlertSeverity,
}

/// Compares each rule's windowed metric mean against its threshold and
/// fires alerts through the notification port.
pub struct AlertEvaluator {
    store: Arc<dyn MetricStore>,
    notifier: Arc<dyn NotificationPort>,
}

impl AlertEvaluator {
    pub fn new(store: Arc<dyn MetricStore>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self { store, notifier }
    }

    /// Evaluate every rule; rules with no data never fire. Returns the
    /// alerts that fired. Storage failures skip the affected rule and
    /// delivery failures are logged, never raised.
    pub async fn evaluate(&self, rules: &[AlertRule], window: &DateRange) -> Vec<Alert> {
        let mut fired = Vec::new();
        for rule in rules {
            let filter = MetricFilter::new()
                .name(rule.metric_name.clone())
                .since(window.start)
                .until(window.end);
            let rows = match self.store.list(&filter).await {
                Ok(rows) => rows,
                Err(err) => {
                    warn!(rule = rule.name.as_str(), error = %err, "Alert query failed; rule skipped");
                    continue;
                }
            };
            if rows.is_empty() {
                continue;
            }

            let values: Vec<f64> = rows.iter().map(|m| m.value).collect();
            let observed = aggregate::average(&values);
            let breached = match rule.comparison {
                Comparison::Above => observed > rule.threshold,
                Comparison::Below => observed < rule.threshold,
            };
            if !breached {
                continue;
            }

            let alert = Alert {
                name: rule.name.clone(),
                severity: rule.severity,
                metric_name: rule.metric_name.clone(),
                threshold: rule.threshold,
                value: observed,
                status: AlertStatus::Firing,
                timestamp: Utc::now(),
            };
            if let Err(err) = self.notifier.send_alert(&alert).await {
                warn!(rule = rule.name.as_str(), error = %err, "Alert delivery failed");
            }
            fired.push(alert);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dimensions, Metric};
    use crate::store::MemoryMetricStore;
    use chrono::Duration;

    fn failure_rule() -> AlertRule {
        AlertRule {
            name: "high failure rate".into(),
            metric_name: "dora.change_failure_rate".into(),
            comparison: Comparison::Above,
            threshold: 30.0,
            severity: AlertSeverity::Critical,
        }
    }

    #[tokio::test]
    async fn breached_threshold_fires_one_alert() {
        let store = Arc::new(MemoryMetricStore::new());
        store
            .save(Metric::new(
                "dora.change_failure_rate",
                45.0,
                "dora",
                Dimensions::new(),
                Utc::now() - Duration::hours(1),
            ))
            .await
            .unwrap();

        let evaluator = AlertEvaluator::new(store, Arc::new(TracingNotifier));
        let fired = evaluator
            .evaluate(&[failure_rule()], &DateRange::last_days(1))
            .await;

        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].value, 45.0);
        assert_eq!(fired[0].status, AlertStatus::Firing);
    }

    #[tokio::test]
    async fn quiet_metrics_and_missing_data_stay_silent() {
        let store = Arc::new(MemoryMetricStore::new());
        store
            .save(Metric::new(
                "dora.change_failure_rate",
                10.0,
                "dora",
                Dimensions::new(),
                Utc::now() - Duration::hours(1),
            ))
            .await
            .unwrap();

        let evaluator = AlertEvaluator::new(store, Arc::new(TracingNotifier));
        let fired = evaluator
            .evaluate(&[failure_rule()], &DateRange::last_days(1))
            .await;
        assert!(fired.is_empty());

        // A rule over an absent metric never fires.
        let empty_store = Arc::new(MemoryMetricStore::new());
        let evaluator = AlertEvaluator::new(empty_store, Arc::new(TracingNotifier));
        let fired = evaluator
            .evaluate(&[failure_rule()], &DateRange::last_days(1))
            .await;
        assert!(fired.is_empty());
    }
}
