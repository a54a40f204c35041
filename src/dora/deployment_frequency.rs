use super::{first_non_empty, DateRange, FallbackTier};
use crate::model::{Dimensions, Rating};
use crate::store::MetricStore;
use serde::{Deserialize, Serialize};

/// Rollups first, then raw provider metrics, then a generic name sweep.
fn chain() -> Vec<FallbackTier> {
    vec![
        FallbackTier::exact("dora.deployment_frequency"),
        FallbackTier::exact("dora.deployment_frequency.hourly"),
        FallbackTier::exact("dora.deployment_frequency.5min"),
        FallbackTier::exact("github.ci.deploy.completed"),
        FallbackTier::exact("github.deployment_status.success"),
        FallbackTier::contains("deploy"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentFrequencyReport {
    pub deployments: u64,
    /// Deployments per day across the window.
    pub per_day: f64,
    pub rating: Rating,
    /// Which fallback tier supplied the data; `None` when nothing matched.
    pub source_metric: Option<String>,
}

/// Published DORA bands, using the benchmark decimal cutoffs
/// (0.14 ~ weekly, 0.03 ~ monthly).
pub fn rating_of(per_day: f64) -> Rating {
    if per_day >= 1.0 {
        Rating::Elite
    } else if per_day >= 0.14 {
        Rating::High
    } else if per_day >= 0.03 {
        Rating::Medium
    } else {
        Rating::Low
    }
}

/// Count deployment observations in the window and rate the daily
/// frequency. Silence counts as evidence: no deployment data yields rate
/// zero and rating `Low`, not `Unknown` — unlike the other three
/// calculators.
pub async fn calculate(
    store: &dyn MetricStore,
    window: &DateRange,
    scope: Option<&Dimensions>,
) -> DeploymentFrequencyReport {
    let (rows, source_metric) = first_non_empty(store, window, scope, &chain()).await;

    // Rolled-up rows carry counts in their values; raw rows are one
    // observation each with value 1, so summing covers both.
    let deployments: f64 = rows.iter().map(|m| m.value).sum();
    let per_day = deployments / window.days();

    DeploymentFrequencyReport {
        deployments: deployments as u64,
        per_day,
        rating: rating_of(per_day),
        source_metric,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_boundaries_are_exact() {
        assert_eq!(rating_of(1.0), Rating::Elite);
        assert_eq!(rating_of(0.14), Rating::High);
        assert_eq!(rating_of(0.03), Rating::Medium);
        assert_eq!(rating_of(0.02), Rating::Low);
        assert_eq!(rating_of(0.0), Rating::Low);
    }

    #[test]
    fn rating_is_monotone_in_rate() {
        let rates = [0.0, 0.02, 0.03, 0.13, 0.14, 0.9, 1.0, 5.0];
        let mut last = 0;
        for rate in rates {
            let score = rating_of(rate).score();
            assert!(score >= last, "rating regressed at rate {rate}");
            last = score;
        }
    }
}
