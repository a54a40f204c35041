use super::{first_non_empty, DateRange, FallbackTier};
use crate::model::{Dimensions, Rating};
use crate::store::MetricStore;
use serde::{Deserialize, Serialize};

fn failed_chain() -> Vec<FallbackTier> {
    vec![
        FallbackTier::exact("dora.deployments.failed"),
        FallbackTier::exact("github.ci.deploy.failed"),
        FallbackTier::exact("github.deployment_status.failure"),
    ]
}

fn success_chain() -> Vec<FallbackTier> {
    vec![
        FallbackTier::exact("dora.deployments.success"),
        FallbackTier::exact("github.ci.deploy.completed"),
        FallbackTier::exact("github.deployment_status.success"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeFailureRateReport {
    pub failed: u64,
    pub total: u64,
    /// Percentage of deployments that failed.
    pub rate: f64,
    pub rating: Rating,
}

pub fn rating_of(rate: f64) -> Rating {
    if rate <= 15.0 {
        Rating::Elite
    } else if rate <= 30.0 {
        Rating::High
    } else if rate <= 45.0 {
        Rating::Medium
    } else {
        Rating::Low
    }
}

/// Failed deployments over total deployments, as a percentage. Zero total
/// deployments yields rate 0 and rating `Unknown`.
pub async fn calculate(
    store: &dyn MetricStore,
    window: &DateRange,
    scope: Option<&Dimensions>,
) -> ChangeFailureRateReport {
    let (failed_rows, _) = first_non_empty(store, window, scope, &failed_chain()).await;
    let (success_rows, _) = first_non_empty(store, window, scope, &success_chain()).await;

    let failed: f64 = failed_rows.iter().map(|m| m.value).sum();
    let successes: f64 = success_rows.iter().map(|m| m.value).sum();
    let total = failed + successes;

    if total <= 0.0 {
        return ChangeFailureRateReport {
            failed: 0,
            total: 0,
            rate: 0.0,
            rating: Rating::Unknown,
        };
    }

    let rate = failed / total * 100.0;
    ChangeFailureRateReport {
        failed: failed as u64,
        total: total as u64,
        rate,
        rating: rating_of(rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bands_are_boundary_inclusive() {
        assert_eq!(rating_of(15.0), Rating::Elite);
        assert_eq!(rating_of(15.1), Rating::High);
        assert_eq!(rating_of(30.0), Rating::High);
        assert_eq!(rating_of(30.1), Rating::Medium);
        assert_eq!(rating_of(45.0), Rating::Medium);
        assert_eq!(rating_of(45.1), Rating::Low);
    }
}
