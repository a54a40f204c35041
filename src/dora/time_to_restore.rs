use super::{first_non_empty, DateRange, FallbackTier};
use crate::aggregate;
use crate::model::{Dimensions, Rating};
use crate::store::MetricStore;
use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: f64 = 3600.0;

fn chain() -> Vec<FallbackTier> {
    vec![
        FallbackTier::exact("dora.time_to_restore"),
        FallbackTier::exact("dora.time_to_restore.hourly"),
        // Raw tier only counts incident-labeled issue closures; ordinary
        // issues must not masquerade as service restorations.
        FallbackTier::exact("github.issue.resolution_time")
            .with_dimensions(Dimensions::new().set("issue_type", "incident")),
        FallbackTier::contains("restore"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeToRestoreReport {
    pub average_hours: f64,
    pub rating: Rating,
    pub samples: u64,
}

pub fn rating_of(hours: f64) -> Rating {
    if hours <= 1.0 {
        Rating::Elite
    } else if hours <= 24.0 {
        Rating::High
    } else if hours <= 168.0 {
        Rating::Medium
    } else {
        Rating::Low
    }
}

/// Average incident-restoration observations (seconds) over the window,
/// in hours. No data yields rating `Unknown`.
pub async fn calculate(
    store: &dyn MetricStore,
    window: &DateRange,
    scope: Option<&Dimensions>,
) -> TimeToRestoreReport {
    let (rows, _) = first_non_empty(store, window, scope, &chain()).await;

    if rows.is_empty() {
        return TimeToRestoreReport {
            average_hours: 0.0,
            rating: Rating::Unknown,
            samples: 0,
        };
    }

    let hours: Vec<f64> = rows
        .iter()
        .map(|m| m.value / SECONDS_PER_HOUR)
        .collect();
    let average_hours = aggregate::average(&hours);

    TimeToRestoreReport {
        average_hours,
        rating: rating_of(average_hours),
        samples: rows.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bands_are_boundary_inclusive() {
        assert_eq!(rating_of(1.0), Rating::Elite);
        assert_eq!(rating_of(1.1), Rating::High);
        assert_eq!(rating_of(24.0), Rating::High);
        assert_eq!(rating_of(24.1), Rating::Medium);
        assert_eq!(rating_of(168.0), Rating::Medium);
        assert_eq!(rating_of(168.1), Rating::Low);
    }
}
