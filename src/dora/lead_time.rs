use super::{first_non_empty, DateRange, FallbackTier};
use crate::aggregate;
use crate::model::{Dimensions, Rating};
use crate::store::MetricStore;
use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Stage-duration dimensions recognized by the process breakdown.
const STAGE_DIMENSIONS: [&str; 5] = [
    "code_review_hours",
    "ci_hours",
    "qa_hours",
    "approval_hours",
    "deployment_hours",
];

fn chain() -> Vec<FallbackTier> {
    vec![
        FallbackTier::exact("dora.lead_time"),
        FallbackTier::exact("dora.lead_time.hourly"),
        FallbackTier::exact("github.pull_request.lead_time"),
        FallbackTier::contains("lead_time"),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct LeadTimeOptions {
    /// Optional order statistic alongside the mean (canonically 50/75/95).
    pub percentile: Option<f64>,
    /// Compute the per-stage breakdown when stage dimensions are present.
    pub breakdown: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PercentileValue {
    pub percentile: f64,
    pub hours: f64,
}

/// Mean hours spent per delivery stage, over the metrics that carry the
/// corresponding duration dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadTimeBreakdown {
    pub code_review_hours: f64,
    pub ci_hours: f64,
    pub qa_hours: f64,
    pub approval_hours: f64,
    pub deployment_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadTimeReport {
    pub average_hours: f64,
    pub rating: Rating,
    pub samples: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile: Option<PercentileValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<LeadTimeBreakdown>,
}

pub fn rating_of(hours: f64) -> Rating {
    if hours < 24.0 {
        Rating::Elite
    } else if hours < 168.0 {
        Rating::High
    } else if hours < 730.0 {
        Rating::Medium
    } else {
        Rating::Low
    }
}

/// Average lead-time observations (stored in seconds) over the window,
/// expressed in hours. No data yields value 0 and rating `Unknown`.
pub async fn calculate(
    store: &dyn MetricStore,
    window: &DateRange,
    scope: Option<&Dimensions>,
    options: &LeadTimeOptions,
) -> LeadTimeReport {
    let (rows, _) = first_non_empty(store, window, scope, &chain()).await;

    if rows.is_empty() {
        return LeadTimeReport {
            average_hours: 0.0,
            rating: Rating::Unknown,
            samples: 0,
            percentile: None,
            breakdown: None,
        };
    }

    let hours: Vec<f64> = rows
        .iter()
        .map(|m| m.value / SECONDS_PER_HOUR)
        .collect();
    let average_hours = aggregate::average(&hours);

    let percentile = options.percentile.map(|p| PercentileValue {
        percentile: p,
        hours: aggregate::percentile(&hours, p),
    });

    let breakdown = if options.breakdown {
        stage_breakdown(&rows)
    } else {
        None
    };

    LeadTimeReport {
        average_hours,
        rating: rating_of(average_hours),
        samples: rows.len() as u64,
        percentile,
        breakdown,
    }
}

fn stage_breakdown(rows: &[crate::model::Metric]) -> Option<LeadTimeBreakdown> {
    let mut means = [0.0f64; 5];
    let mut any = false;
    for (i, stage) in STAGE_DIMENSIONS.iter().enumerate() {
        let values: Vec<f64> = rows
            .iter()
            .filter_map(|m| m.dimensions.get_num(stage))
            .collect();
        if !values.is_empty() {
            any = true;
            means[i] = aggregate::average(&values);
        }
    }
    if !any {
        return None;
    }
    Some(LeadTimeBreakdown {
        code_review_hours: means[0],
        ci_hours: means[1],
        qa_hours: means[2],
        approval_hours: means[3],
        deployment_hours: means[4],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bands() {
        assert_eq!(rating_of(0.0), Rating::Elite);
        assert_eq!(rating_of(23.9), Rating::Elite);
        assert_eq!(rating_of(24.0), Rating::High);
        assert_eq!(rating_of(167.9), Rating::High);
        assert_eq!(rating_of(168.0), Rating::Medium);
        assert_eq!(rating_of(729.9), Rating::Medium);
        assert_eq!(rating_of(730.0), Rating::Low);
    }
}
