use crate::aggregate;
use crate::dora::DateRange;
use crate::model::Metric;
use crate::store::{MetricFilter, MetricStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// A job needs at least this many runs before flakiness is judged.
const FLAKY_MIN_OBSERVATIONS: usize = 4;
/// Fraction of consecutive-run conclusion flips that marks a job flaky.
const FLAKY_TRANSITION_RATE: f64 = 0.25;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStats {
    pub workflow_name: String,
    pub runs: u64,
    pub successes: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlakyJob {
    pub workflow_name: String,
    pub job_name: String,
    pub observations: u64,
    pub transitions: u64,
    /// Transitions over `observations - 1`, as a fraction.
    pub transition_rate: f64,
}

/// Workflow success rates, duration statistics and flaky-job detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPerformanceReport {
    pub total_runs: u64,
    pub success_rate: f64,
    pub average_duration_secs: f64,
    pub p95_duration_secs: f64,
    pub workflows: Vec<WorkflowStats>,
    pub flaky: Vec<FlakyJob>,
}

fn success_rate(successes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    successes as f64 / total as f64 * 100.0
}

/// Consecutive-run conclusion flips (success <-> failure) for one job's
/// time-ordered history.
fn transition_count(conclusions: &[&str]) -> u64 {
    conclusions
        .windows(2)
        .filter(|pair| pair[0] != pair[1])
        .count() as u64
}

pub async fn calculate(
    store: &dyn MetricStore,
    window: &DateRange,
    repository: Option<&str>,
) -> BuildPerformanceReport {
    let scoped = |name: &str| {
        let mut filter = MetricFilter::new()
            .name(name)
            .since(window.start)
            .until(window.end);
        if let Some(repo) = repository {
            filter = filter.dimensions(crate::model::Dimensions::new().set("repository", repo));
        }
        filter
    };

    let runs: Vec<Metric> = match store.list(&scoped("github.workflow_job.completed")).await {
        Ok(rows) => rows,
        Err(err) => {
            warn!(error = %err, "Build run query failed; treating as empty");
            Vec::new()
        }
    };
    let durations: Vec<Metric> = match store.list(&scoped("github.workflow_job.duration")).await {
        Ok(rows) => rows,
        Err(err) => {
            warn!(error = %err, "Build duration query failed; treating as empty");
            Vec::new()
        }
    };

    let total_runs = runs.len() as u64;
    let successes = runs
        .iter()
        .filter(|m| m.dimensions.get_str("conclusion") == Some("success"))
        .count() as u64;

    // Per-workflow stats.
    let mut per_workflow: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for run in &runs {
        let workflow = run
            .dimensions
            .get_str("workflow_name")
            .unwrap_or("(unknown)")
            .to_string();
        let entry = per_workflow.entry(workflow).or_insert((0, 0));
        entry.0 += 1;
        if run.dimensions.get_str("conclusion") == Some("success") {
            entry.1 += 1;
        }
    }
    let workflows: Vec<WorkflowStats> = per_workflow
        .into_iter()
        .map(|(workflow_name, (runs, successes))| WorkflowStats {
            workflow_name,
            runs,
            successes,
            success_rate: success_rate(successes, runs),
        })
        .collect();

    // Flaky detection over each (workflow, job) pair's run history,
    // already time-ascending from the store's default ordering.
    let mut histories: BTreeMap<(String, String), Vec<&str>> = BTreeMap::new();
    for run in &runs {
        let Some(conclusion) = run.dimensions.get_str("conclusion") else {
            continue;
        };
        let workflow = run.dimensions.get_str("workflow_name").unwrap_or("(unknown)");
        let job = run.dimensions.get_str("job_name").unwrap_or("(unknown)");
        histories
            .entry((workflow.to_string(), job.to_string()))
            .or_default()
            .push(conclusion);
    }
    let mut flaky = Vec::new();
    for ((workflow_name, job_name), conclusions) in histories {
        if conclusions.len() < FLAKY_MIN_OBSERVATIONS {
            continue;
        }
        let transitions = transition_count(&conclusions);
        let transition_rate = transitions as f64 / (conclusions.len() - 1) as f64;
        if transition_rate >= FLAKY_TRANSITION_RATE {
            flaky.push(FlakyJob {
                workflow_name,
                job_name,
                observations: conclusions.len() as u64,
                transitions,
                transition_rate,
            });
        }
    }

    let duration_values: Vec<f64> = durations.iter().map(|m| m.value).collect();

    BuildPerformanceReport {
        total_runs,
        success_rate: success_rate(successes, total_runs),
        average_duration_secs: aggregate::average(&duration_values),
        p95_duration_secs: aggregate::percentile(&duration_values, 95.0),
        workflows,
        flaky,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimensions;
    use crate::store::MemoryMetricStore;
    use chrono::{Duration, Utc};

    fn run_metric(conclusion: &str, minutes_ago: i64) -> Metric {
        Metric::new(
            "github.workflow_job.completed",
            1.0,
            "github",
            Dimensions::new()
                .set("workflow_name", "ci")
                .set("job_name", "test")
                .set("conclusion", conclusion),
            Utc::now() - Duration::minutes(minutes_ago),
        )
    }

    #[test]
    fn transitions_count_only_flips() {
        assert_eq!(transition_count(&["success", "success", "success"]), 0);
        assert_eq!(transition_count(&["success", "failure", "success"]), 2);
        assert_eq!(transition_count(&["success"]), 0);
    }

    #[tokio::test]
    async fn alternating_conclusions_flag_a_flaky_job() {
        let store = MemoryMetricStore::new();
        for (i, conclusion) in ["success", "failure", "success", "failure"].iter().enumerate() {
            store.save(run_metric(conclusion, 60 - i as i64)).await.unwrap();
        }

        let report = calculate(&store, &DateRange::last_days(1), None).await;
        assert_eq!(report.total_runs, 4);
        assert_eq!(report.success_rate, 50.0);
        assert_eq!(report.flaky.len(), 1);
        assert_eq!(report.flaky[0].transitions, 3);
        assert_eq!(report.flaky[0].transition_rate, 1.0);
    }

    #[tokio::test]
    async fn stable_jobs_and_thin_histories_are_not_flaky() {
        let store = MemoryMetricStore::new();
        // Three runs: below the observation floor even though they flip.
        for (i, conclusion) in ["success", "failure", "success"].iter().enumerate() {
            store.save(run_metric(conclusion, 30 - i as i64)).await.unwrap();
        }
        let report = calculate(&store, &DateRange::last_days(1), None).await;
        assert!(report.flaky.is_empty());

        // Five consistent successes: plenty of data, zero transitions.
        let store = MemoryMetricStore::new();
        for i in 0..5 {
            store.save(run_metric("success", 50 - i)).await.unwrap();
        }
        let report = calculate(&store, &DateRange::last_days(1), None).await;
        assert!(report.flaky.is_empty());
        assert_eq!(report.success_rate, 100.0);
    }

    #[tokio::test]
    async fn empty_window_is_structurally_complete() {
        let store = MemoryMetricStore::new();
        let report = calculate(&store, &DateRange::last_days(7), None).await;

        assert_eq!(report.total_runs, 0);
        assert_eq!(report.success_rate, 0.0);
        assert_eq!(report.average_duration_secs, 0.0);
        assert_eq!(report.p95_duration_secs, 0.0);
        assert!(report.workflows.is_empty());
        assert!(report.flaky.is_empty());
    }
}
