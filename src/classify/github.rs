use crate::model::{Dimensions, MetricDefinition};
use chrono::DateTime;
use serde_json::Value;

fn repo_dims(data: &Value) -> Dimensions {
    let mut dims = Dimensions::new();
    if let Some(repo) = data
        .get("repository")
        .and_then(|r| r.get("full_name"))
        .and_then(|v| v.as_str())
    {
        dims.insert("repository", repo);
    }
    dims
}

fn parse_rfc3339(data: &Value, path: &[&str]) -> Option<i64> {
    let mut current = data;
    for segment in path {
        current = current.get(segment)?;
    }
    let raw = current.as_str()?;
    DateTime::parse_from_rfc3339(raw).ok().map(|t| t.timestamp())
}

/// Issue opened/closed counters; closed issues with both creation and close
/// stamps additionally emit a resolution-time observation in seconds.
pub fn classify_issue(data: &Value) -> Vec<MetricDefinition> {
    let Some(action) = data.get("action").and_then(|v| v.as_str()) else {
        return Vec::new();
    };

    let mut dims = repo_dims(data);
    if let Some(author) = data
        .get("issue")
        .and_then(|i| i.get("user"))
        .and_then(|u| u.get("login"))
        .and_then(|v| v.as_str())
    {
        dims.insert("author", author);
    }
    if let Some(issue_type) = data
        .get("issue")
        .and_then(|i| i.get("type"))
        .and_then(|v| v.as_str())
    {
        dims.insert("issue_type", issue_type);
    }

    let mut metrics = Vec::new();
    match action {
        "opened" => {
            metrics.push(MetricDefinition::new("github.issue.opened", 1.0, dims));
        }
        "closed" => {
            metrics.push(MetricDefinition::new(
                "github.issue.closed",
                1.0,
                dims.clone(),
            ));
            let created = parse_rfc3339(data, &["issue", "created_at"]);
            let closed = parse_rfc3339(data, &["issue", "closed_at"]);
            if let (Some(created), Some(closed)) = (created, closed) {
                if closed >= created {
                    metrics.push(MetricDefinition::new(
                        "github.issue.resolution_time",
                        (closed - created) as f64,
                        dims,
                    ));
                }
            }
        }
        _ => {}
    }
    metrics
}

/// Completed workflow jobs: one counter carrying the conclusion plus a
/// duration observation when both timing fields parse.
pub fn classify_workflow_job(data: &Value) -> Vec<MetricDefinition> {
    let Some(job) = data.get("workflow_job") else {
        return Vec::new();
    };

    let mut dims = repo_dims(data);
    if let Some(workflow) = job.get("workflow_name").and_then(|v| v.as_str()) {
        dims.insert("workflow_name", workflow);
    }
    if let Some(name) = job.get("name").and_then(|v| v.as_str()) {
        dims.insert("job_name", name);
    }
    if let Some(conclusion) = job.get("conclusion").and_then(|v| v.as_str()) {
        dims.insert("conclusion", conclusion);
    }

    let mut metrics = vec![MetricDefinition::new(
        "github.workflow_job.completed",
        1.0,
        dims.clone(),
    )];

    let started = parse_rfc3339(data, &["workflow_job", "started_at"]);
    let completed = parse_rfc3339(data, &["workflow_job", "completed_at"]);
    if let (Some(started), Some(completed)) = (started, completed) {
        if completed >= started {
            metrics.push(MetricDefinition::new(
                "github.workflow_job.duration",
                (completed - started) as f64,
                dims,
            ));
        }
    }
    metrics
}

/// Deployment status transitions become `github.deployment_status.<state>`
/// counters (success/failure/pending and friends).
pub fn classify_deployment_status(data: &Value) -> Vec<MetricDefinition> {
    let Some(state) = data
        .get("deployment_status")
        .and_then(|s| s.get("state"))
        .and_then(|v| v.as_str())
    else {
        return Vec::new();
    };

    let mut dims = repo_dims(data);
    if let Some(environment) = data
        .get("deployment")
        .and_then(|d| d.get("environment"))
        .and_then(|v| v.as_str())
    {
        dims.insert("environment", environment);
    }

    vec![MetricDefinition::new(
        format!("github.deployment_status.{state}"),
        1.0,
        dims,
    )]
}

/// CI-driven deploy notifications: completed vs failed, by conclusion.
pub fn classify_ci_deploy(data: &Value) -> Vec<MetricDefinition> {
    let conclusion = data
        .get("conclusion")
        .and_then(|v| v.as_str())
        .unwrap_or("completed");

    let mut dims = repo_dims(data);
    dims.insert("conclusion", conclusion);
    if let Some(environment) = data.get("environment").and_then(|v| v.as_str()) {
        dims.insert("environment", environment);
    }

    let name = if conclusion == "failure" || conclusion == "failed" {
        "github.ci.deploy.failed"
    } else {
        "github.ci.deploy.completed"
    };
    vec![MetricDefinition::new(name, 1.0, dims)]
}

/// Merged pull requests emit a lead-time observation: seconds from PR
/// creation to merge. Non-merge actions classify to nothing.
pub fn classify_pull_request(data: &Value) -> Vec<MetricDefinition> {
    let action = data.get("action").and_then(|v| v.as_str());
    let merged = data
        .get("pull_request")
        .and_then(|pr| pr.get("merged"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if action != Some("closed") || !merged {
        return Vec::new();
    }

    let created = parse_rfc3339(data, &["pull_request", "created_at"]);
    let merged_at = parse_rfc3339(data, &["pull_request", "merged_at"]);
    let (Some(created), Some(merged_at)) = (created, merged_at) else {
        return Vec::new();
    };
    if merged_at < created {
        return Vec::new();
    }

    let mut dims = repo_dims(data);
    if let Some(author) = data
        .get("pull_request")
        .and_then(|pr| pr.get("user"))
        .and_then(|u| u.get("login"))
        .and_then(|v| v.as_str())
    {
        dims.insert("author", author);
    }

    vec![MetricDefinition::new(
        "github.pull_request.lead_time",
        (merged_at - created) as f64,
        dims,
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn closed_issue_emits_counter_and_resolution_time() {
        let metrics = classify_issue(&json!({
            "action": "closed",
            "repository": {"full_name": "acme/api"},
            "issue": {
                "user": {"login": "sam"},
                "created_at": "2026-03-01T10:00:00Z",
                "closed_at": "2026-03-01T12:00:00Z"
            }
        }));

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "github.issue.closed");
        assert_eq!(metrics[1].name, "github.issue.resolution_time");
        assert_eq!(metrics[1].value, 7200.0);
        assert_eq!(metrics[1].dimensions.get_str("author"), Some("sam"));
    }

    #[test]
    fn unparseable_issue_timestamps_drop_the_resolution_facet() {
        let metrics = classify_issue(&json!({
            "action": "closed",
            "issue": {"created_at": "not a date", "closed_at": "2026-03-01T12:00:00Z"}
        }));
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "github.issue.closed");
    }

    #[test]
    fn workflow_job_carries_conclusion_and_duration() {
        let metrics = classify_workflow_job(&json!({
            "repository": {"full_name": "acme/api"},
            "workflow_job": {
                "workflow_name": "ci",
                "name": "test",
                "conclusion": "success",
                "started_at": "2026-03-01T10:00:00Z",
                "completed_at": "2026-03-01T10:05:00Z"
            }
        }));

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].dimensions.get_str("conclusion"), Some("success"));
        assert_eq!(metrics[1].name, "github.workflow_job.duration");
        assert_eq!(metrics[1].value, 300.0);
    }

    #[test]
    fn deployment_status_name_follows_state() {
        let metrics = classify_deployment_status(&json!({
            "deployment_status": {"state": "success"},
            "deployment": {"environment": "production"},
            "repository": {"full_name": "acme/api"}
        }));

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "github.deployment_status.success");
        assert_eq!(metrics[0].dimensions.get_str("environment"), Some("production"));
    }

    #[test]
    fn ci_deploy_splits_on_conclusion() {
        let ok = classify_ci_deploy(&json!({"conclusion": "success"}));
        assert_eq!(ok[0].name, "github.ci.deploy.completed");

        let failed = classify_ci_deploy(&json!({"conclusion": "failure"}));
        assert_eq!(failed[0].name, "github.ci.deploy.failed");
    }

    #[test]
    fn merged_pull_request_emits_lead_time() {
        let metrics = classify_pull_request(&json!({
            "action": "closed",
            "repository": {"full_name": "acme/api"},
            "pull_request": {
                "merged": true,
                "user": {"login": "sam"},
                "created_at": "2026-03-01T00:00:00Z",
                "merged_at": "2026-03-02T00:00:00Z"
            }
        }));

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "github.pull_request.lead_time");
        assert_eq!(metrics[0].value, 86_400.0);
    }

    #[test]
    fn unmerged_close_classifies_to_nothing() {
        let metrics = classify_pull_request(&json!({
            "action": "closed",
            "pull_request": {"merged": false}
        }));
        assert!(metrics.is_empty());
    }
}
