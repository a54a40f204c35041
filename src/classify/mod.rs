// Event -> metric classification rules, one module per source family

pub mod conventional;
mod github;
mod jira;
mod push;

use crate::model::{Event, MetricDefinition};
use serde::{Deserialize, Serialize};

/// What to do with commit messages that do not parse as Conventional
/// Commits: drop them, or bucket them under `commit_type = "other"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnparseableCommitMode {
    Skip,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierOptions {
    /// Path segments kept when grouping touched files into directory
    /// hotspots (1 = top-level directory).
    pub hotspot_depth: usize,
    pub unparseable_commits: UnparseableCommitMode,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            hotspot_depth: 1,
            unparseable_commits: UnparseableCommitMode::Skip,
        }
    }
}

/// Known event shapes. Adding a source means adding a variant here and the
/// compiler pointing at every match that needs a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    GithubPush,
    GithubIssue,
    GithubPullRequest,
    GithubWorkflowJob,
    GithubDeploymentStatus,
    GithubCiDeploy,
    JiraIssue,
    Unknown,
}

impl EventKind {
    /// Normalize the (source, name) pair into a closed variant. This is the
    /// single place event-name strings are inspected.
    pub fn of(event: &Event) -> Self {
        match (event.source.as_str(), event.name.as_str()) {
            ("github", "github.push") => EventKind::GithubPush,
            ("github", name) if name.starts_with("github.ci.deploy") => EventKind::GithubCiDeploy,
            ("github", name) if name.starts_with("github.issue") => EventKind::GithubIssue,
            ("github", name) if name.starts_with("github.pull_request") => {
                EventKind::GithubPullRequest
            }
            ("github", name) if name.starts_with("github.workflow_job") => {
                EventKind::GithubWorkflowJob
            }
            ("github", name) if name.starts_with("github.deployment_status") => {
                EventKind::GithubDeploymentStatus
            }
            ("jira", name) if name.starts_with("jira") => EventKind::JiraIssue,
            _ => EventKind::Unknown,
        }
    }
}

/// Pure event -> metric-definition mapping. Never fails: malformed or
/// missing sub-fields degrade to fewer metrics, and unknown events
/// classify to an empty vector.
#[derive(Debug, Clone, Default)]
pub struct MetricClassifier {
    options: ClassifierOptions,
}

impl MetricClassifier {
    pub fn new(options: ClassifierOptions) -> Self {
        Self { options }
    }

    pub fn classify(&self, event: &Event) -> Vec<MetricDefinition> {
        match EventKind::of(event) {
            EventKind::GithubPush => push::classify(&event.data, &self.options),
            EventKind::GithubIssue => github::classify_issue(&event.data),
            EventKind::GithubPullRequest => github::classify_pull_request(&event.data),
            EventKind::GithubWorkflowJob => github::classify_workflow_job(&event.data),
            EventKind::GithubDeploymentStatus => github::classify_deployment_status(&event.data),
            EventKind::GithubCiDeploy => github::classify_ci_deploy(&event.data),
            EventKind::JiraIssue => jira::classify_issue(&event.name, &event.data),
            EventKind::Unknown => Vec::new(),
        }
    }
}
