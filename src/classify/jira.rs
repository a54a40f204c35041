use crate::model::{Dimensions, MetricDefinition};
use chrono::DateTime;
use serde_json::Value;

fn issue_dims(data: &Value) -> Dimensions {
    let mut dims = Dimensions::new();
    let fields = data.get("issue").and_then(|i| i.get("fields"));

    if let Some(project) = fields
        .and_then(|f| f.get("project"))
        .and_then(|p| p.get("key"))
        .and_then(|v| v.as_str())
    {
        dims.insert("project", project);
    }
    if let Some(issue_type) = fields
        .and_then(|f| f.get("issuetype"))
        .and_then(|t| t.get("name"))
        .and_then(|v| v.as_str())
    {
        dims.insert("issue_type", issue_type.to_lowercase());
    }
    if let Some(priority) = fields
        .and_then(|f| f.get("priority"))
        .and_then(|p| p.get("name"))
        .and_then(|v| v.as_str())
    {
        dims.insert("priority", priority.to_lowercase());
    }
    dims
}

fn field_timestamp(data: &Value, field: &str) -> Option<i64> {
    let raw = data
        .get("issue")?
        .get("fields")?
        .get(field)?
        .as_str()?;
    DateTime::parse_from_rfc3339(raw).ok().map(|t| t.timestamp())
}

/// Jira issue lifecycle: created/resolved counters, plus a resolution-time
/// observation when both `created` and `resolutiondate` are present.
pub fn classify_issue(event_name: &str, data: &Value) -> Vec<MetricDefinition> {
    let dims = issue_dims(data);
    let mut metrics = Vec::new();

    match event_name {
        "jira.issue.created" | "jira:issue_created" => {
            metrics.push(MetricDefinition::new("jira.issue.created", 1.0, dims));
        }
        "jira.issue.resolved" | "jira:issue_resolved" => {
            metrics.push(MetricDefinition::new(
                "jira.issue.resolved",
                1.0,
                dims.clone(),
            ));
            let created = field_timestamp(data, "created");
            let resolved = field_timestamp(data, "resolutiondate");
            if let (Some(created), Some(resolved)) = (created, resolved) {
                if resolved >= created {
                    metrics.push(MetricDefinition::new(
                        "jira.issue.resolution_time",
                        (resolved - created) as f64,
                        dims,
                    ));
                }
            }
        }
        _ => {}
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved_payload() -> Value {
        json!({
            "issue": {
                "fields": {
                    "project": {"key": "OPS"},
                    "issuetype": {"name": "Incident"},
                    "priority": {"name": "Critical"},
                    "created": "2026-03-01T08:00:00+00:00",
                    "resolutiondate": "2026-03-01T09:30:00+00:00"
                }
            }
        })
    }

    #[test]
    fn resolved_issue_emits_counter_and_resolution_time() {
        let metrics = classify_issue("jira.issue.resolved", &resolved_payload());

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "jira.issue.resolved");
        assert_eq!(metrics[0].dimensions.get_str("project"), Some("OPS"));
        assert_eq!(metrics[0].dimensions.get_str("issue_type"), Some("incident"));
        assert_eq!(metrics[1].name, "jira.issue.resolution_time");
        assert_eq!(metrics[1].value, 5400.0);
    }

    #[test]
    fn created_issue_is_a_plain_counter() {
        let metrics = classify_issue("jira.issue.created", &json!({"issue": {"fields": {}}}));
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "jira.issue.created");
    }

    #[test]
    fn missing_resolution_date_drops_the_facet() {
        let metrics = classify_issue(
            "jira.issue.resolved",
            &json!({"issue": {"fields": {"created": "2026-03-01T08:00:00+00:00"}}}),
        );
        assert_eq!(metrics.len(), 1);
    }
}
