use super::conventional;
use super::{ClassifierOptions, UnparseableCommitMode};
use crate::model::{Dimensions, MetricDefinition};
use serde_json::Value;
use std::collections::BTreeMap;

/// Classify a GitHub push payload into commit-volume, hotspot,
/// conventional-commit, breaking-change and code-churn metrics.
///
/// Missing or malformed sub-fields drop the affected facet; this function
/// never fails.
pub fn classify(data: &Value, options: &ClassifierOptions) -> Vec<MetricDefinition> {
    let mut metrics = Vec::new();

    let repository = data
        .get("repository")
        .and_then(|r| r.get("full_name"))
        .and_then(|v| v.as_str());

    let commits: &[Value] = data
        .get("commits")
        .and_then(|c| c.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[]);

    let base_dims = |mut dims: Dimensions| {
        if let Some(repo) = repository {
            dims.insert("repository", repo);
        }
        dims
    };

    // Commit volume, even for empty pushes (force pushes carry zero commits).
    let mut volume_dims = Dimensions::new();
    if let Some(branch) = data
        .get("ref")
        .and_then(|v| v.as_str())
        .map(|r| r.strip_prefix("refs/heads/").unwrap_or(r))
    {
        volume_dims.insert("branch", branch);
    }
    if let Some(pusher) = data
        .get("pusher")
        .and_then(|p| p.get("name"))
        .and_then(|v| v.as_str())
    {
        volume_dims.insert("pusher", pusher);
    }
    metrics.push(MetricDefinition::new(
        "github.push.commits.total",
        commits.len() as f64,
        base_dims(volume_dims),
    ));

    // Directory / extension hotspots across every touched file.
    let mut directories: BTreeMap<String, u64> = BTreeMap::new();
    let mut extensions: BTreeMap<String, u64> = BTreeMap::new();
    for commit in commits {
        for list in ["added", "modified", "removed"] {
            let Some(files) = commit.get(list).and_then(|f| f.as_array()) else {
                continue;
            };
            for file in files {
                let Some(path) = file.as_str() else { continue };
                if let Some(dir) = directory_prefix(path, options.hotspot_depth) {
                    *directories.entry(dir).or_insert(0) += 1;
                }
                if let Some(ext) = extension_of(path) {
                    *extensions.entry(ext).or_insert(0) += 1;
                }
            }
        }
    }
    for (directory, count) in directories {
        metrics.push(MetricDefinition::new(
            "commit.directory_change",
            count as f64,
            base_dims(Dimensions::new().set("directory", directory)),
        ));
    }
    for (extension, count) in extensions {
        metrics.push(MetricDefinition::new(
            "commit.file_extension",
            count as f64,
            base_dims(Dimensions::new().set("extension", extension)),
        ));
    }

    // Conventional-commit classification plus breaking-change markers.
    let mut additions_total = 0.0;
    let mut deletions_total = 0.0;
    for commit in commits {
        if let Some(message) = commit.get("message").and_then(|v| v.as_str()) {
            match conventional::parse(message) {
                Some(parsed) => {
                    let mut dims = Dimensions::new().set("commit_type", parsed.commit_type.clone());
                    if let Some(scope) = &parsed.scope {
                        dims.insert("commit_scope", scope.clone());
                    }
                    metrics.push(MetricDefinition::new("commit.type", 1.0, base_dims(dims)));

                    if parsed.breaking {
                        metrics.push(MetricDefinition::new(
                            "commit.breaking_change",
                            1.0,
                            base_dims(
                                Dimensions::new().set("commit_type", parsed.commit_type),
                            ),
                        ));
                    }
                }
                None => {
                    if options.unparseable_commits == UnparseableCommitMode::Other {
                        metrics.push(MetricDefinition::new(
                            "commit.type",
                            1.0,
                            base_dims(Dimensions::new().set("commit_type", "other")),
                        ));
                    }
                }
            }
        }

        additions_total += commit.get("additions").and_then(|v| v.as_f64()).unwrap_or(0.0);
        deletions_total += commit.get("deletions").and_then(|v| v.as_f64()).unwrap_or(0.0);
    }

    // Single churn metric per push; raw counts ride along as dimensions.
    if !commits.is_empty() {
        metrics.push(MetricDefinition::new(
            "commit.code_volume",
            additions_total + deletions_total,
            base_dims(
                Dimensions::new()
                    .set("additions", additions_total)
                    .set("deletions", deletions_total),
            ),
        ));
    }

    metrics
}

/// First `depth` path segments of a file path, or `None` for files at the
/// repository root (no directory to attribute the change to).
fn directory_prefix(path: &str, depth: usize) -> Option<String> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 {
        return None;
    }
    let take = depth.max(1).min(segments.len() - 1);
    Some(segments[..take].join("/"))
}

fn extension_of(path: &str) -> Option<String> {
    let file_name = path.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> ClassifierOptions {
        ClassifierOptions::default()
    }

    fn push_payload() -> Value {
        json!({
            "ref": "refs/heads/main",
            "repository": {"full_name": "acme/api"},
            "pusher": {"name": "jordan"},
            "commits": [
                {
                    "message": "feat(api): add endpoint",
                    "added": ["app/models/x.rb"],
                    "modified": [],
                    "removed": [],
                    "additions": 40,
                    "deletions": 5
                },
                {
                    "message": "fix(auth)!: change flow",
                    "added": [],
                    "modified": ["app/controllers/y.rb"],
                    "removed": [],
                    "additions": 12,
                    "deletions": 7
                }
            ]
        })
    }

    fn find<'a>(metrics: &'a [MetricDefinition], name: &str) -> Vec<&'a MetricDefinition> {
        metrics.iter().filter(|m| m.name == name).collect()
    }

    #[test]
    fn push_yields_volume_hotspots_types_and_churn() {
        let metrics = classify(&push_payload(), &options());

        let volume = find(&metrics, "github.push.commits.total");
        assert_eq!(volume.len(), 1);
        assert_eq!(volume[0].value, 2.0);
        assert_eq!(volume[0].dimensions.get_str("branch"), Some("main"));
        assert_eq!(volume[0].dimensions.get_str("pusher"), Some("jordan"));

        let dirs = find(&metrics, "commit.directory_change");
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].dimensions.get_str("directory"), Some("app"));
        assert_eq!(dirs[0].value, 2.0);

        let exts = find(&metrics, "commit.file_extension");
        assert_eq!(exts.len(), 1);
        assert_eq!(exts[0].dimensions.get_str("extension"), Some("rb"));
        assert_eq!(exts[0].value, 2.0);

        let types: Vec<&str> = find(&metrics, "commit.type")
            .iter()
            .filter_map(|m| m.dimensions.get_str("commit_type"))
            .collect();
        assert!(types.contains(&"feat"));
        assert!(types.contains(&"fix"));

        let breaking = find(&metrics, "commit.breaking_change");
        assert_eq!(breaking.len(), 1);
        assert_eq!(breaking[0].dimensions.get_str("commit_type"), Some("fix"));

        let churn = find(&metrics, "commit.code_volume");
        assert_eq!(churn.len(), 1);
        assert_eq!(churn[0].value, 64.0);
        assert_eq!(churn[0].dimensions.get_num("additions"), Some(52.0));
        assert_eq!(churn[0].dimensions.get_num("deletions"), Some(12.0));
    }

    #[test]
    fn deeper_hotspot_depth_splits_directories() {
        let opts = ClassifierOptions {
            hotspot_depth: 2,
            ..ClassifierOptions::default()
        };
        let metrics = classify(&push_payload(), &opts);

        let dirs: Vec<&str> = find(&metrics, "commit.directory_change")
            .iter()
            .filter_map(|m| m.dimensions.get_str("directory"))
            .collect();
        assert_eq!(dirs, vec!["app/controllers", "app/models"]);
    }

    #[test]
    fn unparseable_messages_are_skipped_by_default() {
        let payload = json!({
            "commits": [{"message": "updated some stuff", "added": ["README.md"]}]
        });
        let metrics = classify(&payload, &options());
        assert!(find(&metrics, "commit.type").is_empty());
    }

    #[test]
    fn unparseable_messages_bucket_as_other_when_configured() {
        let opts = ClassifierOptions {
            unparseable_commits: UnparseableCommitMode::Other,
            ..ClassifierOptions::default()
        };
        let payload = json!({
            "commits": [{"message": "updated some stuff"}]
        });
        let metrics = classify(&payload, &opts);

        let types = find(&metrics, "commit.type");
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].dimensions.get_str("commit_type"), Some("other"));
    }

    #[test]
    fn absent_commit_list_degrades_to_volume_only() {
        let metrics = classify(&json!({"repository": {"full_name": "acme/api"}}), &options());
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "github.push.commits.total");
        assert_eq!(metrics[0].value, 0.0);
    }

    #[test]
    fn root_files_count_for_extensions_but_not_directories() {
        let payload = json!({
            "commits": [{"message": "docs: readme", "modified": ["README.md", "src/lib.rs"]}]
        });
        let metrics = classify(&payload, &options());

        let dirs = find(&metrics, "commit.directory_change");
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].dimensions.get_str("directory"), Some("src"));

        let exts: Vec<&str> = find(&metrics, "commit.file_extension")
            .iter()
            .filter_map(|m| m.dimensions.get_str("extension"))
            .collect();
        assert_eq!(exts, vec!["md", "rs"]);
    }
}
