// End-to-end classification: stored push event through the calculation
// service, checking the derived metric set and dimension enrichment.

use devpulse::{
    Event, EventStore, MemoryEventStore, MemoryMetricStore, MemoryRegistrar, Metric,
    MetricCalculationService, MetricClassifier, MetricFilter, MetricStore,
};
use serde_json::json;
use std::sync::Arc;

fn push_event() -> Event {
    Event::new(
        "github.push",
        "github",
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
        }),
    )
    .unwrap()
}

struct Pipeline {
    service: MetricCalculationService,
    metrics: Arc<MemoryMetricStore>,
    event_id: uuid::Uuid,
}

async fn pipeline_with(event: Event) -> Pipeline {
    let events = Arc::new(MemoryEventStore::new());
    let metrics = Arc::new(MemoryMetricStore::new());
    let saved = events.save(event).await.unwrap();

    let service = MetricCalculationService::new(
        events.clone(),
        metrics.clone(),
        MetricClassifier::default(),
    )
    .with_registrar(Arc::new(MemoryRegistrar::new()));

    Pipeline {
        service,
        metrics,
        event_id: saved.id.unwrap(),
    }
}

fn named<'a>(metrics: &'a [Metric], name: &str) -> Vec<&'a Metric> {
    metrics.iter().filter(|m| m.name == name).collect()
}

#[tokio::test]
async fn push_scenario_derives_the_expected_metric_set() {
    let pipeline = pipeline_with(push_event()).await;
    let outcome = pipeline.service.call(pipeline.event_id).await.unwrap();
    assert!(outcome.warnings.is_empty());

    let directory_changes = named(&outcome.metrics, "commit.directory_change");
    assert_eq!(directory_changes.len(), 1);
    assert_eq!(directory_changes[0].dimensions.get_str("directory"), Some("app"));
    assert_eq!(directory_changes[0].value, 2.0);

    let commit_types: Vec<&str> = named(&outcome.metrics, "commit.type")
        .iter()
        .filter_map(|m| m.dimensions.get_str("commit_type"))
        .collect();
    assert!(commit_types.contains(&"feat"));
    assert!(commit_types.contains(&"fix"));

    let breaking = named(&outcome.metrics, "commit.breaking_change");
    assert_eq!(breaking.len(), 1);

    let churn = named(&outcome.metrics, "commit.code_volume");
    assert_eq!(churn.len(), 1);
    assert_eq!(churn[0].value, 64.0);
}

#[tokio::test]
async fn all_derived_metrics_share_repository_and_organization() {
    let pipeline = pipeline_with(push_event()).await;
    let outcome = pipeline.service.call(pipeline.event_id).await.unwrap();

    assert!(!outcome.metrics.is_empty());
    for metric in &outcome.metrics {
        assert_eq!(
            metric.dimensions.get_str("repository"),
            Some("acme/api"),
            "metric {} missing repository",
            metric.name
        );
        assert_eq!(metric.dimensions.get_str("organization"), Some("acme"));
    }
}

#[tokio::test]
async fn derived_metrics_are_queryable_through_the_store() {
    let pipeline = pipeline_with(push_event()).await;
    pipeline.service.call(pipeline.event_id).await.unwrap();

    let stored = pipeline
        .metrics
        .list(&MetricFilter::new().name_prefix("commit."))
        .await
        .unwrap();
    assert!(stored.len() >= 4);
    assert!(stored.iter().all(|m| m.id.is_some()));
    assert!(stored.iter().all(|m| m.source == "github"));
}

#[tokio::test]
async fn event_without_repository_still_calculates() {
    let event = Event::new(
        "github.push",
        "github",
        json!({"commits": [{"message": "chore: tidy", "added": ["src/lib.rs"]}]}),
    )
    .unwrap();
    let pipeline = pipeline_with(event).await;
    let outcome = pipeline.service.call(pipeline.event_id).await.unwrap();

    assert!(!outcome.metrics.is_empty());
    for metric in &outcome.metrics {
        assert!(metric.dimensions.get_str("repository").is_none());
    }
}
