// Command handlers: wire stores, services and reports together

use crate::analytics::{reports, AnalyticsService};
use crate::cache::MemoryCache;
use crate::calculate::MetricCalculationService;
use crate::classify::MetricClassifier;
use crate::config::DevPulseConfig;
use crate::dora::{DateRange, LeadTimeOptions};
use crate::model::Event;
use crate::registrar::MemoryRegistrar;
use crate::store::{EventStore, MemoryEventStore, MemoryMetricStore, MetricStore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Wired-up application state shared by every command.
pub struct App {
    pub events: Arc<dyn EventStore>,
    pub metrics: Arc<dyn MetricStore>,
    pub calculation: MetricCalculationService,
    pub analytics: AnalyticsService,
}

impl App {
    pub fn new(config: &DevPulseConfig) -> Self {
        let events: Arc<dyn EventStore> = Arc::new(MemoryEventStore::new());
        let metrics: Arc<dyn MetricStore> = Arc::new(MemoryMetricStore::new());
        let registrar = Arc::new(MemoryRegistrar::new());

        let classifier = MetricClassifier::new(config.classifier_options());
        let mut calculation =
            MetricCalculationService::new(events.clone(), metrics.clone(), classifier)
                .with_registrar(registrar);
        let mut analytics = AnalyticsService::new(metrics.clone());
        if config.cache.enabled {
            let cache = Arc::new(MemoryCache::new(config.cache.max_entries));
            calculation = calculation.with_cache(cache.clone());
            analytics = analytics.with_cache(cache);
        }

        Self {
            events,
            metrics,
            calculation,
            analytics,
        }
    }

    /// Ingest an events file when one was supplied; reports over the
    /// in-memory stores are empty without it.
    pub async fn maybe_ingest(&self, events_file: Option<&str>) -> Result<()> {
        if let Some(path) = events_file {
            self.ingest_file(path).await?;
        }
        Ok(())
    }

    pub async fn ingest_file(&self, path: &str) -> Result<usize> {
        #[derive(Deserialize)]
        struct RawEvent {
            name: String,
            source: String,
            #[serde(default)]
            data: serde_json::Value,
            timestamp: Option<DateTime<Utc>>,
        }

        let body = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading events file {path}"))?;
        let raw_events: Vec<RawEvent> =
            serde_json::from_str(&body).with_context(|| format!("parsing events file {path}"))?;

        let mut derived = 0usize;
        let total = raw_events.len();
        for raw in raw_events {
            let mut event = Event::new(raw.name, raw.source, raw.data)?;
            if let Some(timestamp) = raw.timestamp {
                event = event.with_timestamp(timestamp);
            }
            let saved = self.events.save(event).await?;
            let id = saved.id.context("event store did not stamp an id")?;
            let outcome = self.calculation.call(id).await?;
            derived += outcome.metrics.len();
        }

        info!(
            ingest.events = total,
            ingest.metrics = derived,
            "Event ingestion completed"
        );
        Ok(derived)
    }
}

pub async fn run_ingest(app: &App, file: &str) -> Result<()> {
    let derived = app.ingest_file(file).await?;
    println!("Ingested events from {file}: {derived} metrics derived");
    Ok(())
}

pub async fn run_dora(
    app: &App,
    days: u32,
    repo: Option<&str>,
    percentile: Option<f64>,
) -> Result<()> {
    let window = DateRange::last_days(days);
    if percentile.is_some() {
        let options = LeadTimeOptions {
            percentile,
            breakdown: true,
        };
        let mut dashboard = app.analytics.dora_dashboard(&window, repo).await;
        dashboard.lead_time = app.analytics.dora().lead_time(&window, repo, &options).await;
        println!("{}", reports::format_dora_report(&dashboard, days as u64));
    } else {
        let dashboard = app.analytics.dora_dashboard(&window, repo).await;
        println!("{}", reports::format_dora_report(&dashboard, days as u64));
    }
    Ok(())
}

pub async fn run_hotspots(app: &App, days: u32, repo: Option<&str>) -> Result<()> {
    let window = DateRange::last_days(days);
    let activity = app.analytics.commit_activity(&window, repo).await;
    println!("{}", reports::format_commit_report(&activity));
    Ok(())
}

pub async fn run_builds(app: &App, days: u32, repo: Option<&str>) -> Result<()> {
    let window = DateRange::last_days(days);
    let builds = app.analytics.build_performance(&window, repo).await;
    println!("{}", reports::format_build_report(&builds));
    Ok(())
}

pub async fn run_velocity(app: &App, days: u32, repo: Option<&str>) -> Result<()> {
    let window = DateRange::last_days(days);
    let velocity = app.analytics.team_velocity(&window, repo).await;
    println!("{}", reports::format_velocity_report(&velocity));
    Ok(())
}

pub async fn run_export(
    app: &App,
    days: u32,
    repo: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let window = DateRange::last_days(days);
    let dashboard = app.analytics.dora_dashboard(&window, repo).await;
    let body = serde_json::to_string_pretty(&dashboard)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &body)
                .await
                .with_context(|| format!("writing export to {path}"))?;
            println!("DORA dashboard exported to {path}");
        }
        None => println!("{body}"),
    }
    Ok(())
}
