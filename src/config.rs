use crate::classify::{ClassifierOptions, UnparseableCommitMode};
use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for DevPulse
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DevPulseConfig {
    /// Event classification settings
    pub classifier: ClassifierConfig,
    /// DORA reporting defaults
    pub dora: DoraConfig,
    /// Report cache settings
    pub cache: CacheConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Database settings (optional)
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    /// Path segments kept for directory hotspot grouping
    pub hotspot_depth: usize,
    /// What to do with commit messages that are not Conventional Commits
    pub unparseable_commits: UnparseableCommitMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DoraConfig {
    /// Default aggregation window in days
    pub window_days: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Enable the advisory report cache
    pub enabled: bool,
    /// Maximum cached entries
    pub max_entries: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level directive (overridden by RUST_LOG)
    pub log_level: String,
    /// Emit JSON-structured log lines
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file path or connection string
    pub url: String,
}

impl Default for DevPulseConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig {
                hotspot_depth: 1,
                unparseable_commits: UnparseableCommitMode::Skip,
            },
            dora: DoraConfig { window_days: 30 },
            cache: CacheConfig {
                enabled: true,
                max_entries: 10_000,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            database: None,
        }
    }
}

impl DevPulseConfig {
    /// Load configuration by layering `devpulse.toml` (if present) and
    /// `DEVPULSE_`-prefixed environment variables over the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("devpulse.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Config::try_from(&DevPulseConfig::default())?;

        let mut builder = Config::builder().add_source(defaults);
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix("DEVPULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn classifier_options(&self) -> ClassifierOptions {
        ClassifierOptions {
            hotspot_depth: self.classifier.hotspot_depth,
            unparseable_commits: self.classifier.unparseable_commits,
        }
    }
}
