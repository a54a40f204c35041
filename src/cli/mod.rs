use clap::{Parser, Subcommand};

pub mod commands;

#[derive(Parser)]
#[command(name = "devpulse")]
#[command(about = "Engineering activity metrics and DORA analytics")]
#[command(long_about = "DevPulse ingests normalized engineering-activity events (GitHub pushes, \
                       issues, workflow runs, deployments, Jira issues), derives dimensioned \
                       metrics from them, and aggregates those metrics into DORA performance \
                       indicators and dashboard reports.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a JSON file of normalized events and derive metrics
    Ingest {
        /// Path to a JSON array of events ({name, source, data, timestamp})
        #[arg(long, help = "Events file to ingest")]
        file: String,
    },
    /// Display the four DORA indicators with ratings
    Dora {
        /// Time window in days to analyze
        #[arg(long, default_value = "30", help = "Days of history to analyze")]
        days: u32,
        /// Restrict to a single repository (org/name)
        #[arg(long, help = "Repository full name, e.g. acme/api")]
        repo: Option<String>,
        /// Ingest this events file before reporting
        #[arg(long, help = "Events file to ingest before reporting")]
        events: Option<String>,
        /// Lead-time percentile to include (e.g. 50, 75, 95)
        #[arg(long, help = "Order statistic to report alongside the mean")]
        percentile: Option<f64>,
    },
    /// Display commit volume, directory/extension hotspots and top authors
    Hotspots {
        #[arg(long, default_value = "30", help = "Days of history to analyze")]
        days: u32,
        #[arg(long, help = "Repository full name, e.g. acme/api")]
        repo: Option<String>,
        #[arg(long, help = "Events file to ingest before reporting")]
        events: Option<String>,
    },
    /// Display build success rates, durations and flaky jobs
    Builds {
        #[arg(long, default_value = "30", help = "Days of history to analyze")]
        days: u32,
        #[arg(long, help = "Repository full name, e.g. acme/api")]
        repo: Option<String>,
        #[arg(long, help = "Events file to ingest before reporting")]
        events: Option<String>,
    },
    /// Display weekly issue-closure velocity
    Velocity {
        #[arg(long, default_value = "30", help = "Days of history to analyze")]
        days: u32,
        #[arg(long, help = "Repository full name, e.g. acme/api")]
        repo: Option<String>,
        #[arg(long, help = "Events file to ingest before reporting")]
        events: Option<String>,
    },
    /// Export the DORA dashboard as JSON for external monitoring systems
    Export {
        #[arg(long, default_value = "30", help = "Days of history to analyze")]
        days: u32,
        #[arg(long, help = "Repository full name, e.g. acme/api")]
        repo: Option<String>,
        #[arg(long, help = "Events file to ingest before reporting")]
        events: Option<String>,
        /// Output file path (default: stdout)
        #[arg(long, help = "File path to write JSON (prints to stdout if not specified)")]
        output: Option<String>,
    },
}
