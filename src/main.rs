use anyhow::Result;
use clap::Parser;

use devpulse::cli::{commands, Cli, Commands};
use devpulse::config::DevPulseConfig;
use devpulse::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = DevPulseConfig::load()?;
    init_telemetry(
        &config.observability.log_level,
        config.observability.json_logs,
    )?;

    let cli = Cli::parse();
    let app = commands::App::new(&config);

    match cli.command {
        Commands::Ingest { file } => commands::run_ingest(&app, &file).await,
        Commands::Dora {
            days,
            repo,
            events,
            percentile,
        } => {
            app.maybe_ingest(events.as_deref()).await?;
            commands::run_dora(&app, days, repo.as_deref(), percentile).await
        }
        Commands::Hotspots { days, repo, events } => {
            app.maybe_ingest(events.as_deref()).await?;
            commands::run_hotspots(&app, days, repo.as_deref()).await
        }
        Commands::Builds { days, repo, events } => {
            app.maybe_ingest(events.as_deref()).await?;
            commands::run_builds(&app, days, repo.as_deref()).await
        }
        Commands::Velocity { days, repo, events } => {
            app.maybe_ingest(events.as_deref()).await?;
            commands::run_velocity(&app, days, repo.as_deref()).await
        }
        Commands::Export {
            days,
            repo,
            events,
            output,
        } => {
            app.maybe_ingest(events.as_deref()).await?;
            commands::run_export(&app, days, repo.as_deref(), output.as_deref()).await
        }
    }
}
