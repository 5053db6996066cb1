use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use wt_presence::discord::DiscordPresence;
use wt_presence::presence::Poller;
use wt_presence::settings::{load_merged, SettingsStore};
use wt_presence::{engine_from_settings, logging, Result};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Discord application id; saved to the settings file
    #[arg(long)]
    app_id: Option<String>,

    /// Base URL of the game's local telemetry API
    #[arg(long)]
    api_url: Option<String>,

    /// Seconds between polls
    #[arg(short, long)]
    interval: Option<u64>,

    /// Do not download the shared map manifest
    #[arg(long)]
    offline_manifest: bool,
}

#[tokio::main]
async fn main() {
    let _guard = logging::init_logging();

    if let Err(e) = run(Args::parse()).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let store = match args.config {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::default_location()?,
    };

    let mut settings = load_merged(&store, !args.offline_manifest).await?;

    if let Some(app_id) = args.app_id {
        settings.app_id = Some(app_id);
        store.save(&settings)?;
        tracing::info!("Application id saved to {}", store.path().display());
    }
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    let interval = args
        .interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| settings.poll_interval());

    let app_id = settings.require_app_id()?.to_string();
    let engine = engine_from_settings(&settings)?;

    let mut poller = Poller::new(interval);
    poller
        .start(
            engine,
            DiscordPresence::connect(&app_id),
            Some(Box::new(store)),
        )
        .await?;

    tracing::info!(
        "Monitoring War Thunder at {}, press Ctrl+C to stop",
        settings.api_url
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }

    tracing::info!("Stopping...");
    poller.stop().await;
    Ok(())
}
