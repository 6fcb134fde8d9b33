//! gogshelf server entry point.

mod config;

use std::sync::Arc;

use gogshelf_notify::Notifier;
use gogshelf_server::{parse_schedule, run_scheduler, AppState};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting gogshelf");

    let config = config::Config::from_env()?;
    tracing::info!(
        installers = %config.installer_root.display(),
        metadata = %config.metadata_root.display(),
        port = config.port,
        "configuration loaded"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config))?;

    tracing::info!("gogshelf shut down cleanly");
    Ok(())
}

async fn run(config: config::Config) -> anyhow::Result<()> {
    let client = gogshelf_gog::Client::new()?;
    let notifier = Arc::new(Notifier::new(config.discord_webhook_url.clone()));

    let state = Arc::new(AppState {
        installer_root: config.installer_root.clone(),
        metadata_root: config.metadata_root.clone(),
        resolver: Arc::new(client),
        notifier,
        download_assets: config.download_assets,
        scan_lock: tokio::sync::Mutex::new(()),
    });

    let cancel = CancellationToken::new();

    if let Some(raw) = &config.schedule {
        match parse_schedule(raw) {
            Some(schedule) => {
                tracing::info!(schedule = raw, "automatic scans enabled");
                tokio::spawn(run_scheduler(state.clone(), schedule, cancel.clone()));
            }
            None => tracing::warn!(schedule = raw, "unparseable schedule, automatic scans off"),
        }
    }

    // Ctrl-C triggers a graceful shutdown.
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            shutdown.cancel();
        }
    });

    gogshelf_server::run(state, config.port, cancel).await?;
    Ok(())
}
