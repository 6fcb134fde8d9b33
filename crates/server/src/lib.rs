//! HTTP server for the gogshelf library.
//!
//! Serves the browser UI (a static shell plus server-rendered HTML
//! fragments), the JSON API and locally downloaded metadata assets, and
//! runs the optional cron scheduler for periodic scans.

mod error;
mod routes;
mod scheduler;
mod state;
mod view;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

pub use error::ApiError;
pub use routes::router;
pub use scheduler::{parse_schedule, run_scheduler, CronSchedule};
pub use state::AppState;

/// Binds the listener and serves until `cancel` fires.
pub async fn run(
    state: Arc<AppState>,
    port: u16,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(addr = %listener.local_addr()?, "gogshelf listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
}
