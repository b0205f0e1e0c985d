//! VJ player relay — standalone HTTP relay.
//!
//! Runs only the command queue and feedback inbox; feedback is logged.
//! Optional env: HOST, PORT, WEB_ROOT, ENTRY_PAGE, SHUTDOWN_TIMEOUT_SECS

use std::sync::Arc;

use relayer::{config, CommandQueue, FeedbackChannel, RelayServer};
use shared::FeedbackEvent;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::Config::from_env();
    let port = config.port;

    let queue = Arc::new(CommandQueue::new());
    let feedback = FeedbackChannel::new();
    feedback.register(Arc::new(|ev: FeedbackEvent| {
        tracing::info!(state = ev.state.as_str(), video_id = %ev.video_id, "player feedback");
    }));

    let mut server = RelayServer::new(config, queue, feedback);
    server
        .start(port)
        .await
        .map_err(|e| anyhow::anyhow!("relay: {}", e))?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    server.stop().await?;

    Ok(())
}
