//! VJ player controller.
//!
//! Optional env: HOST, PORT, WEB_ROOT, ENTRY_PAGE, SHUTDOWN_TIMEOUT_SECS, RELAY_URL

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use controller::cli::{self, Commands};
use controller::console;
use controller::coordinator::PlaybackCoordinator;
use controller::remote::{RelayClient, SimulatedPlayer};
use relayer::{CommandQueue, Config, FeedbackChannel, RelayServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = cli::Cli::parse();

    match cli.command.unwrap_or_default() {
        Commands::Run { port, web_root } => {
            let mut config = Config::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(web_root) = web_root {
                config.web_root = web_root;
            }
            run(config).await?;
        }
        Commands::Send { cmd, video_id } => {
            let client = RelayClient::from_env();
            let ack = client.send(cmd, &video_id).await?;
            println!("{}: {}", ack.status, ack.message);
        }
        Commands::Status => {
            let client = RelayClient::from_env();
            let status = client.status().await?;
            println!("{} (queue: {})", status.status, status.queue_size);
        }
        Commands::SimulatePlayer {
            ready_after_ms,
            poll_interval_ms,
        } => {
            let client = RelayClient::from_env();
            tracing::info!("Simulated player polling {}", client.base_url());
            let player = SimulatedPlayer::new(client, Duration::from_millis(ready_after_ms));
            tokio::select! {
                _ = player.run(Duration::from_millis(poll_interval_ms)) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
    }

    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    let port = config.port;
    let queue = Arc::new(CommandQueue::new());
    let feedback = FeedbackChannel::new();
    let coordinator = Arc::new(PlaybackCoordinator::new(queue.clone()));
    coordinator.reset();
    feedback.register(coordinator.clone());

    let observer = coordinator.on_state_change(|change| {
        println!(
            "[{}] {}",
            change.display.label(),
            change.video_id.as_deref().unwrap_or("-")
        );
    });

    let mut server = RelayServer::new(config, queue, feedback.clone());
    let addr = server
        .start(port)
        .await
        .map_err(|e| anyhow::anyhow!("relay: {}", e))?;
    println!("Player page: http://{}/", addr);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = tokio::select! {
        res = console::run(stdin, &coordinator, &mut server) => res,
        _ = tokio::signal::ctrl_c() => Ok(()),
    };

    tracing::info!("Shutting down");
    feedback.unregister();
    coordinator.reset();
    server.stop().await?;
    observer.abort();
    result
}
