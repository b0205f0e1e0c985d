//! Relay lifecycle: bind, serve in the background, stop gracefully, restart on a new port.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::{self, AppState, AssetRoot};
use crate::config::Config;
use crate::error::RelayError;
use crate::feedback::FeedbackChannel;
use crate::queue::CommandQueue;

struct Running {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

/// Owned relay instance. The queue and feedback channel outlive individual runs.
pub struct RelayServer {
    config: Config,
    queue: Arc<CommandQueue>,
    feedback: FeedbackChannel,
    running: Option<Running>,
}

impl RelayServer {
    pub fn new(config: Config, queue: Arc<CommandQueue>, feedback: FeedbackChannel) -> Self {
        Self {
            config,
            queue,
            feedback,
            running: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn queue(&self) -> &Arc<CommandQueue> {
        &self.queue
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.addr)
    }

    /// Bind `host:port` and spawn the serve loop. Port 0 picks an ephemeral port.
    pub async fn start(&mut self, port: u16) -> Result<SocketAddr, RelayError> {
        if let Some(running) = &self.running {
            return Err(RelayError::AlreadyRunning(running.addr));
        }

        let assets = AssetRoot::new(&self.config)?;
        let bind = format!("{}:{}", self.config.host, port);
        let listener = tokio::net::TcpListener::bind(&bind)
            .await
            .map_err(|source| RelayError::Bind {
                addr: bind.clone(),
                source,
            })?;
        let addr = listener.local_addr()?;

        let state = AppState {
            queue: self.queue.clone(),
            feedback: self.feedback.clone(),
            assets: Arc::new(assets),
        };
        let app = api::router(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        self.config.port = addr.port();
        tracing::info!("Relay listening on {}", addr);
        self.running = Some(Running {
            addr,
            shutdown_tx,
            handle,
        });
        Ok(addr)
    }

    /// Signal shutdown and wait, bounded by the configured timeout, for in-flight
    /// requests to finish. The socket is released when this returns.
    pub async fn stop(&mut self) -> Result<(), RelayError> {
        let Some(Running {
            addr,
            shutdown_tx,
            mut handle,
        }) = self.running.take()
        else {
            return Ok(());
        };

        let _ = shutdown_tx.send(());
        match tokio::time::timeout(self.config.shutdown_timeout(), &mut handle).await {
            Ok(Ok(Ok(()))) => {
                tracing::info!("Relay on {} stopped", addr);
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(RelayError::Serve(e)),
            Ok(Err(join_err)) => {
                tracing::error!(err = %join_err, "relay task ended abnormally");
                Ok(())
            }
            Err(_) => {
                tracing::warn!(
                    "Relay on {} did not drain within {:?}, aborting",
                    addr,
                    self.config.shutdown_timeout()
                );
                handle.abort();
                // Awaiting the aborted task drops the listener.
                let _ = handle.await;
                Ok(())
            }
        }
    }

    /// Full stop, then start on `port`.
    pub async fn restart(&mut self, port: u16) -> Result<SocketAddr, RelayError> {
        self.stop().await?;
        self.start(port).await
    }
}
