//! HTTP client for a running relay, plus a headless stand-in for the player page.

use std::time::Duration;

use shared::{AckResponse, Command, CommandKind, FeedbackEvent, FeedbackState, StatusResponse};
use tokio::time::Instant;

/// Talks to the relay's JSON endpoints.
#[derive(Clone)]
pub struct RelayClient {
    base_url: String,
    http: reqwest::Client,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Base URL from `RELAY_URL`, default `http://127.0.0.1:8080`.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("RELAY_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queue a command on the relay.
    pub async fn send(&self, cmd: CommandKind, video_id: &str) -> anyhow::Result<AckResponse> {
        let res = self
            .http
            .post(format!("{}/command", self.base_url))
            .json(&Command::new(cmd, video_id))
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let err = res.text().await.unwrap_or_default();
            anyhow::bail!("command rejected ({}): {}", status, err);
        }
        Ok(res.json().await?)
    }

    pub async fn status(&self) -> anyhow::Result<StatusResponse> {
        let res = self
            .http
            .get(format!("{}/status", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    /// Take the next queued command, if any.
    pub async fn poll(&self) -> anyhow::Result<Option<Command>> {
        let body: serde_json::Value = self
            .http
            .get(format!("{}/poll", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Command::from_poll_body(body)?)
    }

    pub async fn feedback(
        &self,
        state: FeedbackState,
        video_id: &str,
    ) -> anyhow::Result<AckResponse> {
        let res = self
            .http
            .post(format!("{}/feedback", self.base_url))
            .json(&FeedbackEvent::new(state, video_id))
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }
}

/// Headless player: executes polled commands and reports back like the web page does.
///
/// A preload reports `preloading` at once and `ready` after `ready_after`.
/// A play reports `playing`.
pub struct SimulatedPlayer {
    client: RelayClient,
    ready_after: Duration,
    loading: Option<(String, Instant)>,
    playing: Option<String>,
}

impl SimulatedPlayer {
    pub fn new(client: RelayClient, ready_after: Duration) -> Self {
        Self {
            client,
            ready_after,
            loading: None,
            playing: None,
        }
    }

    pub fn playing(&self) -> Option<&str> {
        self.playing.as_deref()
    }

    /// One poll cycle: report a finished preload, then fetch and execute one command.
    pub async fn tick(&mut self) -> anyhow::Result<Option<Command>> {
        let due = matches!(&self.loading, Some((_, at)) if Instant::now() >= *at);
        if due {
            if let Some((id, _)) = self.loading.take() {
                self.client.feedback(FeedbackState::Ready, &id).await?;
                tracing::info!(video_id = %id, "ready");
            }
        }

        let Some(command) = self.client.poll().await? else {
            return Ok(None);
        };
        match command.cmd {
            CommandKind::Preload => {
                tracing::info!(video_id = %command.video_id, "preloading");
                self.client
                    .feedback(FeedbackState::Preloading, &command.video_id)
                    .await?;
                self.loading = Some((command.video_id.clone(), Instant::now() + self.ready_after));
            }
            CommandKind::Play => {
                tracing::info!(video_id = %command.video_id, "playing");
                if self
                    .loading
                    .as_ref()
                    .is_some_and(|(id, _)| *id == command.video_id)
                {
                    self.loading = None;
                }
                self.playing = Some(command.video_id.clone());
                self.client
                    .feedback(FeedbackState::Playing, &command.video_id)
                    .await?;
            }
        }
        Ok(Some(command))
    }

    /// Poll forever at `interval`. Transport errors are logged and retried.
    pub async fn run(mut self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                tracing::warn!(err = %e, "poll failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{DisplayState, Intent, PlaybackCoordinator};
    use relayer::{CommandQueue, Config, FeedbackChannel, RelayServer};
    use std::sync::Arc;

    async fn live_relay() -> (Arc<PlaybackCoordinator>, RelayServer, RelayClient) {
        let dir = std::env::temp_dir().join(format!("controller_remote_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let queue = Arc::new(CommandQueue::new());
        let coordinator = Arc::new(PlaybackCoordinator::new(queue.clone()));
        let feedback = FeedbackChannel::new();
        feedback.register(coordinator.clone());
        let mut server = RelayServer::new(Config::for_test(dir), queue, feedback);
        let addr = server.start(0).await.unwrap();
        (coordinator, server, RelayClient::new(format!("http://{}/", addr)))
    }

    #[tokio::test]
    async fn send_then_poll_and_status() {
        let (_coordinator, mut server, client) = live_relay().await;

        let ack = client.send(CommandKind::Play, "xyz").await.unwrap();
        assert_eq!(ack.status, "success");
        assert_eq!(client.status().await.unwrap().queue_size, 1);

        let command = client.poll().await.unwrap().unwrap();
        assert_eq!(command.cmd, CommandKind::Play);
        assert_eq!(command.video_id, "xyz");
        assert!(client.poll().await.unwrap().is_none());

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn simulated_player_completes_a_play_handshake() {
        let (coordinator, mut server, client) = live_relay().await;
        let mut player = SimulatedPlayer::new(client, Duration::ZERO);

        coordinator.issue(Intent::Play("abc123".to_string()));
        let first = player.tick().await.unwrap().unwrap();
        assert_eq!(first.cmd, CommandKind::Preload);
        assert_eq!(
            coordinator.display(),
            DisplayState::Preloading("abc123".to_string())
        );

        // Reports ready, which queues the play, then executes it.
        let second = player.tick().await.unwrap().unwrap();
        assert_eq!(second.cmd, CommandKind::Play);
        assert_eq!(player.playing(), Some("abc123"));
        assert_eq!(
            coordinator.display(),
            DisplayState::Playing("abc123".to_string())
        );

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_relay_is_an_error() {
        let client = RelayClient::new("http://127.0.0.1:9");
        assert!(client.status().await.is_err());
    }
}
