//! Wire models exchanged between the relay, the controller, and the player page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload validation failures.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("videoId must not be empty")]
    EmptyVideoId,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// Seconds since the Unix epoch, with millisecond precision.
pub fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Command kind understood by the player page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandKind {
    Preload,
    Play,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preload => "PRELOAD",
            Self::Play => "PLAY",
        }
    }
}

impl std::str::FromStr for CommandKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PRELOAD" => Ok(Self::Preload),
            "PLAY" => Ok(Self::Play),
            other => Err(ModelError::UnknownCommand(other.to_string())),
        }
    }
}

/// A queued instruction for the player page. Delivered at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub cmd: CommandKind,
    #[serde(rename = "videoId")]
    pub video_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Command {
    /// Command stamped with the current time, as the coordinator emits them.
    pub fn new(cmd: CommandKind, video_id: impl Into<String>) -> Self {
        Self {
            cmd,
            video_id: video_id.into(),
            timestamp: Some(unix_timestamp()),
        }
    }

    /// Parse and validate a `POST /command` body.
    pub fn from_slice(body: &[u8]) -> Result<Self, ModelError> {
        let command: Command = serde_json::from_slice(body)?;
        if command.video_id.trim().is_empty() {
            return Err(ModelError::EmptyVideoId);
        }
        Ok(command)
    }

    /// JSON returned by `GET /poll`; an empty queue yields `{"cmd":"","videoId":""}`.
    pub fn poll_body(command: Option<&Command>) -> serde_json::Value {
        match command {
            Some(c) => serde_json::to_value(c)
                .unwrap_or_else(|_| serde_json::json!({"cmd": "", "videoId": ""})),
            None => serde_json::json!({"cmd": "", "videoId": ""}),
        }
    }

    /// Inverse of [`Command::poll_body`]: `None` for the empty marker.
    pub fn from_poll_body(value: serde_json::Value) -> Result<Option<Self>, ModelError> {
        let is_empty = value
            .get("cmd")
            .and_then(|v| v.as_str())
            .map(|s| s.is_empty())
            .unwrap_or(false);
        if is_empty {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

/// Player-reported state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackState {
    Preloading,
    Ready,
    Playing,
}

impl FeedbackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preloading => "preloading",
            Self::Ready => "ready",
            Self::Playing => "playing",
        }
    }
}

/// `POST /feedback` body sent by the player page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub state: FeedbackState,
    #[serde(rename = "videoId")]
    pub video_id: String,
    /// Player clock, milliseconds since the epoch in the reference player.
    pub timestamp: f64,
}

impl FeedbackEvent {
    pub fn new(state: FeedbackState, video_id: impl Into<String>) -> Self {
        Self {
            state,
            video_id: video_id.into(),
            timestamp: unix_timestamp() * 1000.0,
        }
    }

    /// Parse and validate the payload shape `{state, videoId, timestamp}`.
    pub fn from_slice(body: &[u8]) -> Result<Self, ModelError> {
        let event: FeedbackEvent = serde_json::from_slice(body)?;
        if event.video_id.trim().is_empty() {
            return Err(ModelError::EmptyVideoId);
        }
        Ok(event)
    }
}

/// `{"status":"success","message":...}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl AckResponse {
    pub fn success(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
        }
    }
}

/// `GET /status` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub queue_size: usize,
    pub timestamp: f64,
}
