//! API route handlers: command outbox, status, feedback inbox.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use shared::{unix_timestamp, AckResponse, Command, ModelError, StatusResponse};

use crate::api::{AppState, INTERNAL_ERROR_BODY};

/// Pop the oldest command, or the empty marker when nothing is queued.
pub(super) async fn poll(State(state): State<AppState>) -> Json<serde_json::Value> {
    let command = state.queue.pop();
    if let Some(c) = &command {
        tracing::info!(cmd = c.cmd.as_str(), video_id = %c.video_id, "command delivered");
    }
    Json(Command::poll_body(command.as_ref()))
}

pub(super) async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "running".to_string(),
        queue_size: state.queue.len(),
        timestamp: unix_timestamp(),
    })
}

pub(super) async fn command(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AckResponse>, (StatusCode, String)> {
    let command = Command::from_slice(&body).map_err(malformed)?;
    tracing::info!(cmd = command.cmd.as_str(), video_id = %command.video_id, "command received");
    state.queue.enqueue(command);
    Ok(Json(AckResponse::success("Command received")))
}

/// Validate and hand the payload to the registered sink, synchronously.
pub(super) async fn feedback(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AckResponse>, (StatusCode, String)> {
    state.feedback.dispatch_raw(&body).map_err(malformed)?;
    Ok(Json(AckResponse::success("Feedback received")))
}

fn malformed(err: ModelError) -> (StatusCode, String) {
    tracing::warn!(err = %err, "malformed request body");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_ERROR_BODY.to_string(),
    )
}
