//! HTTP API routes.

mod assets;
mod routes;

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use assets::AssetRoot;

use crate::feedback::FeedbackChannel;
use crate::queue::CommandQueue;

/// Body of every 500 the relay produces.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Shared app state.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<CommandQueue>,
    pub feedback: FeedbackChannel,
    pub assets: Arc<AssetRoot>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/poll", get(routes::poll).fallback(assets::serve))
        .route("/status", get(routes::status).fallback(assets::serve))
        .route("/command", post(routes::command).fallback(assets::serve))
        .route("/feedback", post(routes::feedback).fallback(assets::serve))
        .route(
            "/",
            get(assets::redirect_to_entry).fallback(assets::serve),
        )
        .fallback(assets::serve)
        .layer(CatchPanicLayer::custom(internal_error_on_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn internal_error_on_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "request handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, Response};
    use http_body_util::BodyExt;
    use uuid::Uuid;

    use super::{AppState, AssetRoot};
    use crate::config::Config;
    use crate::feedback::FeedbackChannel;
    use crate::queue::CommandQueue;

    /// Temp directory with `web/` (the asset root) and a `secret.html` beside it.
    pub fn asset_fixture() -> PathBuf {
        let base = std::env::temp_dir().join(format!("relayer_assets_{}", Uuid::new_v4()));
        let web = base.join("web");
        std::fs::create_dir_all(web.join("css")).unwrap();
        std::fs::write(web.join("player.html"), "<html>player</html>").unwrap();
        std::fs::write(web.join("player.js"), "console.log('poll');").unwrap();
        std::fs::write(web.join("css").join("player.css"), "body {}").unwrap();
        std::fs::write(web.join("clip.bin"), [0u8, 1, 2]).unwrap();
        std::fs::write(base.join("secret.html"), "<html>secret</html>").unwrap();
        web
    }

    pub fn test_state() -> AppState {
        let config = Config::for_test(asset_fixture());
        AppState {
            queue: Arc::new(CommandQueue::new()),
            feedback: FeedbackChannel::new(),
            assets: Arc::new(AssetRoot::new(&config).unwrap()),
        }
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    pub fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body))
            .unwrap()
    }

    pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }
}
