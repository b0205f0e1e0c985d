//! Player page hosting: `/`, `/web/*`, and `*.html` / `*.js` / `*.css`.

use std::io;
use std::path::{Component, Path, PathBuf};

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::api::{AppState, INTERNAL_ERROR_BODY};
use crate::config::Config;
use crate::error::RelayError;

const SERVED_EXTENSIONS: &[&str] = &[".html", ".js", ".css"];

/// Canonicalized directory the player assets are served from.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    root: PathBuf,
    entry_page: String,
}

/// Why an asset request was refused.
#[derive(Debug)]
enum AssetError {
    InvalidPath,
    NotFound,
    Io(io::Error),
}

impl AssetRoot {
    /// Fails when the configured root does not exist or is not a directory.
    pub fn new(config: &Config) -> Result<Self, RelayError> {
        let web_root_err = |source| RelayError::WebRoot {
            path: config.web_root.clone(),
            source,
        };
        let root = config.web_root.canonicalize().map_err(web_root_err)?;
        if !root.is_dir() {
            return Err(web_root_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            )));
        }
        Ok(Self {
            root,
            entry_page: config.entry_page.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_location(&self) -> String {
        format!("/{}", self.entry_page)
    }

    /// Map a request path onto a file under the root.
    fn resolve(&self, request_path: &str) -> Result<PathBuf, AssetError> {
        let rel = request_path.trim_start_matches('/');
        let rel = rel.strip_prefix("web/").unwrap_or(rel);
        let rel = Path::new(rel);
        if rel.is_absolute()
            || rel.components().any(|c| {
                matches!(
                    c,
                    Component::ParentDir | Component::RootDir | Component::Prefix(_)
                )
            })
        {
            return Err(AssetError::InvalidPath);
        }

        let canonical = self.root.join(rel).canonicalize().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                AssetError::NotFound
            } else {
                AssetError::Io(e)
            }
        })?;
        // Symlinks may still point outside the root.
        if !canonical.starts_with(&self.root) {
            return Err(AssetError::InvalidPath);
        }
        if !canonical.is_file() {
            return Err(AssetError::NotFound);
        }
        Ok(canonical)
    }
}

impl IntoResponse for AssetError {
    fn into_response(self) -> Response {
        match self {
            AssetError::InvalidPath => (StatusCode::BAD_REQUEST, "Invalid path").into_response(),
            AssetError::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            AssetError::Io(e) => {
                tracing::error!(err = %e, "asset read failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
            }
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn is_asset_request(path: &str) -> bool {
    path.starts_with("/web/") || SERVED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// `GET /` → 302 to the entry page.
pub(super) async fn redirect_to_entry(State(state): State<AppState>) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, state.assets.entry_location())],
    )
        .into_response()
}

/// Fallback for every unrouted request: static assets, otherwise 404.
pub(super) async fn serve(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let path = uri.path();
    if method != Method::GET || !is_asset_request(path) {
        tracing::debug!(%method, path, "no route");
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    let file = match state.assets.resolve(path) {
        Ok(f) => f,
        Err(e) => {
            if matches!(e, AssetError::InvalidPath) {
                tracing::warn!(path, "rejected asset path");
            }
            return e.into_response();
        }
    };
    match tokio::fs::read(&file).await {
        Ok(data) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type(&file)),
                (header::CACHE_CONTROL, "no-store"),
            ],
            data,
        )
            .into_response(),
        Err(e) => AssetError::Io(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::api::test_support::{body_bytes, get, post_json, test_state};
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_redirects_to_entry_page() {
        let app = router(test_state());
        let res = app.oneshot(get("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()[header::LOCATION], "/player.html");
    }

    #[tokio::test]
    async fn non_get_on_root_is_404() {
        let app = router(test_state());
        let res = app
            .oneshot(post_json("/", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serves_entry_page_with_content_type() {
        let app = router(test_state());
        let res = app.oneshot(get("/player.html")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(res.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(body_bytes(res).await, b"<html>player</html>");
    }

    #[tokio::test]
    async fn web_prefix_maps_into_root() {
        let app = router(test_state());
        let res = app.clone().oneshot(get("/web/css/player.css")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");

        let res = app.oneshot(get("/web/clip.bin")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
        assert_eq!(body_bytes(res).await, vec![0u8, 1, 2]);
    }

    #[tokio::test]
    async fn parent_segments_are_rejected() {
        let app = router(test_state());
        for uri in ["/web/../secret.html", "/../secret.html", "/css/../../secret.html"] {
            let res = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_ne!(body_bytes(res).await, b"<html>secret</html>");
        }
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let app = router(test_state());
        let res = app.clone().oneshot(get("/missing.js")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app.oneshot(get("/web/css")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn other_extensions_outside_web_prefix_are_not_served() {
        let app = router(test_state());
        let res = app.oneshot(get("/clip.bin")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_root_fails_construction() {
        let config = Config::for_test(std::env::temp_dir().join("relayer_no_such_root_dir"));
        assert!(matches!(
            AssetRoot::new(&config),
            Err(RelayError::WebRoot { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_root_is_rejected() {
        let state = test_state();
        let root = state.assets.root().to_path_buf();
        let outside = root.parent().unwrap().join("secret.html");
        std::os::unix::fs::symlink(&outside, root.join("escape.html")).unwrap();
        assert!(matches!(
            state.assets.resolve("/escape.html"),
            Err(AssetError::InvalidPath)
        ));
    }
}
