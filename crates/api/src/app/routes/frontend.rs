//! Static front end: `/` serves `index.html`, `/static/{file}` serves assets.
//!
//! Only flat file names inside the configured directory are served.

use std::io::ErrorKind;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::app::errors;

#[derive(Debug, Clone)]
pub struct FrontendDir(Arc<PathBuf>);

impl FrontendDir {
    pub fn new(dir: PathBuf) -> Self {
        Self(Arc::new(dir))
    }

    pub fn path(&self) -> &FsPath {
        &self.0
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/:file", get(asset))
}

pub async fn index(Extension(dir): Extension<FrontendDir>) -> axum::response::Response {
    serve_file(dir.path(), "index.html").await
}

pub async fn asset(
    Extension(dir): Extension<FrontendDir>,
    Path(file): Path<String>,
) -> axum::response::Response {
    if !is_flat_file_name(&file) {
        return errors::json_error(StatusCode::NOT_FOUND, "Not found");
    }
    serve_file(dir.path(), &file).await
}

async fn serve_file(dir: &FsPath, name: &str) -> axum::response::Response {
    match tokio::fs::read(dir.join(name)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(name))], bytes).into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            errors::json_error(StatusCode::NOT_FOUND, "Not found")
        }
        Err(e) => {
            tracing::error!(error = %e, file = name, "failed to read static file");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to read static file")
        }
    }
}

fn is_flat_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.starts_with('.')
}

fn content_type(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
