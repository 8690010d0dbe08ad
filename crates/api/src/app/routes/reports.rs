use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/stock", get(stock_report))
}

/// Current per-location balances derived from the movement history.
pub async fn stock_report(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.stock_report().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
