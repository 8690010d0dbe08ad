use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};

use stockroom_core::LocationId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route("/:id", delete(delete_location))
}

pub async fn list_locations(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_locations().await {
        Ok(locations) => {
            let items = locations
                .into_iter()
                .map(dto::location_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_location(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateLocationRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = body.map(|Json(b)| b).unwrap_or_else(|rejection| {
        tracing::debug!(%rejection, "unreadable location body");
        dto::CreateLocationRequest::default()
    });

    let cmd = match body.into_command() {
        Ok(cmd) => cmd,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.create_location(cmd).await {
        Ok(location) => (StatusCode::CREATED, Json(dto::location_to_json(location))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_location(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.delete_location(&LocationId::new(id)).await {
        Ok(()) => errors::json_message("Location deleted"),
        Err(e) => errors::service_error_to_response(e),
    }
}
