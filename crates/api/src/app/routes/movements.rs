use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};

use stockroom_core::MovementId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_movements).post(create_movement))
        .route("/:id", delete(delete_movement))
}

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_movements().await {
        Ok(movements) => {
            let items = movements
                .into_iter()
                .map(dto::movement_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_movement(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateMovementRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = body.map(|Json(b)| b).unwrap_or_else(|rejection| {
        tracing::debug!(%rejection, "unreadable movement body");
        dto::CreateMovementRequest::default()
    });

    let cmd = match body.into_command() {
        Ok(cmd) => cmd,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.create_movement(cmd).await {
        Ok(movement) => (StatusCode::CREATED, Json(dto::movement_to_json(movement))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    // Non-numeric ids can never match a row.
    let movement_id: MovementId = match id.parse::<i64>() {
        Ok(v) => MovementId::new(v),
        Err(_) => return errors::json_error(StatusCode::NOT_FOUND, "Movement not found"),
    };

    match services.delete_movement(movement_id).await {
        Ok(()) => errors::json_message("Movement deleted"),
        Err(e) => errors::service_error_to_response(e),
    }
}
