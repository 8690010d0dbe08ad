use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};

use stockroom_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", delete(delete_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ProductSearchQuery>,
) -> axum::response::Response {
    match services.list_products(query.search.as_deref()).await {
        Ok(products) => {
            let items = products
                .into_iter()
                .map(dto::product_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = body.map(|Json(b)| b).unwrap_or_else(|rejection| {
        tracing::debug!(%rejection, "unreadable product body");
        dto::CreateProductRequest::default()
    });

    let cmd = match body.into_command() {
        Ok(cmd) => cmd,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.create_product(cmd).await {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.delete_product(&ProductId::new(id)).await {
        Ok(()) => errors::json_message("Product deleted"),
        Err(e) => errors::service_error_to_response(e),
    }
}
