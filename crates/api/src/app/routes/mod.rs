use axum::Router;

pub mod frontend;
pub mod locations;
pub mod movements;
pub mod products;
pub mod reports;
pub mod system;

/// Router for the JSON API (mounted under `/api`).
pub fn api_router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/locations", locations::router())
        .nest("/movements", movements::router())
        .nest("/reports", reports::router())
}
