//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AppServices>, static_dir: PathBuf) -> Router {
    let frontend = routes::frontend::FrontendDir::new(static_dir);

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::api_router())
        .merge(routes::frontend::router())
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(Extension(frontend)),
        )
}
