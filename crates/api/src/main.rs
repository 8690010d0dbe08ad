use std::sync::Arc;

use anyhow::Context;

use stockroom_infra::{AppConfig, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let services = Arc::new(stockroom_api::app::services::build_services(&config).await?);
    if config.seed_sample_data {
        seed::seed_sample_data(services.as_ref())
            .await
            .context("failed to seed sample data")?;
    }

    let app = stockroom_api::app::build_app(services, config.static_dir.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
