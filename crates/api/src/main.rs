use std::sync::Arc;

use anyhow::Context;

use mto_api::app::{build_app, build_services};
use mto_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mto_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let services = build_services(&config)
        .await
        .context("failed to wire services")?;
    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        data_root = %config.data_root.display(),
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
