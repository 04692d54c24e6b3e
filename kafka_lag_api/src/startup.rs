use crate::app_config::AppConfig;
use crate::lag_api::{build_router, LagApiState};
use anyhow::Context;
use kafka_lag::broker::KafkaSessionFactory;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub async fn run_until_stopped(config: AppConfig) -> Result<(), anyhow::Error> {
    let factory = KafkaSessionFactory::new(config.connection_settings(), config.broker_timeout())
        .context("While creating broker session factory")?;
    let state = LagApiState::new(Arc::new(factory), config.request_timeout());

    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("While binding {address}"))?;
    info!("Listening {address}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("While serving http")?;

    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e:?}");
        return;
    }
    info!("Shutdown signal received");
}
