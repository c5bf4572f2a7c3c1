use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use tokio::net::TcpListener;

use crate::app::{App, create_app, create_listener, create_router};
use crate::configs::Settings;
use crate::services::ListenerHandle;

pub mod app;
pub mod configs;
pub mod errors;
pub mod handles;
pub mod models;
pub mod repositories;
pub mod services;


pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let app = create_app(settings).await?;

    app.audit.operation("application started").await;

    let listener = create_listener(settings, &app)?
        .start()
        .await
        .context("failed to bind reading listener")?;

    let ip_addr = settings
        .server
        .host
        .parse::<IpAddr>()
        .context("invalid server host")?;
    let address = SocketAddr::from((ip_addr, settings.server.port));
    let api = TcpListener::bind(&address)
        .await
        .context("failed to bind operator api")?;

    tracing::info!("operator api listening on {:?}", address);

    axum::serve(api, create_router(&app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown(listener, &app).await;

    Ok(())
}

/// Stop intake first, then the refresh timer, then record the shutdown.
pub async fn shutdown(listener: ListenerHandle, app: &App) {
    listener.stop().await;
    app.gate.shutdown().await;
    app.audit.operation("application stopped").await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    tracing::info!("shutdown signal received");
}
