// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_shell::DashboardShell;
use crate::infrastructure::config::load_settings;
use crate::infrastructure::report_client::HttpReportClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dashboard_page, get_panel, get_refresh_interval, health_check, list_panels, refresh_all,
    refresh_panel, set_refresh_interval,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let settings = load_settings()?;
    let interval = settings.dashboard.refresh_interval()?;

    // Create report client (infrastructure layer)
    let client = Arc::new(HttpReportClient::new(&settings.backend, &settings.http)?);

    // Mount the panels (application layer)
    let shell = Arc::new(DashboardShell::start(client, interval));

    let state = Arc::new(AppState {
        shell: shell.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/", get(dashboard_page))
        .route("/healthz", get(health_check))
        .route("/panels", get(list_panels))
        .route("/panels/:kind", get(get_panel))
        .route("/panels/:kind/refresh", post(refresh_panel))
        .route("/refresh", post(refresh_all))
        .route(
            "/refresh-interval",
            get(get_refresh_interval).put(set_refresh_interval),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = settings.server.bind.parse()?;
    tracing::info!("Starting game-analytics-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shell.shutdown();
    tracing::info!("Dashboard stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
