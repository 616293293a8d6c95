// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{Router, routing::get};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::dataset_repository::DatasetRepository;
use crate::infrastructure::config::{SensorSource, load_settings, load_widgets_config};
use crate::infrastructure::file_repository::FileRepository;
use crate::infrastructure::onc_client::OncClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_dashboard, get_tab, health_check, list_tabs, stream_dashboard};

const CONFIG_DIR: &str = "config";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings(Path::new(CONFIG_DIR))?;
    let widgets_config = load_widgets_config(Path::new(CONFIG_DIR))?;
    let tz = settings.display.time_zone()?;

    // Create repository (infrastructure layer)
    let files = FileRepository::new(
        settings.datasets.sensors.clone(),
        settings.datasets.sightings.clone(),
        settings.datasets.presence.clone(),
    );
    let repository: Arc<dyn DatasetRepository> = match settings.datasets.sensor_source {
        SensorSource::File => Arc::new(files),
        SensorSource::Onc => {
            if settings.onc.token.is_empty() {
                tracing::warn!("ONC sensor source selected without a token; sensor charts will be empty");
            }
            Arc::new(OncClient::new(settings.onc.clone(), files))
        }
    };

    // Create services (application layer)
    let dashboard_service = DashboardService::new(repository, widgets_config, settings.display.title.clone(), tz);

    // Create application state
    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    // Compression is handled in the response builders, not by a layer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/tabs", get(list_tabs))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/tabs/:tab", get(get_tab))
        .route("/dashboard/stream", get(stream_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Starting whale-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
