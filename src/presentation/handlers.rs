// HTTP request handlers
use crate::application::dashboard_service::DashboardRequest;
use crate::domain::dashboard::TabId;
use crate::infrastructure::chunked_json::ndjson_stream;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub window: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DashboardQuery {
    fn request(&self) -> DashboardRequest {
        DashboardRequest::from_params(
            self.window.as_deref(),
            self.from.as_deref(),
            self.to.as_deref(),
            Utc::now(),
        )
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Tab ids and titles in display order
pub async fn list_tabs(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tabs = state.dashboard_service.tabs();
    match json_response(&tabs, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Full dashboard for the requested time filter
pub async fn get_dashboard(
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let request = query.request();
    if let Err(e) = &request.range {
        tracing::debug!("Rendering dashboard with invalid filter: {}", e);
    }

    let dashboard = state.dashboard_service.build_dashboard(&request).await;
    match json_response(&dashboard, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// One tab section
pub async fn get_tab(
    Path(tab): Path<String>,
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let tab: TabId = match tab.parse() {
        Ok(tab) => tab,
        Err(message) => return (StatusCode::NOT_FOUND, message).into_response(),
    };

    let section = state.dashboard_service.build_tab(tab, &query.request()).await;
    match json_response(&section, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Progressive dashboard: skeleton, one message per tab, completion
pub async fn stream_dashboard(
    Query(query): Query<DashboardQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let stream = state.dashboard_service.stream_dashboard(query.request());
    match ndjson_stream(stream) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
