//! HTTP query surface over the search router.
//!
//! Backend calls block (subprocess invocations, disk scans), so each request
//! runs through `spawn_blocking` under the configured timeout; a timeout is
//! reported as its own backend-error kind, never as an empty result.

use crate::config::Settings;
use crate::error::SearchError;
use crate::search::{SearchResponse, SearchRouter, SearchType};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
struct AppState {
    router: Arc<SearchRouter>,
    timeout: Duration,
}

/// The query API contract: one operation, dispatched by `search_type`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub project_name: String,
    pub query: String,
    pub search_type: SearchType,
    #[serde(default = "default_n_results")]
    pub n_results: usize,
}

fn default_n_results() -> usize {
    5
}

/// Run the HTTP server until the process is stopped.
pub async fn serve(settings: Arc<Settings>) -> anyhow::Result<()> {
    let bind = settings.server.bind.clone();
    let state = AppState {
        router: Arc::new(SearchRouter::new(Arc::clone(&settings))),
        timeout: Duration::from_secs(settings.server.request_timeout_secs),
    };

    let app = Router::new()
        .route("/", get(health))
        .route("/search", post(search))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(%bind, "query API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "trawl search engine is running",
    }))
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let backend = match request.search_type {
        SearchType::Semantic => "semantic",
        SearchType::Literal => "literal",
        SearchType::Structural => "structural",
    };
    let seconds = state.timeout.as_secs();

    let router = Arc::clone(&state.router);
    let handle = tokio::task::spawn_blocking(move || {
        router.route(
            &request.project_name,
            request.search_type,
            &request.query,
            request.n_results,
        )
    });

    match tokio::time::timeout(state.timeout, handle).await {
        Err(_) => Err(ApiError(SearchError::Timeout { backend, seconds })),
        Ok(Err(join_error)) => Err(ApiError(SearchError::Internal(join_error.to_string()))),
        Ok(Ok(result)) => result.map(Json).map_err(ApiError),
    }
}

/// Maps router errors onto HTTP statuses without leaking backend internals.
struct ApiError(SearchError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SearchError::ProjectNotFound { .. }
            | SearchError::CollectionNotFound { .. }
            | SearchError::StructuralIndexMissing { .. } => StatusCode::NOT_FOUND,
            SearchError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            SearchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}
