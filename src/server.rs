// src/server.rs

//! Self-hosted HTTP surface for IndexNow submission.
//!
//! Exposes the key-ownership file that target endpoints fetch to verify the
//! API key, and a JSON submission endpoint for single or batch pushes. In
//! development mode the submission endpoint returns a simulated success
//! without making outbound calls.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::client::IndexNowClient;
use crate::error::{AppError, Result};
use crate::models::{IndexNowConfig, SubmitResponse};

/// Shared application state: one client per server process.
pub struct AppState {
    pub client: IndexNowClient,
    pub dev_mode: bool,
}

/// Submission request body: exactly one of `url` or `urls`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub urls: Option<Vec<String>>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the application router for the given state.
///
/// The key file route is registered from the configured API key, so only the
/// exact `/<key>.txt` path serves it.
pub fn router(state: Arc<AppState>) -> Router {
    let key_path = format!("/{}.txt", state.client.config().api_key);

    Router::new()
        .route("/health", get(health))
        .route(&key_path, get(key_file))
        .route("/api/indexnow", post(submit))
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(config: IndexNowConfig, bind_addr: &str, dev_mode: bool) -> Result<()> {
    let client = IndexNowClient::new(config)?;
    let state = Arc::new(AppState { client, dev_mode });

    let app = router(state);
    let listener = TcpListener::bind(bind_addr).await?;
    log::info!("IndexNow server listening on {bind_addr} (dev_mode: {dev_mode})");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::config(format!("server error: {e}")))
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "indexnow",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Serve the raw API key as text/plain for key-ownership verification.
async fn key_file(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.client.config().api_key.clone(),
    )
}

/// Accept a single URL or a URL list and run the submission.
async fn submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Response {
    let submitted: Vec<String> = match (&request.url, &request.urls) {
        (Some(url), _) => vec![url.clone()],
        (None, Some(urls)) => urls.clone(),
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    success: false,
                    error: "either 'url' or 'urls' is required".to_string(),
                }),
            )
                .into_response();
        }
    };

    if state.dev_mode {
        log::info!("Dev mode: simulating submission of {} URL(s)", submitted.len());
        let simulated = SubmitResponse::simulated(state.client.config(), submitted);
        return (StatusCode::OK, Json(simulated)).into_response();
    }

    let result = match &request.url {
        Some(url) => state.client.submit_url(url).await,
        None => state.client.submit_urls(&submitted).await,
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(AppError::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                success: false,
                error: message,
            }),
        )
            .into_response(),
        Err(error) => {
            log::error!("Submission failed: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    success: false,
                    error: error.to_string(),
                }),
            )
                .into_response()
        }
    }
}
