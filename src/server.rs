//! HTTP trigger
//!
//! Cloud Functions and Cloud Scheduler invoke the exporter with a plain HTTP
//! request. Any method on `/` runs one export; the request body is ignored.
//! The response is `200` with the run summary, or `500` with the error.

use crate::config::ServerConfig;
use crate::core::export::ExportOrchestrator;
use crate::domain::{ExporterError, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<ExportOrchestrator>,
}

/// Build the trigger router
pub fn router(orchestrator: Arc<ExportOrchestrator>) -> Router {
    Router::new()
        .route("/", any(trigger))
        .route("/healthz", get(healthz))
        .with_state(AppState { orchestrator })
}

/// Bind the listening socket described by `config`
///
/// # Errors
///
/// Returns `ExporterError::Server` if the address cannot be bound
pub async fn bind(config: &ServerConfig) -> Result<TcpListener> {
    let address = config.bind_address();
    TcpListener::bind(&address)
        .await
        .map_err(|e| ExporterError::Server(format!("Failed to bind {address}: {e}")))
}

/// Serve the trigger until `shutdown` turns true
///
/// In-flight exports are allowed to finish before this returns.
///
/// # Errors
///
/// Returns `ExporterError::Server` if the server fails
pub async fn serve(
    listener: TcpListener,
    orchestrator: Arc<ExportOrchestrator>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    if let Ok(address) = listener.local_addr() {
        tracing::info!(address = %address, "HTTP trigger listening");
    }

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
            tracing::info!("HTTP trigger shutting down");
        })
        .await
        .map_err(|e| ExporterError::Server(e.to_string()))
}

async fn trigger(State(state): State<AppState>) -> Response {
    tracing::info!("Export triggered over HTTP");

    match state.orchestrator.run().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Triggered export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
