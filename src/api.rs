//! HTTP surface: routing, envelopes and status mapping.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::GatewayError;
use crate::service::{Envelope, ProfileService};

/// Message for bodies that are missing or not JSON.
const INVALID_JSON: &str = "No JSON data provided or invalid JSON format";

/// Build the router over a shared service.
pub fn router(service: Arc<ProfileService>) -> Router {
    Router::new()
        .route("/team-profile", post(team_profile))
        .route("/hello", get(hello))
        .route("/bedrock-health", get(bedrock_health))
        .fallback(unknown_route)
        .with_state(service)
}

/// Serve the router on `host:port` until Ctrl-C.
///
/// # Errors
///
/// Returns [`GatewayError::Io`] if the socket cannot be bound or the server
/// fails while running.
pub async fn serve(
    service: Arc<ProfileService>,
    host: &str,
    port: u16,
) -> Result<(), GatewayError> {
    let listener = TcpListener::bind((host, port)).await?;
    info!(addr = %listener.local_addr()?, "profile gateway listening");

    axum::serve(listener, router(service)).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received, draining connections"),
        Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
    }
}

async fn team_profile(
    State(service): State<Arc<ProfileService>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "rejected request body");
            return envelope_error(StatusCode::BAD_REQUEST, INVALID_JSON);
        }
    };

    match service.handle(body).await {
        Ok(data) => {
            (StatusCode::OK, Json(Envelope::success(data, started.elapsed()))).into_response()
        }
        Err(e) => failure(&e),
    }
}

async fn hello() -> Json<Envelope> {
    Json(Envelope::success(json!({"message": "Hello! Welcome to the API"}), Duration::ZERO))
}

async fn bedrock_health(State(service): State<Arc<ProfileService>>) -> Response {
    let started = Instant::now();
    match service.provider_health().await {
        Ok(data) => {
            (StatusCode::OK, Json(Envelope::success(data, started.elapsed()))).into_response()
        }
        Err(e) => failure(&e),
    }
}

async fn unknown_route() -> Response {
    envelope_error(StatusCode::NOT_FOUND, "Endpoint not found")
}

/// Map an error to its status, logging the full detail.
fn failure(err: &GatewayError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if err.is_client_error() {
        warn!(status = status.as_u16(), error = %err, "request rejected");
    } else {
        error!(status = status.as_u16(), error = %err, "request failed");
    }
    envelope_error(status, err.public_message())
}

fn envelope_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Envelope::error(message))).into_response()
}
