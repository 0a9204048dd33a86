//! Liveness probe for deployments.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tracing::error;

use crate::backend::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/db", get(database_health))
}

/// `SELECT 1` against the database
pub async fn database_health(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                message: None,
            }),
        ),
        Err(e) => {
            error!("Database health check failed: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "error",
                    message: Some("database unreachable"),
                }),
            )
        }
    }
}
