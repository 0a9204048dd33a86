use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use tracing::info;

use crate::backend::domain::models::user::Principal;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::principal_mapper::PrincipalMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

/// Who is logged in and which services are open
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> impl IntoResponse {
    info!("GET /api/dashboard - {}", principal.username);

    match state.service_manager.dashboard(&principal).await {
        Ok(result) => (StatusCode::OK, Json(PrincipalMapper::to_dashboard_response(result))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
