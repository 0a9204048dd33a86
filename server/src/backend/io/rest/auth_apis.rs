//! # REST API for Authentication
//!
//! Login is public and mounted directly by the top-level router; logout and
//! `me` sit behind the session guard.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use tower_sessions::Session;
use tracing::info;

use shared::{LoginRequest, LoginResponse, MessageResponse};

use crate::backend::domain::commands::auth::LoginCommand;
use crate::backend::domain::models::user::Principal;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::principal_mapper::PrincipalMapper;
use crate::backend::io::rest::session_guard::open_session;
use crate::backend::AppState;

/// Routes for logged-in principals
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/auth/login - username: {}", request.username.trim());

    let command = LoginCommand {
        username: request.username,
        password: request.password,
    };
    let result = state.auth_service.login(command).await?;
    open_session(&session, result.principal.id, &result.token).await?;

    let response = LoginResponse {
        success_message: format!("Welcome, {}", result.principal.username),
        principal: PrincipalMapper::to_dto(&result.principal),
    };
    Ok((StatusCode::OK, Json(response)))
}

pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/auth/logout - {}", principal.username);

    state.auth_service.logout(&principal).await?;
    session.flush().await?;

    Ok(Json(MessageResponse {
        success_message: "Session closed".to_string(),
    }))
}

pub async fn me(Extension(principal): Extension<Principal>) -> impl IntoResponse {
    Json(PrincipalMapper::to_dto(&principal))
}
