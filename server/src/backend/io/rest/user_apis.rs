//! # REST API for User Administration

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Extension, Router,
};
use tracing::info;

use shared::{CreateUserRequest, MessageResponse, ResetPasswordRequest, UserListResponse, UserResponse};

use crate::backend::domain::commands::users::CreateUserCommand;
use crate::backend::domain::models::user::Principal;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::user_mapper::UserMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", delete(delete_user))
        .route("/:id/toggle", post(toggle_user))
        .route("/:id/password", post(reset_password))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/admin/users");

    let users = state.user_service.list_users(&principal).await?;
    Ok(Json(UserListResponse {
        users: UserMapper::to_dto_list(users),
    }))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Never log the password
    info!("POST /api/admin/users - username: {}, role: {}", request.username, request.role);

    let command = CreateUserCommand {
        username: request.username,
        role: request.role,
        password: request.password,
    };
    let user = state.user_service.create_user(&principal, command).await?;

    let response = UserResponse {
        success_message: format!("User {} created", user.username),
        user: UserMapper::to_dto(user),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn toggle_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/admin/users/{}/toggle", id);

    let user = state.user_service.toggle_user(&principal, id).await?;
    let verb = if user.is_active { "activated" } else { "deactivated" };
    Ok(Json(UserResponse {
        success_message: format!("User {} {}", user.username, verb),
        user: UserMapper::to_dto(user),
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/admin/users/{}/password", id);

    let user = state
        .user_service
        .reset_password(&principal, id, &request.new_password)
        .await?;
    Ok(Json(UserResponse {
        success_message: format!("Password updated for {}", user.username),
        user: UserMapper::to_dto(user),
    }))
}

/// Delete a user; their attendance records pass to the system user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/admin/users/{}", id);

    state.user_service.delete_user(&principal, id).await?;
    Ok(Json(MessageResponse {
        success_message: "User deleted".to_string(),
    }))
}
