//! # REST API for Youth
//!
//! Listing, registration, editing and deletion of youth.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use chrono::Local;
use tracing::info;

use shared::{CreateYouthRequest, MessageResponse, SearchQuery, UpdateYouthRequest, YouthResponse};

use crate::backend::domain::models::user::Principal;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::youth_mapper::YouthMapper;
use crate::backend::AppState;

/// Create a router for youth related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_youth).post(create_youth))
        .route("/:cedula", get(get_youth).put(update_youth).delete(delete_youth))
}

/// Search youth; managers also get attendance totals and streaks
pub async fn list_youth(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let q = query.q.unwrap_or_default();
    info!("GET /api/youth?q={}", q);

    match state.youth_service.list_youth(&principal, &q).await {
        Ok(result) => {
            let response = YouthMapper::to_list_response(result, Local::now().date_naive());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn create_youth(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateYouthRequest>,
) -> impl IntoResponse {
    info!("POST /api/youth - request: {:?}", request);

    let command = YouthMapper::to_create_command(request);
    match state.youth_service.create_youth(&principal, command).await {
        Ok(youth) => {
            let response = YouthResponse {
                success_message: format!("{} registered", youth.full_name),
                youth: YouthMapper::to_dto(youth),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn get_youth(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(cedula): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/youth/{}", cedula);

    match state.youth_service.get_youth(&principal, &cedula).await {
        Ok(youth) => (StatusCode::OK, Json(YouthMapper::to_dto(youth))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn update_youth(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(cedula): Path<String>,
    Json(request): Json<UpdateYouthRequest>,
) -> impl IntoResponse {
    info!("PUT /api/youth/{} - request: {:?}", cedula, request);

    let command = YouthMapper::to_update_command(request);
    match state.youth_service.update_youth(&principal, &cedula, command).await {
        Ok(youth) => {
            let response = YouthResponse {
                success_message: "Youth updated".to_string(),
                youth: YouthMapper::to_dto(youth),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Delete a youth and their attendance history
pub async fn delete_youth(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(cedula): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/youth/{}", cedula);

    match state.youth_service.delete_youth(&principal, &cedula).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                success_message: "Youth and attendance deleted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
