//! # REST API for Barrios

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Extension, Router,
};
use tracing::info;

use shared::{BarrioListResponse, BarrioNameRequest, BarrioResponse};

use crate::backend::domain::models::user::Principal;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::barrio_mapper::BarrioMapper;
use crate::backend::AppState;

/// Barrios offered in the youth form
pub fn router() -> Router<AppState> {
    Router::new().route("/active", get(list_active_barrios))
}

/// Barrio administration
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_barrios).post(create_barrio))
        .route("/:id", put(rename_barrio))
        .route("/:id/toggle", post(toggle_barrio))
}

pub async fn list_active_barrios(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    let barrios = state.barrio_service.list_active_barrios(&principal).await?;
    Ok(Json(BarrioListResponse {
        barrios: BarrioMapper::to_dto_list(barrios),
    }))
}

pub async fn list_barrios(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/admin/barrios");

    let barrios = state.barrio_service.list_barrios(&principal).await?;
    Ok(Json(BarrioListResponse {
        barrios: BarrioMapper::to_dto_list(barrios),
    }))
}

pub async fn create_barrio(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<BarrioNameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/admin/barrios - name: {}", request.name);

    let barrio = state.barrio_service.create_barrio(&principal, &request.name).await?;
    let response = BarrioResponse {
        success_message: format!("Barrio {} created", barrio.name),
        barrio: BarrioMapper::to_dto(barrio),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn rename_barrio(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(request): Json<BarrioNameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/admin/barrios/{} - name: {}", id, request.name);

    let barrio = state.barrio_service.rename_barrio(&principal, id, &request.name).await?;
    Ok(Json(BarrioResponse {
        success_message: "Barrio updated".to_string(),
        barrio: BarrioMapper::to_dto(barrio),
    }))
}

pub async fn toggle_barrio(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/admin/barrios/{}/toggle", id);

    let barrio = state.barrio_service.toggle_barrio(&principal, id).await?;
    let verb = if barrio.is_active { "activated" } else { "deactivated" };
    Ok(Json(BarrioResponse {
        success_message: format!("Barrio {} {}", barrio.name, verb),
        barrio: BarrioMapper::to_dto(barrio),
    }))
}
