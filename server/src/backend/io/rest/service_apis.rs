//! # REST API for Services
//!
//! Scheduling and opening/closing services (managers), and the list of open
//! services attendance can be taken for (everyone).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use tracing::info;

use shared::{CreateServiceRequest, ServiceListResponse, ServiceResponse};

use crate::backend::domain::commands::services::CreateServiceCommand;
use crate::backend::domain::models::user::Principal;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::service_mapper::ServiceMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/active", get(list_active_services))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recent_services).post(create_service))
        .route("/:id/toggle", post(toggle_service))
}

pub async fn list_active_services(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> impl IntoResponse {
    info!("GET /api/services/active");

    match state.service_manager.list_active(&principal).await {
        Ok(services) => (
            StatusCode::OK,
            Json(ServiceListResponse {
                services: ServiceMapper::to_dto_list(services),
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn list_recent_services(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> impl IntoResponse {
    info!("GET /api/admin/services");

    match state.service_manager.list_recent(&principal).await {
        Ok(services) => (
            StatusCode::OK,
            Json(ServiceListResponse {
                services: ServiceMapper::to_dto_list(services),
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn create_service(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CreateServiceRequest>,
) -> impl IntoResponse {
    info!("POST /api/admin/services - request: {:?}", request);

    let command = CreateServiceCommand {
        title: request.title,
        service_date: request.service_date,
        start_time: request.start_time,
    };

    match state.service_manager.create_service(&principal, command).await {
        Ok(service) => {
            let response = ServiceResponse {
                success_message: format!("Service '{}' created", service.title),
                service: ServiceMapper::to_dto(service),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Open or close a service
pub async fn toggle_service(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("POST /api/admin/services/{}/toggle", id);

    match state.service_manager.toggle_service(&principal, id).await {
        Ok(service) => {
            let message = if service.is_active {
                format!("Service '{}' is open for attendance", service.title)
            } else {
                format!("Service '{}' closed", service.title)
            };
            let response = ServiceResponse {
                success_message: message,
                service: ServiceMapper::to_dto(service),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
