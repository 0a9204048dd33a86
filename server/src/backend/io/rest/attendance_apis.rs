//! # REST API for Attendance
//!
//! Taking attendance for an open service, the per-service report and the CSV
//! download. The service is always named in the path.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use tracing::info;

use shared::{RegisterAttendanceRequest, RegisterAttendanceResponse, SearchQuery};

use crate::backend::domain::models::user::Principal;
use crate::backend::io::rest::error::ApiError;
use crate::backend::io::rest::mappers::attendance_mapper::AttendanceMapper;
use crate::backend::AppState;

/// Live attendance taking
pub fn router() -> Router<AppState> {
    Router::new().route("/:service_id", get(live_attendance).post(register_attendance))
}

/// Reports and exports
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/:service_id", get(attendance_report))
        .route("/:service_id/export.csv", get(export_attendance_csv))
}

pub async fn live_attendance(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(service_id): Path<i64>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let q = query.q.unwrap_or_default();
    info!("GET /api/attendance/{}?q={}", service_id, q);

    match state.attendance_service.live_view(&principal, service_id, &q).await {
        Ok(result) => (StatusCode::OK, Json(AttendanceMapper::to_live_response(result))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn register_attendance(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(service_id): Path<i64>,
    Json(request): Json<RegisterAttendanceRequest>,
) -> impl IntoResponse {
    info!("POST /api/attendance/{} - cedula: {}", service_id, request.cedula);

    match state
        .attendance_service
        .register(&principal, service_id, &request.cedula)
        .await
    {
        Ok(record) => {
            let response = RegisterAttendanceResponse {
                success_message: format!("Attendance registered: {}", record.youth.full_name),
                entry: AttendanceMapper::to_entry(record),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn attendance_report(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(service_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/admin/attendance/{}", service_id);

    match state.attendance_service.report(&principal, service_id).await {
        Ok(report) => (StatusCode::OK, Json(AttendanceMapper::to_report_response(report))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Download the attendance of a service as CSV
pub async fn export_attendance_csv(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(service_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/admin/attendance/{}/export.csv", service_id);

    match state
        .export_service
        .export_attendance_csv(&principal, service_id)
        .await
    {
        Ok(export) => {
            let headers = [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export.file_name),
                ),
            ];
            (StatusCode::OK, headers, export.content).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
