//! # Backend Module
//!
//! Contains all non-UI logic for the attendance tracker.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! HTTP clients
//!     ↓
//! IO Layer (REST API, session guard)
//!     ↓
//! Domain Layer (business rules, role checks, streaks)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize and configure the application state
//! - Set up the REST API router with sessions, tracing and CORS
//! - Keep every protected route behind the session guard

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::post,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing::info;

use crate::backend::config::AppConfig;
use crate::backend::domain::{
    AttendanceService, AuthService, BarrioService, ExportService, ServiceManager, SessionPolicyGuard,
    UserService, YouthService,
};
use crate::backend::io::rest::{
    attendance_apis, auth_apis, barrio_apis, dashboard_apis, health_apis, require_session, service_apis,
    user_apis, youth_apis,
};
use crate::backend::storage::{
    AttendanceRepository, BarrioRepository, DbConnection, ServiceRepository, UserRepository, YouthRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub db: DbConnection,
    pub session_guard: SessionPolicyGuard,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub barrio_service: BarrioService,
    pub youth_service: YouthService,
    pub service_manager: ServiceManager,
    pub attendance_service: AttendanceService,
    pub export_service: ExportService,
}

impl AppState {
    /// Wire every service on top of an open database
    pub fn new(db: DbConnection, config: &AppConfig) -> Self {
        let users = Arc::new(UserRepository::new(db.clone()));
        let barrios = Arc::new(BarrioRepository::new(db.clone()));
        let youth = Arc::new(YouthRepository::new(db.clone()));
        let services = Arc::new(ServiceRepository::new(db.clone()));
        let attendance = Arc::new(AttendanceRepository::new(db.clone()));

        let service_manager = ServiceManager::new(services.clone());

        Self {
            session_guard: SessionPolicyGuard::new(config.idle_threshold()),
            auth_service: AuthService::new(users.clone()),
            user_service: UserService::new(users, config.system_username.clone()),
            barrio_service: BarrioService::new(barrios.clone()),
            youth_service: YouthService::new(
                youth.clone(),
                barrios.clone(),
                services,
                attendance.clone(),
                config.max_services_for_streak,
            ),
            attendance_service: AttendanceService::new(attendance.clone(), youth, barrios, service_manager.clone()),
            export_service: ExportService::new(attendance, service_manager.clone()),
            service_manager,
            db,
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!("Setting up application state");
    Ok(AppState::new(db, config))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Result<Router> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin {}", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_name("attendance_session")
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(config.session_retention()));

    let public_routes = Router::new()
        .route("/auth/login", post(auth_apis::login))
        .nest("/health", health_apis::router());

    let protected_routes = Router::new()
        .nest("/auth", auth_apis::router())
        .nest("/dashboard", dashboard_apis::router())
        .nest("/youth", youth_apis::router())
        .nest("/barrios", barrio_apis::router())
        .nest("/services", service_apis::router())
        .nest("/attendance", attendance_apis::router())
        .nest("/admin/barrios", barrio_apis::admin_router())
        .nest("/admin/services", service_apis::admin_router())
        .nest("/admin/attendance", attendance_apis::admin_router())
        .nest("/admin/users", user_apis::router())
        .route_layer(middleware::from_fn_with_state(app_state.clone(), require_session));

    Ok(Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
