//! # Domain Module
//!
//! Contains all business logic for the attendance tracker.
//!
//! Every service takes the acting [`Principal`](models::user::Principal)
//! explicitly and checks it against the role allow-list of the operation
//! before touching storage. Services depend on the storage traits only.
//!
//! ## Module Organization
//!
//! - **auth_service**: login, logout and the single-session token
//! - **session_policy**: decides whether a request's session is still valid
//! - **streak_calculator**: consecutive-attendance streaks over recent services
//! - **youth_service**: youth registry and the listing with attendance stats
//! - **barrio_service**: neighborhoods, including the default seed list
//! - **service_manager**: scheduling services and opening/closing them
//! - **attendance_service**: live attendance taking and per-service reports
//! - **export_service**: CSV download of a service's attendance
//! - **user_service**: account administration (ROOT only)
//!
//! ## Roles
//!
//! - **OPERATIVE**: takes attendance and registers youth
//! - **ADMIN**: additionally manages services and sees reports and stats
//! - **ROOT**: additionally manages barrios, users and deletes youth

pub mod attendance_service;
pub mod auth_service;
pub mod authorization;
pub mod barrio_service;
pub mod commands;
pub mod errors;
pub mod export_service;
pub mod models;
pub mod password;
pub mod service_manager;
pub mod session_policy;
pub mod streak_calculator;
pub mod user_service;
pub mod validation;
pub mod youth_service;

#[cfg(test)]
pub mod test_utils;

pub use attendance_service::AttendanceService;
pub use auth_service::AuthService;
pub use authorization::Operation;
pub use barrio_service::BarrioService;
pub use errors::{DomainError, DomainResult};
pub use export_service::ExportService;
pub use service_manager::ServiceManager;
pub use session_policy::{SessionClaims, SessionPolicyGuard, SessionState};
pub use user_service::UserService;
pub use youth_service::YouthService;
