//! # REST API Interface Layer
//!
//! One module per resource, each exposing `router()`. Handlers log the
//! request, build a domain command from the DTO, call the service with the
//! principal the session guard attached, and map the result back to a DTO.

pub mod error;
pub mod mappers;
pub mod session_guard;

pub mod attendance_apis;
pub mod auth_apis;
pub mod barrio_apis;
pub mod dashboard_apis;
pub mod health_apis;
pub mod service_apis;
pub mod user_apis;
pub mod youth_apis;

pub use error::ApiError;
pub use session_guard::{open_session, require_session};
