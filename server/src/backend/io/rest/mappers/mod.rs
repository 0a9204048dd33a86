//! Conversions from domain models to the DTOs in the `shared` crate.

pub mod attendance_mapper;
pub mod barrio_mapper;
pub mod principal_mapper;
pub mod service_mapper;
pub mod user_mapper;
pub mod youth_mapper;
