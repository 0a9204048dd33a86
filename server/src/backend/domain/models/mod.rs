pub mod attendance;
pub mod barrio;
pub mod service;
pub mod user;
pub mod youth;
